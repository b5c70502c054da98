//! redb table definitions for the ChargeGrid state store.
//!
//! Entity tables use `u64` keys and `&[u8]` values (JSON-serialized domain
//! types). Keys are allocated from the `sequences` table, so iteration order
//! matches insertion order.

use redb::TableDefinition;

/// Requesters (employees) keyed by id.
pub const REQUESTERS: TableDefinition<u64, &[u8]> = TableDefinition::new("requesters");

/// Charging stations keyed by id.
pub const STATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("stations");

/// Pending (queued) charging requests keyed by id.
pub const REQUESTS: TableDefinition<u64, &[u8]> = TableDefinition::new("requests");

/// Occupancy windows keyed by id.
pub const WINDOWS: TableDefinition<u64, &[u8]> = TableDefinition::new("windows");

/// Last allocated id per entity table, keyed by table name.
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");
