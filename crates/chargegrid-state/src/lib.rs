//! chargegrid-state — embedded state store for ChargeGrid.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! state management for requesters, charging stations, queued requests and
//! occupancy windows.
//!
//! # Architecture
//!
//! All domain types are JSON-serialized into redb's `&[u8]` value columns
//! under `u64` keys. Ids come from a per-table sequence that lives in the
//! same database, so they are allocated inside the transaction that writes
//! the row.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`)
//! and can be shared across async tasks.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::StateStore;
pub use types::*;
