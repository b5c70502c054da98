//! Domain types for the ChargeGrid state store.
//!
//! These types represent the persisted state of requesters, charging
//! stations, queued requests and occupancy windows. All types are
//! serializable to/from JSON for storage in redb tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a requester (employee).
pub type RequesterId = u64;

/// Unique identifier for a charging station.
pub type StationId = u64;

/// Unique identifier for a pending request.
pub type RequestId = u64;

/// Unique identifier for an occupancy window.
pub type WindowId = u64;

// ── Requester ─────────────────────────────────────────────────────

/// A person who may request charging time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Requester {
    pub id: RequesterId,
    pub name: String,
    /// Commute distance in kilometers, used as a scoring input.
    pub travel_distance_km: f64,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a requester. The id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewRequester {
    pub name: String,
    #[serde(default)]
    pub travel_distance_km: f64,
}

// ── Station ───────────────────────────────────────────────────────

/// A physical charging station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to register a station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewStation {
    pub name: String,
}

// ── Pending request ───────────────────────────────────────────────

/// A queued request for charging time, waiting for the allocator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRequest {
    pub id: RequestId,
    pub requester_id: RequesterId,
    /// Desired charging time in whole hours (always positive).
    pub preferred_duration_hours: u32,
    pub is_priority: bool,
    /// Set once the request has been consumed into an occupancy window.
    pub settled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a requester enters the charging queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPendingRequest {
    pub requester_id: RequesterId,
    pub preferred_duration_hours: u32,
    pub is_priority: bool,
}

// ── Occupancy window ──────────────────────────────────────────────

/// One station assigned to one requester for a bounded time range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OccupancyWindow {
    pub id: WindowId,
    pub requester_id: RequesterId,
    pub station_id: StationId,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    /// When the requester actually plugged in. `None` until activation.
    pub actual_start: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A window produced by the allocator, before the store assigns its id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOccupancyWindow {
    pub requester_id: RequesterId,
    pub station_id: StationId,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
}

impl OccupancyWindow {
    /// Started and not yet past its scheduled end.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.actual_start {
            Some(started) => started <= now && now < self.scheduled_end,
            None => false,
        }
    }

    /// Assigned by the allocator but not yet activated, and still usable.
    pub fn is_unstarted(&self, now: DateTime<Utc>) -> bool {
        self.actual_start.is_none() && self.scheduled_end > now
    }
}
