//! chargegrid-allocator — fair assignment of charging stations.
//!
//! A periodic batch consumes the backlog of queued requests, scores each
//! one, and hands the free stations to the best-scoring requests for a
//! bounded slot. Requesters then start their slot explicitly.
//!
//! # Architecture
//!
//! ```text
//! Allocator (one cycle at a time)
//!   ├── scorer        (queue position, distance, priority, charged today)
//!   ├── availability  (stations minus active windows)
//!   ├── demand        (pending / available → slot cap)
//!   └── ChargingStore (load queue, persist windows + settle atomically)
//!
//! session::activate  (owner starts an assigned window, compare-and-set)
//! queue::enter_queue (one unsettled request per requester)
//! ```

pub mod availability;
pub mod demand;
pub mod engine;
pub mod error;
pub mod queue;
pub mod scorer;
pub mod session;
pub mod store;
pub mod workday;

pub use demand::{DemandPolicy, DurationCap};
pub use engine::{AllocationPolicy, Allocator, Assignment, CycleReport, SkipReason};
pub use error::{AllocatorError, AllocatorResult, RejectionReason};
pub use scorer::{ScoredRequest, ScoringWeights};
pub use store::ChargingStore;
pub use workday::Workday;
