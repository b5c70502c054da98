//! Demand classification — how long each slot may be this cycle.
//!
//! ```text
//! ratio = pending / available
//! high  = ratio > high_demand_threshold
//! cap   = high && limit < hours_left ? limit : hours_left
//! ```
//!
//! High demand shortens everyone's slot so more people get served; the cap
//! never exceeds what is left of the workday.

use serde::Serialize;

use crate::error::{AllocatorError, AllocatorResult};

/// Thresholds for demand classification.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandPolicy {
    pub high_demand_threshold: f64,
    pub high_demand_hours_limit: u32,
}

impl Default for DemandPolicy {
    fn default() -> Self {
        Self {
            high_demand_threshold: 1.5,
            high_demand_hours_limit: 3,
        }
    }
}

/// Maximum slot length for one cycle, with the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationCap {
    pub hours: u32,
    pub demand_ratio: f64,
    pub high_demand: bool,
    pub hours_until_workday_end: u32,
}

/// Classify demand and compute the duration cap.
///
/// Fails with [`AllocatorError::DivisionUndefined`] when no station is
/// available, since the ratio has no meaning then.
pub fn classify(
    policy: &DemandPolicy,
    pending_count: usize,
    available_count: usize,
    hours_until_workday_end: u32,
) -> AllocatorResult<DurationCap> {
    if available_count == 0 {
        return Err(AllocatorError::DivisionUndefined {
            pending: pending_count,
        });
    }

    let demand_ratio = pending_count as f64 / available_count as f64;
    let high_demand = demand_ratio > policy.high_demand_threshold;

    let hours = if high_demand && policy.high_demand_hours_limit < hours_until_workday_end {
        policy.high_demand_hours_limit
    } else {
        hours_until_workday_end
    };

    Ok(DurationCap {
        hours,
        demand_ratio,
        high_demand,
        hours_until_workday_end,
    })
}
