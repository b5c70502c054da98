//! Session activation: a requester starts charging in an assigned window.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use chargegrid_state::{OccupancyWindow, RequesterId, StateError, WindowId};

use crate::error::{AllocatorError, AllocatorResult, RejectionReason};
use crate::store::ChargingStore;

/// Mark `window_id` as started at `now`.
///
/// Only the window's owner may start it, only once, only before its
/// scheduled end, and only while no other window holds the station. Two
/// concurrent calls for the same window yield exactly one success; the
/// loser gets `AlreadyStarted`.
pub fn activate<S: ChargingStore + ?Sized>(
    store: &S,
    window_id: WindowId,
    requester_id: RequesterId,
    now: DateTime<Utc>,
) -> AllocatorResult<OccupancyWindow> {
    let reject = |reason: RejectionReason| {
        debug!(window = window_id, requester = requester_id, %reason, "activation rejected");
        AllocatorError::ActivationRejected(reason)
    };

    let Some(mut window) = store.fetch_window_for_activation(window_id)? else {
        return Err(reject(RejectionReason::NotFound));
    };
    if window.requester_id != requester_id {
        return Err(reject(RejectionReason::NotOwner));
    }
    if window.actual_start.is_some() {
        return Err(reject(RejectionReason::AlreadyStarted));
    }
    if now >= window.scheduled_end {
        return Err(reject(RejectionReason::Expired));
    }

    window.actual_start = Some(now);
    window.updated_at = now;

    match store.persist_activated_window(&window) {
        Ok(()) => {}
        Err(StateError::Conflict(_)) => return Err(reject(RejectionReason::AlreadyStarted)),
        Err(StateError::NotFound(_)) => return Err(reject(RejectionReason::NotFound)),
        Err(StateError::Occupied(_)) => return Err(reject(RejectionReason::StationOccupied)),
        Err(e) => return Err(e.into()),
    }

    info!(
        window = window.id,
        requester = requester_id,
        station = window.station_id,
        "charging session started"
    );
    Ok(window)
}
