//! Queue entry and the requester's own view of the queue.

use chrono::{DateTime, Utc};
use tracing::info;

use chargegrid_state::*;

use crate::error::{AllocatorError, AllocatorResult};

/// Put a requester in the charging queue.
///
/// A requester holds at most one unsettled request; a second entry is
/// refused with [`AllocatorError::AlreadyQueued`].
pub fn enter_queue(
    store: &StateStore,
    requester_id: RequesterId,
    preferred_duration_hours: u32,
    is_priority: bool,
    now: DateTime<Utc>,
) -> AllocatorResult<PendingRequest> {
    if preferred_duration_hours == 0 {
        return Err(AllocatorError::InvalidRequest(
            "preferred duration must be at least one hour".to_string(),
        ));
    }
    if store.get_requester(requester_id)?.is_none() {
        return Err(AllocatorError::RequesterNotFound(requester_id));
    }

    let new = NewPendingRequest {
        requester_id,
        preferred_duration_hours,
        is_priority,
    };
    let request = match store.insert_pending_request(&new, now) {
        Ok(request) => request,
        Err(StateError::Conflict(_)) => return Err(AllocatorError::AlreadyQueued(requester_id)),
        Err(e) => return Err(e.into()),
    };

    info!(
        request = request.id,
        requester = requester_id,
        hours = preferred_duration_hours,
        priority = is_priority,
        "entered charging queue"
    );
    Ok(request)
}

/// The requester's unsettled queue entry, if any.
pub fn queued_entry(
    store: &StateStore,
    requester_id: RequesterId,
) -> AllocatorResult<Option<PendingRequest>> {
    Ok(store.find_unsettled_request_for_requester(requester_id)?)
}

/// The requester's assigned window that has not been started yet and has
/// not run out.
pub fn unstarted_window(
    store: &StateStore,
    requester_id: RequesterId,
    now: DateTime<Utc>,
) -> AllocatorResult<Option<OccupancyWindow>> {
    Ok(store.find_unstarted_window_for_requester(requester_id, now)?)
}
