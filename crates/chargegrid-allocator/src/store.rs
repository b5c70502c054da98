//! The persistence operations the allocator depends on.
//!
//! `ChargingStore` is implemented for the redb-backed [`StateStore`]; tests
//! wrap it to inject failures.

use chrono::{DateTime, Utc};

use chargegrid_state::*;

pub trait ChargingStore: Send + Sync {
    /// Unsettled requests in ascending creation order.
    fn list_unsettled_requests(&self) -> StateResult<Vec<PendingRequest>>;

    fn list_stations(&self) -> StateResult<Vec<Station>>;

    fn list_active_windows(&self, now: DateTime<Utc>) -> StateResult<Vec<OccupancyWindow>>;

    /// A window of the requester started after `start_of_day`, if any.
    fn find_todays_window_for_requester(
        &self,
        requester_id: RequesterId,
        start_of_day: DateTime<Utc>,
    ) -> StateResult<Option<OccupancyWindow>>;

    fn get_requester(&self, requester_id: RequesterId) -> StateResult<Option<Requester>>;

    /// Create the windows and settle the requests atomically.
    fn persist_assignments(
        &self,
        windows: &[NewOccupancyWindow],
        settled: &[RequestId],
        now: DateTime<Utc>,
    ) -> StateResult<Vec<OccupancyWindow>>;

    fn fetch_window_for_activation(
        &self,
        window_id: WindowId,
    ) -> StateResult<Option<OccupancyWindow>>;

    /// Write the activated window; fails with `StateError::Conflict` if the
    /// stored copy was started in the meantime.
    fn persist_activated_window(&self, window: &OccupancyWindow) -> StateResult<()>;
}

impl ChargingStore for StateStore {
    fn list_unsettled_requests(&self) -> StateResult<Vec<PendingRequest>> {
        StateStore::list_unsettled_requests(self)
    }

    fn list_stations(&self) -> StateResult<Vec<Station>> {
        StateStore::list_stations(self)
    }

    fn list_active_windows(&self, now: DateTime<Utc>) -> StateResult<Vec<OccupancyWindow>> {
        StateStore::list_active_windows(self, now)
    }

    fn find_todays_window_for_requester(
        &self,
        requester_id: RequesterId,
        start_of_day: DateTime<Utc>,
    ) -> StateResult<Option<OccupancyWindow>> {
        self.find_window_started_since(requester_id, start_of_day)
    }

    fn get_requester(&self, requester_id: RequesterId) -> StateResult<Option<Requester>> {
        StateStore::get_requester(self, requester_id)
    }

    fn persist_assignments(
        &self,
        windows: &[NewOccupancyWindow],
        settled: &[RequestId],
        now: DateTime<Utc>,
    ) -> StateResult<Vec<OccupancyWindow>> {
        StateStore::persist_assignments(self, windows, settled, now)
    }

    fn fetch_window_for_activation(
        &self,
        window_id: WindowId,
    ) -> StateResult<Option<OccupancyWindow>> {
        self.get_window(window_id)
    }

    fn persist_activated_window(&self, window: &OccupancyWindow) -> StateResult<()> {
        self.activate_window(window)
    }
}
