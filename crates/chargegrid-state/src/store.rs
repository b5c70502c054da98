//! StateStore — redb-backed state persistence for ChargeGrid.
//!
//! Provides typed operations over requesters, stations, queued requests and
//! occupancy windows. All values are JSON-serialized into redb's `&[u8]`
//! value columns. The store supports both on-disk and in-memory backends
//! (the latter for testing).
//!
//! redb allows a single write transaction at a time, so every conditional
//! write below (queue entry, assignment batch, activation) re-reads its
//! precondition inside the write transaction and either commits or aborts
//! as a whole.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, TableHandle, WriteTransaction,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

type EntityTable = TableDefinition<'static, u64, &'static [u8]>;

/// Thread-safe state store backed by redb.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    /// Open (or create) a persistent state store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "state store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory state store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory state store opened");
        Ok(store)
    }

    /// Create all tables if they don't exist yet.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(REQUESTERS).map_err(map_err!(Table))?;
        txn.open_table(STATIONS).map_err(map_err!(Table))?;
        txn.open_table(REQUESTS).map_err(map_err!(Table))?;
        txn.open_table(WINDOWS).map_err(map_err!(Table))?;
        txn.open_table(SEQUENCES).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Requesters ─────────────────────────────────────────────────

    /// Register a requester and return it with its assigned id.
    pub fn create_requester(
        &self,
        new: &NewRequester,
        now: DateTime<Utc>,
    ) -> StateResult<Requester> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let requester = Requester {
            id: next_id(&txn, "requesters")?,
            name: new.name.clone(),
            travel_distance_km: new.travel_distance_km,
            created_at: now,
        };
        insert_entity(&txn, REQUESTERS, requester.id, &requester)?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(requester = requester.id, name = %requester.name, "requester stored");
        Ok(requester)
    }

    /// Get a requester by id.
    pub fn get_requester(&self, id: RequesterId) -> StateResult<Option<Requester>> {
        self.get_entity(REQUESTERS, id)
    }

    /// List all requesters.
    pub fn list_requesters(&self) -> StateResult<Vec<Requester>> {
        self.list_entities(REQUESTERS, |_: &Requester| true)
    }

    /// Delete a requester by id. Returns true if it existed.
    pub fn delete_requester(&self, id: RequesterId) -> StateResult<bool> {
        self.delete_entity(REQUESTERS, id)
    }

    // ── Stations ───────────────────────────────────────────────────

    /// Register a charging station and return it with its assigned id.
    pub fn create_station(&self, new: &NewStation, now: DateTime<Utc>) -> StateResult<Station> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let station = Station {
            id: next_id(&txn, "stations")?,
            name: new.name.clone(),
            created_at: now,
        };
        insert_entity(&txn, STATIONS, station.id, &station)?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(station = station.id, name = %station.name, "station stored");
        Ok(station)
    }

    /// Get a station by id.
    pub fn get_station(&self, id: StationId) -> StateResult<Option<Station>> {
        self.get_entity(STATIONS, id)
    }

    /// List all stations in id order.
    pub fn list_stations(&self) -> StateResult<Vec<Station>> {
        self.list_entities(STATIONS, |_: &Station| true)
    }

    /// Delete a station by id. Returns true if it existed.
    pub fn delete_station(&self, id: StationId) -> StateResult<bool> {
        self.delete_entity(STATIONS, id)
    }

    // ── Pending requests ───────────────────────────────────────────

    /// Append a request to the queue unless the requester already has an
    /// unsettled one, in which case `StateError::Conflict` is returned and
    /// nothing is written.
    pub fn insert_pending_request(
        &self,
        new: &NewPendingRequest,
        now: DateTime<Utc>,
    ) -> StateResult<PendingRequest> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let table = txn.open_table(REQUESTS).map_err(map_err!(Table))?;
            for entry in table.iter().map_err(map_err!(Read))? {
                let (_, value) = entry.map_err(map_err!(Read))?;
                let existing: PendingRequest = decode(value.value())?;
                if existing.requester_id == new.requester_id && !existing.settled {
                    return Err(StateError::Conflict(format!(
                        "requester {} already has queued request {}",
                        new.requester_id, existing.id
                    )));
                }
            }
        }
        let request = PendingRequest {
            id: next_id(&txn, "requests")?,
            requester_id: new.requester_id,
            preferred_duration_hours: new.preferred_duration_hours,
            is_priority: new.is_priority,
            settled: false,
            created_at: now,
            updated_at: now,
        };
        insert_entity(&txn, REQUESTS, request.id, &request)?;
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            request = request.id,
            requester = request.requester_id,
            "pending request stored"
        );
        Ok(request)
    }

    /// Get a pending request by id (settled or not).
    pub fn get_request(&self, id: RequestId) -> StateResult<Option<PendingRequest>> {
        self.get_entity(REQUESTS, id)
    }

    /// All unsettled requests in ascending creation order (ties by id).
    pub fn list_unsettled_requests(&self) -> StateResult<Vec<PendingRequest>> {
        let mut requests = self.list_entities(REQUESTS, |r: &PendingRequest| !r.settled)?;
        requests.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(requests)
    }

    /// The requester's queued entry, if one is still waiting.
    pub fn find_unsettled_request_for_requester(
        &self,
        requester_id: RequesterId,
    ) -> StateResult<Option<PendingRequest>> {
        let mut found = self.list_entities(REQUESTS, |r: &PendingRequest| {
            r.requester_id == requester_id && !r.settled
        })?;
        Ok(found.pop())
    }

    // ── Occupancy windows ──────────────────────────────────────────

    /// Get a window by id.
    pub fn get_window(&self, id: WindowId) -> StateResult<Option<OccupancyWindow>> {
        self.get_entity(WINDOWS, id)
    }

    /// List every window ever created.
    pub fn list_windows(&self) -> StateResult<Vec<OccupancyWindow>> {
        self.list_entities(WINDOWS, |_: &OccupancyWindow| true)
    }

    /// Windows that are started and not yet past their scheduled end.
    pub fn list_active_windows(&self, now: DateTime<Utc>) -> StateResult<Vec<OccupancyWindow>> {
        self.list_entities(WINDOWS, |w: &OccupancyWindow| w.is_active(now))
    }

    /// A window of this requester that was started after `start_of_day`.
    pub fn find_window_started_since(
        &self,
        requester_id: RequesterId,
        start_of_day: DateTime<Utc>,
    ) -> StateResult<Option<OccupancyWindow>> {
        let mut found = self.list_entities(WINDOWS, |w: &OccupancyWindow| {
            w.requester_id == requester_id
                && w.actual_start.is_some_and(|started| started > start_of_day)
        })?;
        Ok(found.pop())
    }

    /// The requester's assigned window that has not been started yet.
    pub fn find_unstarted_window_for_requester(
        &self,
        requester_id: RequesterId,
        now: DateTime<Utc>,
    ) -> StateResult<Option<OccupancyWindow>> {
        let mut found = self.list_entities(WINDOWS, |w: &OccupancyWindow| {
            w.requester_id == requester_id && w.is_unstarted(now)
        })?;
        Ok(found.pop())
    }

    /// Write a batch of new windows and settle the consumed requests in one
    /// transaction.
    ///
    /// Every request in `settled` must exist and still be unsettled; if any
    /// is not, the transaction is dropped and nothing is written.
    pub fn persist_assignments(
        &self,
        windows: &[NewOccupancyWindow],
        settled: &[RequestId],
        now: DateTime<Utc>,
    ) -> StateResult<Vec<OccupancyWindow>> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(REQUESTS).map_err(map_err!(Table))?;
            for &id in settled {
                let mut request: PendingRequest = match table.get(id).map_err(map_err!(Read))? {
                    Some(guard) => decode(guard.value())?,
                    None => return Err(StateError::NotFound(format!("request {id}"))),
                };
                if request.settled {
                    return Err(StateError::Conflict(format!("request {id} already settled")));
                }
                request.settled = true;
                request.updated_at = now;
                let value = serde_json::to_vec(&request).map_err(map_err!(Serialize))?;
                table
                    .insert(id, value.as_slice())
                    .map_err(map_err!(Write))?;
            }
        }

        let mut created = Vec::with_capacity(windows.len());
        for new in windows {
            let window = OccupancyWindow {
                id: next_id(&txn, "windows")?,
                requester_id: new.requester_id,
                station_id: new.station_id,
                scheduled_start: new.scheduled_start,
                scheduled_end: new.scheduled_end,
                actual_start: None,
                created_at: now,
                updated_at: now,
            };
            insert_entity(&txn, WINDOWS, window.id, &window)?;
            created.push(window);
        }

        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            windows = created.len(),
            settled = settled.len(),
            "assignment batch committed"
        );
        Ok(created)
    }

    /// Persist an activated window if the stored copy is still unstarted.
    ///
    /// Only `actual_start` and `updated_at` are taken from `window`; the
    /// rest of the stored row is kept. Returns `StateError::Conflict` when
    /// another writer already set `actual_start`, and `StateError::Occupied`
    /// when a different window on the same station is active at the new
    /// start time. Either way the stored window is left untouched.
    pub fn activate_window(&self, window: &OccupancyWindow) -> StateResult<()> {
        let Some(started) = window.actual_start else {
            return Err(StateError::Write(format!(
                "window {} has no start time to persist",
                window.id
            )));
        };

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(WINDOWS).map_err(map_err!(Table))?;
            let mut stored: OccupancyWindow = match table.get(window.id).map_err(map_err!(Read))? {
                Some(guard) => decode(guard.value())?,
                None => return Err(StateError::NotFound(format!("window {}", window.id))),
            };
            if stored.actual_start.is_some() {
                return Err(StateError::Conflict(format!(
                    "window {} already started",
                    window.id
                )));
            }

            for entry in table.iter().map_err(map_err!(Read))? {
                let (_, value) = entry.map_err(map_err!(Read))?;
                let other: OccupancyWindow = decode(value.value())?;
                if other.id != stored.id
                    && other.station_id == stored.station_id
                    && other.is_active(started)
                {
                    return Err(StateError::Occupied(format!(
                        "station {} is in use by window {}",
                        stored.station_id, other.id
                    )));
                }
            }

            stored.actual_start = Some(started);
            stored.updated_at = window.updated_at;
            let value = serde_json::to_vec(&stored).map_err(map_err!(Serialize))?;
            table
                .insert(stored.id, value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(window = window.id, "window activated");
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get_entity<T: DeserializeOwned>(&self, def: EntityTable, id: u64) -> StateResult<Option<T>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        match table.get(id).map_err(map_err!(Read))? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }

    fn list_entities<T, F>(&self, def: EntityTable, keep: F) -> StateResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(def).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let item: T = decode(value.value())?;
            if keep(&item) {
                results.push(item);
            }
        }
        Ok(results)
    }

    fn delete_entity(&self, def: EntityTable, id: u64) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(def).map_err(map_err!(Table))?;
            existed = table.remove(id).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(table = def.name(), id, existed, "entity deleted");
        Ok(existed)
    }
}

/// Allocate the next id for `name` inside an open write transaction.
fn next_id(txn: &WriteTransaction, name: &str) -> StateResult<u64> {
    let mut table = txn.open_table(SEQUENCES).map_err(map_err!(Table))?;
    let last = table
        .get(name)
        .map_err(map_err!(Read))?
        .map(|guard| guard.value())
        .unwrap_or(0);
    let next = last + 1;
    table.insert(name, next).map_err(map_err!(Write))?;
    Ok(next)
}

fn insert_entity<T: Serialize>(
    txn: &WriteTransaction,
    def: EntityTable,
    id: u64,
    item: &T,
) -> StateResult<()> {
    let value = serde_json::to_vec(item).map_err(map_err!(Serialize))?;
    let mut table = txn.open_table(def).map_err(map_err!(Table))?;
    table
        .insert(id, value.as_slice())
        .map_err(map_err!(Write))?;
    Ok(())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StateResult<T> {
    serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn seed_requester(store: &StateStore, name: &str) -> Requester {
        store
            .create_requester(
                &NewRequester {
                    name: name.to_string(),
                    travel_distance_km: 12.5,
                },
                at(8, 0),
            )
            .unwrap()
    }

    fn queue(store: &StateStore, requester_id: RequesterId, when: DateTime<Utc>) -> PendingRequest {
        store
            .insert_pending_request(
                &NewPendingRequest {
                    requester_id,
                    preferred_duration_hours: 4,
                    is_priority: false,
                },
                when,
            )
            .unwrap()
    }

    fn new_window(requester_id: RequesterId, station_id: StationId) -> NewOccupancyWindow {
        NewOccupancyWindow {
            requester_id,
            station_id,
            scheduled_start: at(10, 0),
            scheduled_end: at(12, 0),
        }
    }

    // ── Requester / station CRUD ───────────────────────────────────

    #[test]
    fn requester_create_and_get() {
        let store = StateStore::open_in_memory().unwrap();
        let created = seed_requester(&store, "ana");

        assert_eq!(created.id, 1);
        let retrieved = store.get_requester(created.id).unwrap();
        assert_eq!(retrieved, Some(created));
    }

    #[test]
    fn ids_are_allocated_per_table() {
        let store = StateStore::open_in_memory().unwrap();
        let a = seed_requester(&store, "ana");
        let b = seed_requester(&store, "bo");
        let s = store
            .create_station(&NewStation { name: "bay-1".into() }, at(8, 0))
            .unwrap();

        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(s.id, 1);
    }

    #[test]
    fn station_list_and_delete() {
        let store = StateStore::open_in_memory().unwrap();
        for name in ["bay-1", "bay-2", "bay-3"] {
            store
                .create_station(&NewStation { name: name.into() }, at(8, 0))
                .unwrap();
        }

        let names: Vec<_> = store
            .list_stations()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["bay-1", "bay-2", "bay-3"]);

        assert!(store.delete_station(2).unwrap());
        assert!(!store.delete_station(2).unwrap());
        assert_eq!(store.list_stations().unwrap().len(), 2);
    }

    // ── Queue ──────────────────────────────────────────────────────

    #[test]
    fn second_unsettled_entry_is_rejected() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        queue(&store, ana.id, at(9, 0));

        let second = store.insert_pending_request(
            &NewPendingRequest {
                requester_id: ana.id,
                preferred_duration_hours: 2,
                is_priority: true,
            },
            at(9, 5),
        );
        assert!(matches!(second, Err(StateError::Conflict(_))));
        assert_eq!(store.list_unsettled_requests().unwrap().len(), 1);
    }

    #[test]
    fn unsettled_requests_come_back_in_creation_order() {
        let store = StateStore::open_in_memory().unwrap();
        let a = seed_requester(&store, "a");
        let b = seed_requester(&store, "b");
        let c = seed_requester(&store, "c");
        // Inserted out of chronological order on purpose.
        queue(&store, b.id, at(9, 30));
        queue(&store, c.id, at(9, 45));
        queue(&store, a.id, at(9, 0));

        let order: Vec<_> = store
            .list_unsettled_requests()
            .unwrap()
            .into_iter()
            .map(|r| r.requester_id)
            .collect();
        assert_eq!(order, vec![a.id, b.id, c.id]);
    }

    // ── Assignment batch ───────────────────────────────────────────

    #[test]
    fn assignment_batch_settles_and_creates_windows() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));

        let windows = store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap();

        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].actual_start, None);
        assert!(store.get_request(request.id).unwrap().unwrap().settled);
        assert!(store.list_unsettled_requests().unwrap().is_empty());
        assert_eq!(store.get_window(windows[0].id).unwrap(), Some(windows[0].clone()));
    }

    #[test]
    fn assignment_batch_is_all_or_nothing() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));

        // Second id does not exist: the whole batch must be rolled back.
        let result = store.persist_assignments(
            &[new_window(ana.id, 1), new_window(99, 2)],
            &[request.id, 999],
            at(10, 0),
        );

        assert!(matches!(result, Err(StateError::NotFound(_))));
        assert!(!store.get_request(request.id).unwrap().unwrap().settled);
        assert!(store.list_windows().unwrap().is_empty());
    }

    #[test]
    fn settling_twice_conflicts() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));
        store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap();

        let again = store.persist_assignments(&[new_window(ana.id, 2)], &[request.id], at(10, 10));
        assert!(matches!(again, Err(StateError::Conflict(_))));
        assert_eq!(store.list_windows().unwrap().len(), 1);
    }

    // ── Windows ────────────────────────────────────────────────────

    #[test]
    fn activation_is_compare_and_set() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));
        let window = store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap()
            .remove(0);

        let mut started = window.clone();
        started.actual_start = Some(at(10, 5));
        started.updated_at = at(10, 5);
        store.activate_window(&started).unwrap();

        let mut late = window.clone();
        late.actual_start = Some(at(10, 6));
        assert!(matches!(store.activate_window(&late), Err(StateError::Conflict(_))));

        let stored = store.get_window(window.id).unwrap().unwrap();
        assert_eq!(stored.actual_start, Some(at(10, 5)));
    }

    #[test]
    fn activation_refused_while_station_in_use() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let bo = seed_requester(&store, "bo");
        let first = queue(&store, ana.id, at(9, 0));
        let second = queue(&store, bo.id, at(9, 1));
        let windows = store
            .persist_assignments(
                &[new_window(ana.id, 1), new_window(bo.id, 1)],
                &[first.id, second.id],
                at(10, 0),
            )
            .unwrap();

        let mut started = windows[0].clone();
        started.actual_start = Some(at(10, 5));
        store.activate_window(&started).unwrap();

        let mut blocked = windows[1].clone();
        blocked.actual_start = Some(at(10, 6));
        assert!(matches!(store.activate_window(&blocked), Err(StateError::Occupied(_))));
        assert_eq!(store.get_window(windows[1].id).unwrap().unwrap().actual_start, None);
        assert_eq!(store.list_active_windows(at(10, 30)).unwrap().len(), 1);
    }

    #[test]
    fn activation_keeps_stored_schedule() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));
        let window = store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap()
            .remove(0);

        let mut tampered = window.clone();
        tampered.actual_start = Some(at(10, 5));
        tampered.updated_at = at(10, 5);
        tampered.station_id = 99;
        tampered.scheduled_end = window.scheduled_end + Duration::hours(6);
        store.activate_window(&tampered).unwrap();

        let stored = store.get_window(window.id).unwrap().unwrap();
        assert_eq!(stored.actual_start, Some(at(10, 5)));
        assert_eq!(stored.updated_at, at(10, 5));
        assert_eq!(stored.station_id, window.station_id);
        assert_eq!(stored.scheduled_end, window.scheduled_end);
    }

    #[test]
    fn activation_without_start_time_is_refused() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));
        let window = store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap()
            .remove(0);

        assert!(matches!(store.activate_window(&window), Err(StateError::Write(_))));
        assert_eq!(store.get_window(window.id).unwrap().unwrap().actual_start, None);
    }

    #[test]
    fn active_and_today_queries() {
        let store = StateStore::open_in_memory().unwrap();
        let ana = seed_requester(&store, "ana");
        let request = queue(&store, ana.id, at(9, 0));
        let window = store
            .persist_assignments(&[new_window(ana.id, 1)], &[request.id], at(10, 0))
            .unwrap()
            .remove(0);

        assert!(store.list_active_windows(at(10, 30)).unwrap().is_empty());
        assert!(store
            .find_unstarted_window_for_requester(ana.id, at(10, 30))
            .unwrap()
            .is_some());

        let mut started = window;
        started.actual_start = Some(at(10, 15));
        store.activate_window(&started).unwrap();

        assert_eq!(store.list_active_windows(at(10, 30)).unwrap().len(), 1);
        assert!(store.list_active_windows(at(12, 0)).unwrap().is_empty());

        let midnight = at(0, 0);
        assert!(store.find_window_started_since(ana.id, midnight).unwrap().is_some());
        let tomorrow = midnight + Duration::days(1);
        assert!(store.find_window_started_since(ana.id, tomorrow).unwrap().is_none());
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = StateStore::open(&db_path).unwrap();
            seed_requester(&store, "ana");
        }

        // Reopen the same database file; the sequence must continue.
        let store = StateStore::open(&db_path).unwrap();
        assert_eq!(store.get_requester(1).unwrap().unwrap().name, "ana");
        assert_eq!(seed_requester(&store, "bo").id, 2);
    }

    #[test]
    fn empty_store_operations() {
        let store = StateStore::open_in_memory().unwrap();

        assert!(store.list_requesters().unwrap().is_empty());
        assert!(store.list_stations().unwrap().is_empty());
        assert!(store.list_unsettled_requests().unwrap().is_empty());
        assert!(store.list_windows().unwrap().is_empty());
        assert!(store.get_window(1).unwrap().is_none());
        assert!(!store.delete_requester(1).unwrap());
    }
}
