//! Availability resolution — which stations are free right now.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use chargegrid_state::{OccupancyWindow, Station, StationId};

/// Stations not referenced by any window active at `now`.
///
/// Keeps the order of `stations`. Windows that are not active at `now`
/// (unstarted, expired) are ignored even if passed in.
pub fn available_stations(
    stations: Vec<Station>,
    windows: &[OccupancyWindow],
    now: DateTime<Utc>,
) -> Vec<Station> {
    let occupied: HashSet<StationId> = windows
        .iter()
        .filter(|w| w.is_active(now))
        .map(|w| w.station_id)
        .collect();

    stations
        .into_iter()
        .filter(|s| !occupied.contains(&s.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 11, 0, 0).unwrap()
    }

    fn station(id: StationId) -> Station {
        Station {
            id,
            name: format!("bay-{id}"),
            created_at: now(),
        }
    }

    fn window(
        station_id: StationId,
        actual_start: Option<DateTime<Utc>>,
        ends_in_hours: i64,
    ) -> OccupancyWindow {
        OccupancyWindow {
            id: station_id * 10,
            requester_id: 1,
            station_id,
            scheduled_start: now() - TimeDelta::hours(1),
            scheduled_end: now() + TimeDelta::hours(ends_in_hours),
            actual_start,
            created_at: now(),
            updated_at: now(),
        }
    }

    fn ids(stations: &[Station]) -> Vec<StationId> {
        stations.iter().map(|s| s.id).collect()
    }

    #[test]
    fn all_free_without_windows() {
        let free = available_stations(vec![station(1), station(2)], &[], now());
        assert_eq!(ids(&free), vec![1, 2]);
    }

    #[test]
    fn active_window_excludes_its_station() {
        let started = Some(now() - TimeDelta::minutes(30));
        let free = available_stations(
            vec![station(1), station(2), station(3)],
            &[window(2, started, 1)],
            now(),
        );
        assert_eq!(ids(&free), vec![1, 3]);
    }

    #[test]
    fn unstarted_window_does_not_occupy() {
        let free = available_stations(vec![station(1)], &[window(1, None, 2)], now());
        assert_eq!(ids(&free), vec![1]);
    }

    #[test]
    fn window_ending_now_no_longer_occupies() {
        let started = Some(now() - TimeDelta::hours(1));
        let free = available_stations(vec![station(1)], &[window(1, started, 0)], now());
        assert_eq!(ids(&free), vec![1]);
    }

    #[test]
    fn window_started_exactly_now_occupies() {
        let free = available_stations(vec![station(1)], &[window(1, Some(now()), 2)], now());
        assert!(free.is_empty());
    }
}
