//! Allocation engine — the periodic batch that turns queued requests into
//! occupancy windows.
//!
//! One cycle:
//! 1. Load unsettled requests in arrival order (fixes queue positions)
//! 2. Score each request (`scorer`)
//! 3. Rank best first, stable on ties
//! 4. Resolve free stations (`availability`) and the slot cap (`demand`)
//! 5. Pair ranked requests with free stations one-to-one
//! 6. Persist windows + settle requests in a single transaction
//!
//! Cycles never overlap: the engine holds a non-reentrant guard, and a
//! trigger that arrives while a cycle is in flight is skipped.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use chargegrid_core::AllocatorConfig;
use chargegrid_state::*;

use crate::availability;
use crate::demand::{self, DemandPolicy, DurationCap};
use crate::error::{AllocatorError, AllocatorResult};
use crate::scorer::{self, ScoredRequest, ScoringWeights};
use crate::store::ChargingStore;
use crate::workday::Workday;

/// Everything that shapes a cycle's decisions.
#[derive(Debug, Clone)]
pub struct AllocationPolicy {
    pub weights: ScoringWeights,
    pub demand: DemandPolicy,
    pub workday: Workday,
}

impl AllocationPolicy {
    pub fn from_config(config: &AllocatorConfig) -> AllocatorResult<Self> {
        let weights = ScoringWeights {
            queue_order: config.queue_order_factor,
            distance: config.distance_factor,
            priority_bonus: config.priority_bonus,
            already_charged_penalty: config.already_charged_penalty,
        };
        if !weights.is_monotonic() {
            return Err(AllocatorError::Configuration(format!(
                "scoring weights must be non-negative with a non-positive penalty: {weights:?}"
            )));
        }
        if !(config.high_demand_threshold.is_finite() && config.high_demand_threshold >= 0.0) {
            return Err(AllocatorError::Configuration(format!(
                "high demand threshold must be a non-negative number, got {}",
                config.high_demand_threshold
            )));
        }
        Ok(Self {
            weights,
            demand: DemandPolicy {
                high_demand_threshold: config.high_demand_threshold,
                high_demand_hours_limit: config.high_demand_hours_limit,
            },
            workday: Workday::new(config.end_of_workday_hour, config.utc_offset_minutes)?,
        })
    }
}

/// Why a cycle made no assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another cycle was still running.
    CycleInProgress,
    NoPendingRequests,
    NoStationsConfigured,
    AllStationsOccupied,
    /// The cap for this cycle came out at zero hours (the last hour
    /// before the end of the workday). Requests stay queued instead of
    /// being settled into zero-length windows, so this cycle assigns
    /// nothing even when stations are free.
    NoTimeLeft,
}

/// One request placed on one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub request_id: RequestId,
    pub requester_id: RequesterId,
    pub station_id: StationId,
    pub window_id: WindowId,
    pub score: f64,
    pub duration_hours: u32,
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub at: DateTime<Utc>,
    pub pending: usize,
    pub available: usize,
    pub cap: Option<DurationCap>,
    pub assignments: Vec<Assignment>,
    pub skipped: Option<SkipReason>,
}

impl CycleReport {
    fn skipped(at: DateTime<Utc>, pending: usize, available: usize, reason: SkipReason) -> Self {
        Self {
            at,
            pending,
            available,
            cap: None,
            assignments: Vec::new(),
            skipped: Some(reason),
        }
    }
}

/// Periodic station allocator.
pub struct Allocator<S> {
    store: S,
    policy: AllocationPolicy,
    cycle_guard: Mutex<()>,
}

impl<S: ChargingStore> Allocator<S> {
    pub fn new(store: S, policy: AllocationPolicy) -> Self {
        Self {
            store,
            policy,
            cycle_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &AllocationPolicy {
        &self.policy
    }

    /// Stations not occupied by an active window at `now`.
    pub fn available_stations(&self, now: DateTime<Utc>) -> AllocatorResult<Vec<Station>> {
        let stations = self.store.list_stations()?;
        let active = self.store.list_active_windows(now)?;
        Ok(availability::available_stations(stations, &active, now))
    }

    /// Run one allocation cycle at `now`.
    ///
    /// Returns a skipped report (not an error) when a cycle is already in
    /// flight or there is nothing to do. Persistence failures are returned
    /// as errors; nothing from the failed batch is applied.
    pub fn run_cycle(&self, now: DateTime<Utc>) -> AllocatorResult<CycleReport> {
        let Ok(_guard) = self.cycle_guard.try_lock() else {
            debug!("allocation cycle already running, skipping trigger");
            return Ok(CycleReport::skipped(now, 0, 0, SkipReason::CycleInProgress));
        };
        self.cycle(now)
    }

    fn cycle(&self, now: DateTime<Utc>) -> AllocatorResult<CycleReport> {
        let queued = self.store.list_unsettled_requests()?;
        if queued.is_empty() {
            debug!("no queued requests");
            return Ok(CycleReport::skipped(now, 0, 0, SkipReason::NoPendingRequests));
        }

        let scored = self.score_all(queued, now)?;
        let pending = scored.len();
        if pending == 0 {
            return Ok(CycleReport::skipped(now, 0, 0, SkipReason::NoPendingRequests));
        }
        let ranked = scorer::rank(scored);

        let stations = self.store.list_stations()?;
        if stations.is_empty() {
            warn!(pending, "no charging stations configured, skipping cycle");
            return Ok(CycleReport::skipped(now, pending, 0, SkipReason::NoStationsConfigured));
        }
        let active = self.store.list_active_windows(now)?;
        let free = availability::available_stations(stations, &active, now);

        let hours_left = self.policy.workday.hours_until_end(now);
        let cap = match demand::classify(&self.policy.demand, pending, free.len(), hours_left) {
            Ok(cap) => cap,
            Err(AllocatorError::DivisionUndefined { .. }) => {
                debug!(pending, "all stations occupied, skipping cycle");
                return Ok(CycleReport::skipped(now, pending, 0, SkipReason::AllStationsOccupied));
            }
            Err(e) => return Err(e),
        };
        if cap.hours == 0 {
            info!(pending, "no time left for a charging slot, skipping cycle");
            return Ok(CycleReport::skipped(now, pending, free.len(), SkipReason::NoTimeLeft));
        }

        debug!(
            pending,
            available = free.len(),
            ratio = cap.demand_ratio,
            high_demand = cap.high_demand,
            cap_hours = cap.hours,
            "demand classified"
        );

        // Best request takes the first free station, and so on until one
        // side runs out.
        let mut windows = Vec::new();
        let mut settled = Vec::new();
        let mut picks = Vec::new();
        for (candidate, station) in ranked.into_iter().zip(free.iter()) {
            let hours = candidate.request.preferred_duration_hours.min(cap.hours);
            windows.push(NewOccupancyWindow {
                requester_id: candidate.request.requester_id,
                station_id: station.id,
                scheduled_start: now,
                scheduled_end: now + TimeDelta::hours(i64::from(hours)),
            });
            settled.push(candidate.request.id);
            picks.push((candidate, hours));
        }

        let created = self.store.persist_assignments(&windows, &settled, now)?;

        let assignments: Vec<Assignment> = picks
            .into_iter()
            .zip(created)
            .map(|((candidate, hours), window)| Assignment {
                request_id: candidate.request.id,
                requester_id: window.requester_id,
                station_id: window.station_id,
                window_id: window.id,
                score: candidate.score,
                duration_hours: hours,
            })
            .collect();

        for a in &assignments {
            info!(
                request = a.request_id,
                requester = a.requester_id,
                station = a.station_id,
                window = a.window_id,
                hours = a.duration_hours,
                score = a.score,
                "station assigned"
            );
        }
        info!(
            assigned = assignments.len(),
            waiting = pending - assignments.len(),
            "allocation cycle complete"
        );

        Ok(CycleReport {
            at: now,
            pending,
            available: free.len(),
            cap: Some(cap),
            assignments,
            skipped: None,
        })
    }

    /// Score requests in arrival order; position is the 1-based index.
    fn score_all(
        &self,
        queued: Vec<PendingRequest>,
        now: DateTime<Utc>,
    ) -> AllocatorResult<Vec<ScoredRequest>> {
        let start_of_day = self.policy.workday.start_of_day(now);
        let mut scored = Vec::with_capacity(queued.len());

        for (index, request) in queued.into_iter().enumerate() {
            let Some(requester) = self.store.get_requester(request.requester_id)? else {
                warn!(
                    request = request.id,
                    requester = request.requester_id,
                    "queued request references unknown requester, leaving it queued"
                );
                continue;
            };
            let already_occupied_today = self
                .store
                .find_todays_window_for_requester(requester.id, start_of_day)?
                .is_some();
            let queue_position = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let score = scorer::score(
                &self.policy.weights,
                queue_position,
                request.is_priority,
                requester.travel_distance_km,
                already_occupied_today,
            );
            scored.push(ScoredRequest {
                request,
                queue_position,
                already_occupied_today,
                score,
            });
        }

        Ok(scored)
    }

    /// Run cycles on a fixed interval until `shutdown` flips.
    ///
    /// Ticks that fall behind are skipped rather than bunched up, and a
    /// failed cycle is logged without stopping the loop.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "allocator started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cycle(Utc::now()) {
                        error!(error = %e, "allocation cycle failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("allocator shutting down");
                    break;
                }
            }
        }
    }
}
