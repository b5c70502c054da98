//! Request scoring for allocation decisions.
//!
//! Every pending request gets a linear score from four inputs:
//! - **Queue position**: 1-based index in arrival order
//! - **Travel distance**: longer commutes score higher
//! - **Priority flag**: flat bonus
//! - **Already charged today**: flat penalty
//!
//! Higher score = served first. The function is pure; all tuning lives in
//! [`ScoringWeights`].

use chargegrid_state::PendingRequest;

/// Weights for the scoring components.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringWeights {
    pub queue_order: f64,
    pub distance: f64,
    pub priority_bonus: f64,
    /// Expected to be zero or negative.
    pub already_charged_penalty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            queue_order: 10.0,
            distance: 1.0,
            priority_bonus: 200.0,
            already_charged_penalty: -200.0,
        }
    }
}

impl ScoringWeights {
    /// Monotonic scoring needs non-negative rewards and a non-positive penalty.
    pub fn is_monotonic(&self) -> bool {
        self.queue_order >= 0.0
            && self.distance >= 0.0
            && self.priority_bonus >= 0.0
            && self.already_charged_penalty <= 0.0
    }
}

/// Score one candidate request.
pub fn score(
    weights: &ScoringWeights,
    queue_position: u32,
    is_priority: bool,
    travel_distance_km: f64,
    already_occupied_today: bool,
) -> f64 {
    let mut points = f64::from(queue_position) * weights.queue_order
        + travel_distance_km * weights.distance;
    if is_priority {
        points += weights.priority_bonus;
    }
    if already_occupied_today {
        points += weights.already_charged_penalty;
    }
    points
}

/// A pending request paired with its score for the current cycle.
#[derive(Debug, Clone)]
pub struct ScoredRequest {
    pub request: PendingRequest,
    pub queue_position: u32,
    pub already_occupied_today: bool,
    pub score: f64,
}

/// Order scored requests best first.
///
/// The sort is stable, so among equal scores the earlier arrival keeps its
/// place ahead of later ones.
pub fn rank(mut scored: Vec<ScoredRequest>) -> Vec<ScoredRequest> {
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}
