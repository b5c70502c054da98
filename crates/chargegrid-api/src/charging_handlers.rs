//! REST API handlers for the charging queue, sessions and allocation runs.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;

use chargegrid_allocator::{AllocatorError, RejectionReason, queue, session};
use chargegrid_state::*;

use crate::ApiState;
use crate::handlers::{ApiResponse, error_response, internal_error};

/// Map an allocator error onto an HTTP error response.
fn allocator_error(e: AllocatorError) -> Response {
    let status = match &e {
        AllocatorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        AllocatorError::RequesterNotFound(_) => StatusCode::NOT_FOUND,
        AllocatorError::AlreadyQueued(_) => StatusCode::CONFLICT,
        AllocatorError::ActivationRejected(reason) => match reason {
            RejectionReason::NotFound => StatusCode::NOT_FOUND,
            RejectionReason::NotOwner => StatusCode::FORBIDDEN,
            RejectionReason::AlreadyStarted
            | RejectionReason::Expired
            | RejectionReason::StationOccupied => StatusCode::CONFLICT,
        },
        _ => return internal_error(e),
    };
    error_response(&e.to_string(), status).into_response()
}

// ── Queue ──────────────────────────────────────────────────────

/// Queue entry request body.
#[derive(serde::Deserialize)]
pub struct EnterQueueRequest {
    pub preferred_duration_hours: u32,
    #[serde(default)]
    pub is_priority: bool,
}

/// POST /api/v1/requesters/{id}/queue
pub async fn enter_queue(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
    Json(req): Json<EnterQueueRequest>,
) -> impl IntoResponse {
    match queue::enter_queue(
        &state.store,
        id,
        req.preferred_duration_hours,
        req.is_priority,
        Utc::now(),
    ) {
        Ok(request) => (StatusCode::CREATED, ApiResponse::ok(request)).into_response(),
        Err(e) => allocator_error(e),
    }
}

/// GET /api/v1/requesters/{id}/queue
pub async fn my_queued_entry(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
) -> impl IntoResponse {
    match queue::queued_entry(&state.store, id) {
        Ok(Some(request)) => ApiResponse::ok(request).into_response(),
        Ok(None) => error_response("no queued entry", StatusCode::NOT_FOUND).into_response(),
        Err(e) => allocator_error(e),
    }
}

// ── Sessions ───────────────────────────────────────────────────

/// GET /api/v1/requesters/{id}/session
pub async fn my_unstarted_session(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
) -> impl IntoResponse {
    match queue::unstarted_window(&state.store, id, Utc::now()) {
        Ok(Some(window)) => ApiResponse::ok(window).into_response(),
        Ok(None) => error_response("no unstarted session", StatusCode::NOT_FOUND).into_response(),
        Err(e) => allocator_error(e),
    }
}

/// Session start request body.
#[derive(serde::Deserialize)]
pub struct StartSessionRequest {
    pub window_id: WindowId,
}

/// POST /api/v1/requesters/{id}/session/start
pub async fn start_session(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    if req.window_id == 0 {
        return error_response("window id must be positive", StatusCode::BAD_REQUEST)
            .into_response();
    }
    match session::activate(&state.store, req.window_id, id, Utc::now()) {
        Ok(window) => ApiResponse::ok(window).into_response(),
        Err(e) => allocator_error(e),
    }
}

/// GET /api/v1/sessions/current
pub async fn current_sessions(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_active_windows(Utc::now()) {
        Ok(windows) => ApiResponse::ok(windows).into_response(),
        Err(e) => internal_error(e),
    }
}

// ── Stations & allocation ──────────────────────────────────────

/// GET /api/v1/stations/available
pub async fn available_stations(State(state): State<ApiState>) -> impl IntoResponse {
    match state.allocator.available_stations(Utc::now()) {
        Ok(stations) => ApiResponse::ok(stations).into_response(),
        Err(e) => allocator_error(e),
    }
}

/// POST /api/v1/allocation/run
///
/// Shares the allocator's cycle guard with the background loop, so a run
/// requested while a cycle is in flight comes back as skipped.
pub async fn run_allocation(State(state): State<ApiState>) -> impl IntoResponse {
    match state.allocator.run_cycle(Utc::now()) {
        Ok(report) => ApiResponse::ok(report).into_response(),
        Err(e) => allocator_error(e),
    }
}
