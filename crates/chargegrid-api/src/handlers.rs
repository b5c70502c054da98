//! REST API handlers for the requester and station directory.
//!
//! Each handler reads/writes via `StateStore` and returns JSON responses.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Utc;

use chargegrid_state::*;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
pub(crate) struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub(crate) fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

pub(crate) fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

pub(crate) fn internal_error(e: impl std::fmt::Display) -> axum::response::Response {
    tracing::error!(error = %e, "request failed");
    error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR).into_response()
}

// ── Requesters ─────────────────────────────────────────────────

/// GET /api/v1/requesters
pub async fn list_requesters(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_requesters() {
        Ok(requesters) => ApiResponse::ok(requesters).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/v1/requesters/{id}
pub async fn get_requester(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
) -> impl IntoResponse {
    match state.store.get_requester(id) {
        Ok(Some(requester)) => ApiResponse::ok(requester).into_response(),
        Ok(None) => error_response("requester not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/v1/requesters
pub async fn create_requester(
    State(state): State<ApiState>,
    Json(new): Json<NewRequester>,
) -> impl IntoResponse {
    if new.name.trim().is_empty() {
        return error_response("name must not be empty", StatusCode::BAD_REQUEST).into_response();
    }
    if !(new.travel_distance_km.is_finite() && new.travel_distance_km >= 0.0) {
        return error_response(
            "travel distance must be a non-negative number",
            StatusCode::BAD_REQUEST,
        )
        .into_response();
    }
    match state.store.create_requester(&new, Utc::now()) {
        Ok(requester) => (StatusCode::CREATED, ApiResponse::ok(requester)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/v1/requesters/{id}
pub async fn delete_requester(
    State(state): State<ApiState>,
    Path(id): Path<RequesterId>,
) -> impl IntoResponse {
    match state.store.delete_requester(id) {
        Ok(true) => ApiResponse::ok("deleted").into_response(),
        Ok(false) => error_response("requester not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => internal_error(e),
    }
}

// ── Stations ───────────────────────────────────────────────────

/// GET /api/v1/stations
pub async fn list_stations(State(state): State<ApiState>) -> impl IntoResponse {
    match state.store.list_stations() {
        Ok(stations) => ApiResponse::ok(stations).into_response(),
        Err(e) => internal_error(e),
    }
}

/// GET /api/v1/stations/{id}
pub async fn get_station(
    State(state): State<ApiState>,
    Path(id): Path<StationId>,
) -> impl IntoResponse {
    match state.store.get_station(id) {
        Ok(Some(station)) => ApiResponse::ok(station).into_response(),
        Ok(None) => error_response("station not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => internal_error(e),
    }
}

/// POST /api/v1/stations
pub async fn create_station(
    State(state): State<ApiState>,
    Json(new): Json<NewStation>,
) -> impl IntoResponse {
    if new.name.trim().is_empty() {
        return error_response("name must not be empty", StatusCode::BAD_REQUEST).into_response();
    }
    match state.store.create_station(&new, Utc::now()) {
        Ok(station) => (StatusCode::CREATED, ApiResponse::ok(station)).into_response(),
        Err(e) => internal_error(e),
    }
}

/// DELETE /api/v1/stations/{id}
pub async fn delete_station(
    State(state): State<ApiState>,
    Path(id): Path<StationId>,
) -> impl IntoResponse {
    match state.store.delete_station(id) {
        Ok(true) => ApiResponse::ok("deleted").into_response(),
        Ok(false) => error_response("station not found", StatusCode::NOT_FOUND).into_response(),
        Err(e) => internal_error(e),
    }
}
