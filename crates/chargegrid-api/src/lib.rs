//! chargegrid-api — REST API for ChargeGrid.
//!
//! Axum route handlers for the requester and station directory, the
//! charging queue, charging sessions and manual allocation runs.
//!
//! The requester id in the path identifies the caller; there is no
//! authentication layer.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/v1/requesters` | List requesters |
//! | POST | `/api/v1/requesters` | Register a requester |
//! | GET | `/api/v1/requesters/{id}` | Get a requester |
//! | DELETE | `/api/v1/requesters/{id}` | Delete a requester |
//! | GET | `/api/v1/stations` | List stations |
//! | POST | `/api/v1/stations` | Add a station |
//! | GET | `/api/v1/stations/{id}` | Get a station |
//! | DELETE | `/api/v1/stations/{id}` | Remove a station |
//! | GET | `/api/v1/stations/available` | Stations free right now |
//! | GET | `/api/v1/requesters/{id}/queue` | The requester's queued entry |
//! | POST | `/api/v1/requesters/{id}/queue` | Enter the charging queue |
//! | GET | `/api/v1/requesters/{id}/session` | The requester's unstarted window |
//! | POST | `/api/v1/requesters/{id}/session/start` | Start an assigned window |
//! | GET | `/api/v1/sessions/current` | Windows in use right now |
//! | POST | `/api/v1/allocation/run` | Run an allocation cycle now |

pub mod charging_handlers;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use chargegrid_allocator::Allocator;
use chargegrid_state::StateStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: StateStore,
    pub allocator: Arc<Allocator<StateStore>>,
}

/// Build the complete API router.
pub fn build_router(store: StateStore, allocator: Arc<Allocator<StateStore>>) -> Router {
    let state = ApiState { store, allocator };

    let api_routes = Router::new()
        .route(
            "/requesters",
            get(handlers::list_requesters).post(handlers::create_requester),
        )
        .route(
            "/requesters/{id}",
            get(handlers::get_requester).delete(handlers::delete_requester),
        )
        .route(
            "/requesters/{id}/queue",
            get(charging_handlers::my_queued_entry).post(charging_handlers::enter_queue),
        )
        .route("/requesters/{id}/session", get(charging_handlers::my_unstarted_session))
        .route(
            "/requesters/{id}/session/start",
            post(charging_handlers::start_session),
        )
        .route(
            "/stations",
            get(handlers::list_stations).post(handlers::create_station),
        )
        .route("/stations/available", get(charging_handlers::available_stations))
        .route(
            "/stations/{id}",
            get(handlers::get_station).delete(handlers::delete_station),
        )
        .route("/sessions/current", get(charging_handlers::current_sessions))
        .route("/allocation/run", post(charging_handlers::run_allocation))
        .with_state(state);

    Router::new().nest("/api/v1", api_routes)
}
