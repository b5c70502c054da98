//! Allocator error types.

use serde::Serialize;
use thiserror::Error;

use chargegrid_state::{RequesterId, StateError};

/// Errors that can occur during allocation and session operations.
#[derive(Debug, Error)]
pub enum AllocatorError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("demand ratio undefined: {pending} pending requests but no available stations")]
    DivisionUndefined { pending: usize },

    #[error("activation rejected: {0}")]
    ActivationRejected(RejectionReason),

    #[error("requester {0} already has a queued request")]
    AlreadyQueued(RequesterId),

    #[error("requester not found: {0}")]
    RequesterNotFound(RequesterId),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("state store error: {0}")]
    State(#[from] StateError),
}

/// Why an activation attempt was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("no such window")]
    NotFound,
    #[error("window belongs to another requester")]
    NotOwner,
    #[error("window already started")]
    AlreadyStarted,
    #[error("window has expired")]
    Expired,
    /// Another window on the same station is already in use.
    #[error("station is in use by another session")]
    StationOccupied,
}

pub type AllocatorResult<T> = Result<T, AllocatorError>;
