//! Ordering error types.

use common::OrderRef;
use domain::ValidationError;
use thiserror::Error;

/// A backend call that did not produce a usable answer.
///
/// Local state is never modified when one of these is returned, so the same
/// action can simply be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never got a response (connection, timeout, TLS).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The backend has no such resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// An action blocked by the current lifecycle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// Payment attempted before the kitchen marked the order served.
    #[error("Cannot process payment until food is served")]
    NotServed,

    /// A new order was attempted while one is still open.
    #[error("Order {0} is still open; add items to it instead")]
    OrderAlreadyOpen(OrderRef),

    /// Another mutating request from this session has not finished yet.
    #[error("Another request is already in progress")]
    RequestInFlight,
}

/// Broad category of an [`OrderError`], for choosing how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Remote,
    Precondition,
}

/// Errors returned by the ordering operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The caller left something out.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend call failed.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// The lifecycle state does not allow the action yet.
    #[error("{0}")]
    Precondition(#[from] PreconditionError),
}

impl OrderError {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrderError::Validation(_) => ErrorKind::Validation,
            OrderError::Remote(_) => ErrorKind::Remote,
            OrderError::Precondition(_) => ErrorKind::Precondition,
        }
    }

    /// Returns true if repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, OrderError::Remote(_))
    }
}

/// Convenience type alias for ordering results.
pub type Result<T> = std::result::Result<T, OrderError>;
