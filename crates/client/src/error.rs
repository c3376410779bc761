//! Client error types.

use domain::ValidationError;
use ordering::{OrderError, RemoteError};
use thiserror::Error;

/// Errors surfaced by the command-line client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// An ordering operation failed.
    #[error("{0}")]
    Order(#[from] OrderError),

    /// The user asked for something that does not exist or makes no sense.
    #[error("{0}")]
    InvalidInput(String),

    /// The action needs a signed-in customer.
    #[error("Not signed in; run `dine login` first")]
    NotSignedIn,
}

impl From<RemoteError> for ClientError {
    fn from(err: RemoteError) -> Self {
        ClientError::Order(err.into())
    }
}

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Order(err.into())
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
