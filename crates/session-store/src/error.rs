use std::path::PathBuf;

use thiserror::Error;

/// Errors raised inside session store backends.
///
/// These never cross the [`SessionStore`](crate::SessionStore) boundary; the
/// backends log them and fall back to "no data".
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for session store backend operations.
pub type Result<T> = std::result::Result<T, SessionStoreError>;
