use std::io;

use thiserror::Error;

/// Errors raised by backing record storages.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The storage could not be reached or failed mid-call. Fatal for the
    /// stream that was pulling from it.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The requested record or origin does not exist. Logical, never
    /// retried.
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SourceError {
    /// Whether this error means "does not exist" rather than "broken".
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}
