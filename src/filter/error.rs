use thiserror::Error;

/// Errors from the remote access oracle. Any of these is fatal for the
/// stream that triggered the check; the pipeline never falls back to
/// "allow all" on its own.
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("access oracle unavailable: {0}")]
    Unavailable(String),

    #[error("access check rejected: {0}")]
    Rejected(String),
}
