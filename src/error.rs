//! Error taxonomy for the boundaries the engine actually crosses.
//!
//! The pipeline itself (filter/sort/pair/aggregate/layout) is total over
//! well-formed input and never returns an error; only hydration, the write
//! path, and the local scanner can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Hydration data that does not decode. The caller degrades to an empty
    /// record set instead of halting.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("scan root does not exist: {0}")]
    MissingRoot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
