//! Catalog Error Types
//!
//! Building a record is infallible; starting a worker pool and writing to a
//! sink are not.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Writing to the underlying sink failed.
    #[display("I/O error")]
    Io,
    /// A record could not be serialized.
    #[display("failed to serialize {_0}")]
    Serialize(#[error(not(source))] &'static str),
    /// The worker pool could not be started.
    #[display("failed to start worker pool")]
    WorkerPool,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::WorkerPool)
    }
}
