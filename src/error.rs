//! Driver Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A driver error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for driver operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configuration could not be loaded; fix the file or environment.
    #[display("invalid configuration")]
    Config,
    /// An input export could not be opened or read.
    #[display("failed to read {}", _0.display())]
    Input(#[error(not(source))] PathBuf),
    /// The exports could not be joined or processed.
    #[display("failed to build catalog")]
    Pipeline,
    /// Catalog output could not be written.
    #[display("failed to write {_0}")]
    Output(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Output(_))
    }
}
