//! Dump Error Types
//!
//! Only problems with a stream as a whole are fatal. Problems with individual
//! lines are raised as [`ErrorKind::MalformedLine`], counted by the reader and
//! skipped.

use crate::schema::Stream;
use derive_more::{Display, Error};

/// A dump error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for dump operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The underlying stream could not be read.
    #[display("I/O error reading {_0} stream")]
    Io(#[error(not(source))] Stream),
    /// The stream contained no records at all.
    #[display("{_0} stream is empty")]
    EmptyStream(#[error(not(source))] Stream),
    /// The header line does not name a configured column; the export format has changed.
    #[display("{stream} header has no column named '{column}'")]
    MissingColumn {
        /// The stream whose header was inspected.
        stream: Stream,
        /// The configured column name.
        column: String,
    },
    /// A single line could not be parsed.
    #[display("malformed {stream} line {line}: {reason}")]
    MalformedLine {
        /// The stream the line belongs to.
        stream: Stream,
        /// One-based line number.
        line: u64,
        /// What was wrong with it.
        reason: &'static str,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
