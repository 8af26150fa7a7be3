//! Classification Error Types
//!
//! Classification itself never fails: a filename either yields an episode or
//! it doesn't. The only fallible step is building a [`Lexicon`](crate::Lexicon)
//! from user-supplied phrase lists.

use derive_more::{Display, Error};

/// A classification error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for classification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A phrase list contains an entry that cannot be matched against.
    #[display("invalid phrase in '{list}' list: {phrase:?}")]
    InvalidPhrase {
        /// The list the phrase belongs to.
        list: &'static str,
        /// The offending phrase.
        phrase: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Phrase lists are configuration; retrying with the same lists changes nothing.
        false
    }
}
