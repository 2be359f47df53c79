//! Library Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The [`organize`](crate::organize) module raises its
//! own [`ErrorKind`](crate::organize::error::ErrorKind) into these.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("issue with path generation from template")]
    Template,
    #[display("could not organize the source tree")]
    Organize,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Template => false,
            Self::Organize => false,
        }
    }
}
