//! Classification Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Classification itself is infallible (no rule matching is a valid outcome,
//! see [`Classification::NoMatch`](crate::Classification::NoMatch)); only
//! reading a sidecar document into a [`MetadataRecord`](crate::MetadataRecord)
//! can fail.

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
    /// The sidecar is not valid JSON. Skip the image it belongs to.
    #[display("sidecar is not valid JSON")]
    InvalidSidecar,
    /// The sidecar is valid JSON, but the top-level value isn't an object.
    #[display("sidecar must be a JSON object, found {_0}")]
    UnexpectedSidecarShape(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // The document is either valid or it isn't; re-reading the same
        // bytes won't change that.
        false
    }
}
