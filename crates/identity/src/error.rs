//! Identity Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only loading the lookup table can fail. Resolution never does: every
//! problem with an individual row becomes a [`Fallback`](crate::Fallback).

use derive_more::{Display, Error};

/// An identity error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// All of them are configuration problems: fix the lookup table (or the
/// configured column name) and run again.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The lookup table could not be opened or read.
    #[display("lookup table could not be read")]
    Unreadable,
    /// The lookup table is not well-formed CSV.
    #[display("lookup table is not valid CSV")]
    Malformed,
    /// A required column is absent (after trimming and lowercasing headers).
    #[display("lookup table must contain a '{_0}' column")]
    MissingColumn(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreadable)
    }
}
