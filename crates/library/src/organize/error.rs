//! Error types for the [`organize`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An organize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for organize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an organize failure.
///
/// ### Fatal
/// - [`ErrorKind::Discovery`]: the source root could not be listed; the run
///   ends.
///
/// ### Per subject or per file
/// - [`ErrorKind::Listing`]
/// - [`ErrorKind::Template`]
/// - [`ErrorKind::Storage`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The subject folders of the source root could not be listed.
    #[display("could not discover subject folders")]
    Discovery,
    /// The images below a subject folder could not be listed.
    #[display("could not list images for subject {_0}")]
    Listing(#[error(not(source))] String),
    /// The [`PathGenerator`](crate::PathGenerator) could not render a path.
    #[display("could not render destination path")]
    Template,
    /// Copying to, or comparing against, the destination failed.
    #[display("storage operation failed")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Discovery | Self::Listing(_) | Self::Storage => true,
            Self::Template => false,
        }
    }
}
