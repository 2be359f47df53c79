//! Binary Error Types
//!
//! Anything surfacing here stops the run with a non-zero exit status.

use derive_more::{Display, Error};

/// A run error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for the binary.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not load the subject lookup table")]
    Mapping,
    #[display("invalid destination path template")]
    Template,
    #[display("could not open the source tree")]
    Source,
    #[display("could not open the output tree")]
    Output,
    #[display("run aborted before every subject was processed")]
    Aborted,
}
