//! Organizes a tree of per-subject NIfTI scans into a BIDS layout.
//!
//! [`organize`](organize::organize) walks the subject folders of a source
//! backend one at a time, resolves each folder to a de-identified
//! [`SubjectLabel`](bidsify_identity::SubjectLabel), classifies every image
//! found below it, and copies the image with its sidecars to the
//! destination backend under a path rendered by [`PathGenerator`].

mod discover;
pub mod error;
pub mod organize;
mod template;

pub use crate::discover::{IMAGE_EXTENSIONS, Image, images, subjects};
pub use crate::template::{DEFAULT_TEMPLATE, Destination, PathGenerator};
use bidsify_identity::SubjectMappingTable;

/// Everything a run needs besides the two storage backends.
pub struct Context {
    /// Accession to record id lookup, loaded once before the run.
    pub mapping: SubjectMappingTable,
    /// Session label rendered as `ses-<session>`.
    pub session: String,
    pub template: PathGenerator,
}
impl Context {
    pub fn new(mapping: SubjectMappingTable, session: impl Into<String>, template: PathGenerator) -> Self {
        Self {
            mapping,
            session: session.into(),
            template,
        }
    }
}
