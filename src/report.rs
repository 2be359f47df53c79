//! Logging and tallying organize events.

use bidsify_library::error::Error as LibraryError;
use bidsify_library::organize::{Action, OrganizeEvent};

/// Running totals for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub subjects: u64,
    /// Subjects labelled with their accession instead of a record id.
    pub fallbacks: u64,
    /// Subject folders without any image.
    pub empty: u64,
    pub copied: u64,
    pub unchanged: u64,
    pub unmatched: u64,
    pub skipped: u64,
    pub failed: u64,
    /// Whether the stream reached [`OrganizeEvent::Complete`].
    pub complete: bool,
}
impl Summary {
    /// Logs one item of the organize stream and counts it.
    pub fn record(&mut self, event: Result<OrganizeEvent, LibraryError>) {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                self.failed += 1;
                tracing::error!("{e:?}");
                return;
            },
        };
        match event {
            OrganizeEvent::Started => tracing::debug!("Organizing"),
            OrganizeEvent::DiscoveryComplete(subjects) => tracing::info!(subjects, "Found subject folders"),
            OrganizeEvent::SubjectResolved { label, images } => {
                self.subjects += 1;
                match label.fallback() {
                    Some(reason) => {
                        self.fallbacks += 1;
                        tracing::info!(accession = label.accession(), subject = %label, %reason, "Using accession as subject label");
                    },
                    None => tracing::info!(accession = label.accession(), subject = %label, images, "Resolved subject"),
                }
                if images == 0 {
                    self.empty += 1;
                    tracing::warn!(accession = label.accession(), "No NIfTI images found");
                }
            },
            OrganizeEvent::Organized(action) => self.action(action),
            OrganizeEvent::Complete => self.complete = true,
        }
    }

    fn action(&mut self, action: Action) {
        match action {
            Action::Copied(placement) => {
                self.copied += 1;
                tracing::info!(
                    from = %placement.source.display(),
                    to = %placement.destination.display(),
                    category = %placement.category,
                    suffix = placement.suffix,
                    sidecars = placement.sidecars.len(),
                    "Copied"
                );
            },
            Action::Unchanged(placement) => {
                self.unchanged += 1;
                tracing::info!(
                    from = %placement.source.display(),
                    to = %placement.destination.display(),
                    "Already up to date"
                );
            },
            Action::Unmatched(path) => {
                self.unmatched += 1;
                tracing::info!(path = %path.display(), "Skipped, no matching rule");
            },
            Action::Skipped { path, reason } => {
                self.skipped += 1;
                tracing::warn!(path = %path.display(), %reason, "Skipped");
            },
        }
    }
}
