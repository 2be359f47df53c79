use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::error::{ErrorKind, Result as OrganizeResult};
use crate::organize::file::{Action, organize_image_inner};
use crate::{Context, images, subjects};
use async_stream::stream;
use bidsify_identity::{SubjectLabel, resolve};
use bidsify_storage::BackendHandle;
use exn::ResultExt;
use futures::Stream;
use std::collections::HashSet;
use std::iter;

/// Progress events emitted by [`organize`] as it works through the source
/// tree.
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete): exactly once, with the
///    number of subject folders found.
/// 3. Per subject folder, in sorted order: one
///    [`SubjectResolved`](Self::SubjectResolved) followed by one
///    [`Organized`](Self::Organized) per image.
/// 4. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
///
/// An error may terminate the stream early, in which case [`Complete`](Self::Complete)
/// is never emitted.
#[derive(Debug)]
pub enum OrganizeEvent {
    /// Organizing has begun; emitted exactly once before any other event.
    Started,
    /// All subject folders have been discovered; the total count is now known.
    DiscoveryComplete(u64),
    /// A subject folder has been resolved to its label and its images listed.
    SubjectResolved { label: SubjectLabel, images: u64 },
    /// An image has been organized.
    Organized(Action),
    /// Every subject folder has been processed; the stream is finished.
    Complete,
}

/// Streams [`OrganizeEvent`]s for every image below the subject folders of
/// `source`, placing matched images on `destination` according to `ctx`.
///
/// Subjects and images are processed strictly one at a time, in sorted
/// order, so later images overwrite earlier ones that render to the same
/// destination (a warning is logged when that happens).
///
/// Individual subject and image failures are surfaced as `Err` items without
/// terminating the stream; only failing to list the source root is fatal.
pub fn organize<'a>(
    source: &'a BackendHandle,
    destination: &'a BackendHandle,
    ctx: &'a Context,
) -> impl Stream<Item = LibraryResult<OrganizeEvent>> + 'a {
    // `rustfmt` does not format macro-specific syntax such as
    // `for await` even using the parentheses trick.
    stream! {
        for await event in organize_inner(source, destination, ctx) {
            yield event.or_raise(|| LibraryErrorKind::Organize);
        }
    }
}

fn organize_inner<'a>(
    source: &'a BackendHandle,
    destination: &'a BackendHandle,
    ctx: &'a Context,
) -> impl Stream<Item = OrganizeResult<OrganizeEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(OrganizeEvent::Started);

        let folders = match subjects(source.as_ref()).await.or_raise(|| ErrorKind::Discovery) {
            Ok(f) => f,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(OrganizeEvent::DiscoveryComplete(u64::try_from(folders.len()).unwrap_or(0)));

        let mut placed = HashSet::new();
        for folder in folders {
            let accession = folder.to_string_lossy();
            let label = resolve(&accession, &ctx.mapping);
            let images = match images(source.as_ref(), &folder)
                .await
                .or_raise(|| ErrorKind::Listing(accession.to_string()))
            {
                Ok(images) => images,
                Err(e) => {
                    yield Err(e);
                    continue;
                },
            };
            yield Ok(OrganizeEvent::SubjectResolved {
                label: label.clone(),
                images: u64::try_from(images.len()).unwrap_or(0),
            });

            for image in images {
                let result = organize_image_inner(source.as_ref(), destination.as_ref(), ctx, &label, &image).await;
                if let Ok(Action::Copied(placement) | Action::Unchanged(placement)) = &result {
                    for path in iter::once(&placement.destination).chain(&placement.sidecars) {
                        if !placed.insert(path.clone()) {
                            tracing::warn!(
                                subject = %label,
                                source = %placement.source.display(),
                                path = %path.display(),
                                "Overwrote a destination placed earlier in this run"
                            );
                        }
                    }
                }
                yield result.map(OrganizeEvent::Organized);
            }
        }

        yield Ok(OrganizeEvent::Complete);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organize::SkipReason;
    use crate::{DEFAULT_TEMPLATE, PathGenerator};
    use bidsify_identity::{MappingRow, SubjectMappingTable};
    use bidsify_storage::backend::{LocalBackend, MockBackend, ReadOnlyBackend, StorageBackend};
    use futures::StreamExt;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    const BOLD_SIDECAR: &[u8] = br#"{"ImageType": ["ORIGINAL", "PRIMARY", "M", "DIS2D"]}"#;
    const ORIGINAL_SIDECAR: &[u8] = br#"{"ImageType": ["ORIGINAL", "PRIMARY"]}"#;

    fn context() -> Context {
        let mapping = SubjectMappingTable::new([MappingRow::new("A123", "42"), MappingRow::new("B456", "NA")]);
        Context::new(mapping, "research", DEFAULT_TEMPLATE.parse::<PathGenerator>().unwrap())
    }

    fn source_tree() -> BackendHandle {
        Arc::new(MockBackend::with_files([
            ("A123/series_1/BOLD_run1.nii.gz", b"bold".as_slice()),
            ("A123/series_1/BOLD_run1.json", BOLD_SIDECAR),
            ("A123/series_2/Localizer.nii.gz", b"loc".as_slice()),
            ("A123/series_2/Localizer.json", ORIGINAL_SIDECAR),
            ("B456/SAG_T1_MPRAGE.nii.gz", b"t1".as_slice()),
            ("B456/SAG_T1_MPRAGE.json", ORIGINAL_SIDECAR),
            ("B456/AXIAL_T2.nii.gz", b"t2".as_slice()),
            ("C789/notes/readme.txt", b"no images here".as_slice()),
        ]))
    }

    async fn run(source: &BackendHandle, destination: &BackendHandle, ctx: &Context) -> Vec<OrganizeEvent> {
        organize(source, destination, ctx).map(|event| event.unwrap()).collect().await
    }

    #[tokio::test]
    async fn test_event_order() {
        let source = source_tree();
        let destination: BackendHandle = Arc::new(MockBackend::default());
        let ctx = context();
        let events = run(&source, &destination, &ctx).await;

        assert!(matches!(events.first(), Some(OrganizeEvent::Started)));
        assert!(matches!(events.get(1), Some(OrganizeEvent::DiscoveryComplete(3))));
        assert!(matches!(events.last(), Some(OrganizeEvent::Complete)));

        let subjects: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                OrganizeEvent::SubjectResolved { label, images } => Some((label.as_str(), *images)),
                _ => None,
            })
            .collect();
        assert_eq!(subjects, vec![("sub-RID0042", 2), ("sub-B456", 2), ("sub-C789", 0)]);

        let actions: Vec<_> = events
            .into_iter()
            .filter_map(|event| match event {
                OrganizeEvent::Organized(action) => Some(action),
                _ => None,
            })
            .collect();
        assert_eq!(actions.len(), 4);
        assert!(matches!(&actions[0], Action::Copied(p) if p.suffix == "task-rest_bold"));
        assert_eq!(actions[1], Action::Unmatched(PathBuf::from("A123/series_2/Localizer.nii.gz")));
        assert_eq!(
            actions[2],
            Action::Skipped {
                path: PathBuf::from("B456/AXIAL_T2.nii.gz"),
                reason: SkipReason::MissingSidecar,
            }
        );
        assert!(matches!(&actions[3], Action::Copied(p) if p.destination == Path::new("sub-B456/ses-research/anat/sub-B456_ses-research_acq-mprage_T1w.nii.gz")));
    }

    #[tokio::test]
    async fn test_writes_bids_tree() {
        let source = source_tree();
        let output = Arc::new(MockBackend::default());
        let destination: BackendHandle = output.clone();
        let ctx = context();
        run(&source, &destination, &ctx).await;

        assert_eq!(
            output.paths(),
            vec![
                PathBuf::from("sub-B456/ses-research/anat/sub-B456_ses-research_acq-mprage_T1w.json"),
                PathBuf::from("sub-B456/ses-research/anat/sub-B456_ses-research_acq-mprage_T1w.nii.gz"),
                PathBuf::from("sub-RID0042/ses-research/func/sub-RID0042_ses-research_task-rest_bold.json"),
                PathBuf::from("sub-RID0042/ses-research/func/sub-RID0042_ses-research_task-rest_bold.nii.gz"),
            ]
        );
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let source = source_tree();
        let output = Arc::new(MockBackend::default());
        let destination: BackendHandle = Arc::new(ReadOnlyBackend::new(output.clone()));
        let ctx = context();
        let events = run(&source, &destination, &ctx).await;

        let copied = events.iter().filter(|event| matches!(event, OrganizeEvent::Organized(Action::Copied(_)))).count();
        assert_eq!(copied, 2);
        assert!(output.paths().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_reports_unchanged() {
        let source = source_tree();
        let destination: BackendHandle = Arc::new(MockBackend::default());
        let ctx = context();
        run(&source, &destination, &ctx).await;
        let events = run(&source, &destination, &ctx).await;

        let (copied, unchanged) = events.iter().fold((0, 0), |(copied, unchanged), event| match event {
            OrganizeEvent::Organized(Action::Copied(_)) => (copied + 1, unchanged),
            OrganizeEvent::Organized(Action::Unchanged(_)) => (copied, unchanged + 1),
            _ => (copied, unchanged),
        });
        assert_eq!((copied, unchanged), (0, 2));
    }

    #[tokio::test]
    async fn test_later_image_overwrites_earlier() {
        let source: BackendHandle = Arc::new(MockBackend::with_files([
            ("A123/BOLD_run1.nii.gz", b"first".as_slice()),
            ("A123/BOLD_run1.json", BOLD_SIDECAR),
            ("A123/BOLD_run2.nii.gz", b"second".as_slice()),
            ("A123/BOLD_run2.json", BOLD_SIDECAR),
        ]));
        let output = Arc::new(MockBackend::default());
        let destination: BackendHandle = output.clone();
        let ctx = context();
        run(&source, &destination, &ctx).await;

        let path = Path::new("sub-RID0042/ses-research/func/sub-RID0042_ses-research_task-rest_bold.nii.gz");
        assert_eq!(output.read(path).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_missing_source_root_aborts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nifti");
        let source: BackendHandle = Arc::new(LocalBackend::new("source", &root).unwrap());
        std::fs::remove_dir(&root).unwrap();
        let destination: BackendHandle = Arc::new(MockBackend::default());
        let ctx = context();

        let events: Vec<_> = organize(&source, &destination, &ctx).collect().await;
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Ok(OrganizeEvent::Started)));
        let Err(err) = &events[1] else {
            panic!("expected discovery to fail");
        };
        assert!(matches!(&**err, LibraryErrorKind::Organize));
    }
}
