use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::organize::error::{ErrorKind, Result as OrganizeResult};
use crate::{Context, Destination, Image};
use bidsify_classify::{Category, Classification, MetadataRecord, classify};
use bidsify_identity::SubjectLabel;
use bidsify_storage::error::ErrorKind as StorageErrorKind;
use bidsify_storage::{StorageBackend, copy, same_content};
use derive_more::Display;
use exn::ResultExt;
use std::path::{Path, PathBuf};

/// Metadata sidecar; read for classification and copied with every image.
const METADATA_SIDECAR: &str = "json";
/// Diffusion gradient tables, copied for `dwi` images only when both exist.
const GRADIENT_SIDECARS: [&str; 2] = ["bval", "bvec"];
const DWI_SUFFIX: &str = "dwi";

/// Why an image was passed over without being classified.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    #[display("JSON sidecar not found")]
    MissingSidecar,
    #[display("JSON sidecar could not be read")]
    UnreadableSidecar,
    #[display("JSON sidecar is not a valid metadata object")]
    InvalidSidecar,
}

/// Where a matched image and its sidecars were placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: Category,
    pub suffix: &'static str,
    /// Destination paths of the sidecars placed with the image.
    pub sidecars: Vec<PathBuf>,
}

/// The outcome of (successfully) organizing a single image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The image or at least one of its sidecars was copied.
    Copied(Placement),
    /// Every destination file already held identical content; nothing written.
    Unchanged(Placement),
    /// No classification rule matched.
    Unmatched(PathBuf),
    /// The image could not be classified.
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Classifies a single image and copies it, with its sidecars, to its
/// template-derived location on the `destination` backend.
///
/// The JSON sidecar is always placed next to the image. For images
/// classified with the `dwi` suffix the `.bval` and `.bvec` gradient tables
/// are placed too, but only when both exist; a lone table is left behind
/// with a warning.
///
/// # Errors
/// Returns [`Exn<LibraryErrorKind::Organize>`](LibraryErrorKind::Organize)
/// raised from an inner [`Exn<ErrorKind>`](ErrorKind) when the destination
/// path can't be rendered or a copy fails.
pub async fn organize_image(
    source: &dyn StorageBackend,
    destination: &dyn StorageBackend,
    ctx: &Context,
    subject: &SubjectLabel,
    image: &Image,
) -> LibraryResult<Action> {
    organize_image_inner(source, destination, ctx, subject, image).await.or_raise(|| LibraryErrorKind::Organize)
}

pub(crate) async fn organize_image_inner(
    source: &dyn StorageBackend,
    destination: &dyn StorageBackend,
    ctx: &Context,
    subject: &SubjectLabel,
    image: &Image,
) -> OrganizeResult<Action> {
    let record = match read_sidecar(source, image).await {
        Ok(record) => record,
        Err(reason) => {
            let path = image.path().to_path_buf();
            return Ok(Action::Skipped { path, reason });
        },
    };
    let (category, suffix) = match classify(&record, image.file_name()) {
        Classification::Matched { category, suffix } => (category, suffix),
        Classification::NoMatch => return Ok(Action::Unmatched(image.path().to_path_buf())),
    };
    let target = Destination {
        subject: subject.as_str(),
        session: &ctx.session,
        category,
        suffix,
    };

    let image_destination = render(ctx, &target, image.extension())?;
    let mut changed = transfer(source, image.path(), destination, &image_destination).await?;
    let mut sidecars = Vec::new();
    for extension in companions(source, image, suffix).await? {
        let sidecar_destination = render(ctx, &target, extension)?;
        changed |= transfer(source, &image.sidecar(extension), destination, &sidecar_destination).await?;
        sidecars.push(sidecar_destination);
    }

    let placement = Placement {
        source: image.path().to_path_buf(),
        destination: image_destination,
        category,
        suffix,
        sidecars,
    };
    Ok(match changed {
        true => Action::Copied(placement),
        false => Action::Unchanged(placement),
    })
}

async fn read_sidecar(source: &dyn StorageBackend, image: &Image) -> Result<MetadataRecord, SkipReason> {
    let path = image.sidecar(METADATA_SIDECAR);
    let bytes = match source.read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if matches!(&*e, StorageErrorKind::NotFound(_)) => return Err(SkipReason::MissingSidecar),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = ?e, "Could not read sidecar");
            return Err(SkipReason::UnreadableSidecar);
        },
    };
    MetadataRecord::from_json(&bytes).map_err(|e| {
        tracing::debug!(path = %path.display(), error = ?e, "Could not parse sidecar");
        SkipReason::InvalidSidecar
    })
}

/// Sidecar extensions to place alongside an image with the given suffix.
async fn companions(source: &dyn StorageBackend, image: &Image, suffix: &str) -> OrganizeResult<Vec<&'static str>> {
    let mut companions = vec![METADATA_SIDECAR];
    if suffix != DWI_SUFFIX {
        return Ok(companions);
    }
    let mut present = Vec::new();
    for extension in GRADIENT_SIDECARS {
        if source.exists(&image.sidecar(extension)).await.or_raise(|| ErrorKind::Storage)? {
            present.push(extension);
        }
    }
    match present.len() {
        0 => tracing::debug!(path = %image.path().display(), "No diffusion gradient tables"),
        n if n == GRADIENT_SIDECARS.len() => companions.extend(present),
        _ => tracing::warn!(
            path = %image.path().display(),
            found = ?present,
            "Incomplete diffusion gradient tables; placing neither"
        ),
    }
    Ok(companions)
}

fn render(ctx: &Context, target: &Destination<'_>, extension: &str) -> OrganizeResult<PathBuf> {
    ctx.template.generate_with_ext(target, extension).map(PathBuf::from).or_raise(|| ErrorKind::Template)
}

/// Copies `from` to `to` unless `to` already holds the same content. Returns
/// whether anything was written.
async fn transfer(
    source: &dyn StorageBackend,
    from: &Path,
    destination: &dyn StorageBackend,
    to: &Path,
) -> OrganizeResult<bool> {
    if same_content(source, from, destination, to).await.or_raise(|| ErrorKind::Storage)? {
        tracing::debug!(from = %from.display(), to = %to.display(), "Destination already up to date");
        return Ok(false);
    }
    let bytes = copy(source, from, destination, to).await.or_raise(|| ErrorKind::Storage)?;
    tracing::debug!(from = %from.display(), to = %to.display(), bytes, "Copied");
    Ok(true)
}
