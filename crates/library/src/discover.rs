//! Discovery of subject folders and the images below them.

use bidsify_storage::error::Result as StorageResult;
use bidsify_storage::{FileInfo, StorageBackend};
use std::path::{Path, PathBuf};

/// Recognized image extensions, longest first so `.nii.gz` wins over `.nii`.
pub const IMAGE_EXTENSIONS: [&str; 2] = ["nii.gz", "nii"];

/// A NIfTI image found in the source tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub file: FileInfo,
    stem: String,
    extension: &'static str,
}
impl Image {
    /// Recognizes `file` as an image by its extension, or returns `None`.
    pub fn from_file(file: FileInfo) -> Option<Self> {
        let (stem, extension) = IMAGE_EXTENSIONS.iter().find_map(|ext| {
            let stem = file.file_name().strip_suffix(ext)?.strip_suffix('.')?;
            (!stem.is_empty()).then(|| (stem.to_string(), *ext))
        })?;
        Some(Self { file, stem, extension })
    }

    pub fn path(&self) -> &Path {
        &self.file.path
    }

    pub fn file_name(&self) -> &str {
        self.file.file_name()
    }

    /// File name without the image extension.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Image extension without the leading dot, `nii.gz` or `nii`.
    pub fn extension(&self) -> &'static str {
        self.extension
    }

    /// Path of the sidecar sharing this image's base name, e.g. `json` or
    /// `bval`.
    pub fn sidecar(&self, extension: &str) -> PathBuf {
        self.file.sibling(format!("{}.{extension}", self.stem))
    }
}

/// Subject folders: the immediate subdirectories of the source root, sorted.
pub async fn subjects(backend: &dyn StorageBackend) -> StorageResult<Vec<PathBuf>> {
    backend.directories(None).await
}

/// Every image anywhere below `subject`, in sorted path order.
pub async fn images(backend: &dyn StorageBackend, subject: &Path) -> StorageResult<Vec<Image>> {
    let mut images: Vec<_> = backend.list(Some(subject)).await?.into_iter().filter_map(Image::from_file).collect();
    images.sort_by(|a, b| a.file.path.cmp(&b.file.path));
    Ok(images)
}
