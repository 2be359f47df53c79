//! File metadata returned by storage backends.

use std::path::{Path, PathBuf};

/// A file discovered by a storage backend listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size }
    }

    /// Final path component as UTF-8, or `""` if it isn't representable.
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|name| name.to_str()).unwrap_or_default()
    }

    /// Sibling path sharing this file's directory.
    pub fn sibling(&self, file_name: impl AsRef<Path>) -> PathBuf {
        match self.path.parent() {
            Some(parent) => parent.join(file_name),
            None => file_name.as_ref().to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let info = FileInfo::new("A123/series_3/DTI_dataset.nii.gz", 10);
        assert_eq!(info.file_name(), "DTI_dataset.nii.gz");
    }

    #[test]
    fn test_sibling() {
        let info = FileInfo::new("A123/series_3/DTI_dataset.nii.gz", 10);
        assert_eq!(info.sibling("DTI_dataset.bval"), Path::new("A123/series_3/DTI_dataset.bval"));
        let info = FileInfo::new("top.nii", 10);
        assert_eq!(info.sibling("top.json"), Path::new("top.json"));
    }
}
