//! Path validation.
//!
//! Every path handed to a backend is relative to that backend's root. Paths
//! rendered from templates and subject labels end up here too, so a label
//! such as `sub-../../etc` must not be able to climb out of the output root.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Validates and normalizes a path relative to a storage root.
///
/// `.` segments, repeated separators and trailing separators are dropped, and
/// `..` is resolved lexically. The path is rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath) if it:
/// - climbs above the root at any point,
/// - contains a null byte,
/// - carries a platform prefix (`C:`), or
/// - normalizes to nothing.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use bidsify_storage::validate_path;
/// assert!(validate_path("sub-RID0042/ses-research/anat/sub-RID0042_ses-research_FLAIR.nii.gz").is_ok());
/// assert!(validate_path("sub-A/../sub-B/dwi").is_ok()); // (never leaves the root)
/// assert!(validate_path("../outside.nii.gz").is_err());
/// assert!(validate_path("sub-A/../../outside").is_err());
/// assert!(validate_path("sub-\0").is_err());
/// assert_eq!(
///     validate_path("/sub-RID0042//ses-research/./func/").unwrap(),
///     Path::new("sub-RID0042/ses-research/func")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut normalized = Vec::new();
    for component in original.components() {
        match component {
            // Null bytes pass through Path::components() on Unix but truncate
            // in the underlying syscalls.
            Component::Normal(segment) if segment.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(segment) => normalized.push(segment),
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(invalid()),
            Component::ParentDir => {
                if normalized.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
        }
    }
    if normalized.is_empty() {
        exn::bail!(invalid());
    }
    Ok(normalized.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_paths() {
        assert_eq!(validate("A123/BOLD_run1.nii.gz").unwrap(), Path::new("A123/BOLD_run1.nii.gz"));
        assert_eq!(validate("subject_table.csv").unwrap(), Path::new("subject_table.csv"));
    }

    #[test]
    fn test_normalization() {
        assert_eq!(validate("sub-A//ses-research").unwrap(), Path::new("sub-A/ses-research"));
        assert_eq!(validate("./sub-A/./dwi/").unwrap(), Path::new("sub-A/dwi"));
        assert_eq!(validate("/sub-A/anat").unwrap(), Path::new("sub-A/anat"));
        assert_eq!(validate("sub-A/anat/..").unwrap(), Path::new("sub-A"));
    }

    #[test]
    fn test_traversal_is_rejected() {
        assert!(validate("..").is_err());
        assert!(validate("../sub-A").is_err());
        assert!(validate("sub-A/../../etc/passwd").is_err());
        // Labels built from odd accessions only fail when they actually escape.
        assert!(validate("sub-../../ses-research").is_ok());
        assert!(validate("sub-/../../ses-research").is_err());
    }

    #[test]
    fn test_null_byte_is_rejected() {
        assert!(validate("sub-A\0/anat").is_err());
        assert!(validate("\0").is_err());
    }

    #[test]
    fn test_empty_is_rejected() {
        assert!(validate("").is_err());
        assert!(validate(".").is_err());
        assert!(validate("./.").is_err());
        assert!(validate("//").is_err());
        assert!(validate("sub-A/..").is_err());
    }
}
