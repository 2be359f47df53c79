use std::fmt::{Display, Formatter, Result as FmtResult};

/// BIDS modality grouping; determines the destination subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Anatomical (structural) images.
    Anat,
    /// Functional (BOLD) images.
    Func,
    /// Diffusion weighted images and their derived maps.
    Dwi,
    /// Field maps, including reverse phase-encoded diffusion (topup) scans.
    Fmap,
}
impl Category {
    /// Returns the directory name used in a BIDS dataset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Anat => "anat",
            Category::Func => "func",
            Category::Dwi => "dwi",
            Category::Fmap => "fmap",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
