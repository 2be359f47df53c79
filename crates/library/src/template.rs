//! Destination path templating.
//!
//! Converts a resolved subject, the session label and a classification into
//! a deterministic path below the output root using an [upon] template. The
//! syntax follows upon's Mustache-like conventions (`{{ variable }}`).
//!
//! # Template Variables
//!
//! | Variable   | Description                                   |
//! |------------|-----------------------------------------------|
//! | `subject`  | Subject label, e.g. `sub-RID0042`             |
//! | `session`  | Session label without the `ses-` prefix       |
//! | `category` | BIDS category folder: `anat`, `func`, `dwi`, `fmap` |
//! | `suffix`   | BIDS filename suffix, e.g. `task-rest_bold`   |
//!
//! # Example
//!
//! ```
//! use bidsify_classify::Category;
//! use bidsify_library::{DEFAULT_TEMPLATE, Destination, PathGenerator};
//!
//! let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
//! let destination = Destination {
//!     subject: "sub-RID0042",
//!     session: "research",
//!     category: Category::Func,
//!     suffix: "task-rest_bold",
//! };
//! let path = generator.generate_with_ext(&destination, "nii.gz").unwrap();
//! assert_eq!(path, "sub-RID0042/ses-research/func/sub-RID0042_ses-research_task-rest_bold.nii.gz");
//! ```

use crate::error::{Error, ErrorKind, Result};
use bidsify_classify::Category;
use bidsify_storage::validate_path;
use exn::{OptionExt, ResultExt};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;
use tracing::instrument;
use upon::{Engine, Template};

/// BIDS layout: `<subject>/ses-<session>/<category>/<subject>_ses-<session>_<suffix>`.
pub const DEFAULT_TEMPLATE: &str =
    "{{ subject }}/ses-{{ session }}/{{ category }}/{{ subject }}_ses-{{ session }}_{{ suffix }}";

/// The values a template is rendered against for one image.
#[derive(Debug, Clone, Copy)]
pub struct Destination<'a> {
    pub subject: &'a str,
    pub session: &'a str,
    pub category: Category,
    pub suffix: &'a str,
}

/// Generates destination paths from a user-defined template string.
///
/// Constructed via [`FromStr`], which compiles the template eagerly and
/// renders it once against sample values, so syntax errors and unknown
/// variables surface before any file is touched.
///
/// Generated paths are normalized (trimmed, deduplicated separators) and
/// validated by [`bidsify_storage::validate_path`] so they can't escape the
/// output root.
pub struct PathGenerator {
    engine: Engine<'static>,
    template: Template<'static>,
}
impl Debug for PathGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PathGenerator").finish_non_exhaustive()
    }
}
impl FromStr for PathGenerator {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let engine = Engine::new();
        let template = engine.compile(s.to_string()).or_raise(|| ErrorKind::Template)?;
        let generator = Self { engine, template };
        generator.generate(&Destination {
            subject: "sub-RID0001",
            session: "session",
            category: Category::Anat,
            suffix: "T1w",
        })?;
        Ok(generator)
    }
}
impl PathGenerator {
    /// Renders the template for `destination`, returning the normalized path
    /// without any file extension.
    #[instrument(level = "debug", skip_all, fields(subject = destination.subject, category = %destination.category, suffix = destination.suffix))]
    pub fn generate(&self, destination: &Destination<'_>) -> Result<String> {
        let path = self
            .template
            .render(&self.engine, Self::parameters(destination))
            .to_string()
            .or_raise(|| ErrorKind::Template)?;
        Self::normalize(path)
    }

    /// Renders the template and appends a file extension.
    ///
    /// The extension is trimmed of leading/trailing dots, so both `"nii.gz"`
    /// and `".nii.gz"` produce the same result.
    pub fn generate_with_ext(&self, destination: &Destination<'_>, ext: impl AsRef<str>) -> Result<String> {
        let path = self.generate(destination)?;
        Ok(format!("{path}.{}", ext.as_ref().trim().trim_matches('.')))
    }

    /// Trims each path segment, joins them with `/`, then validates via
    /// [`bidsify_storage::validate_path`].
    fn normalize(s: impl Into<String>) -> Result<String> {
        let path = s.into().trim().split('/').map(str::trim).filter(|s| !s.is_empty()).collect::<Vec<_>>().join("/");
        validate_path(&path).or_raise(|| ErrorKind::Template).and_then(|p| {
            p.to_str().map(|p| p.to_string())
            // Infallible: input was String, so won't fail. Here for completeness.
            .ok_or_raise(|| ErrorKind::Template)
        })
    }

    fn parameters(destination: &Destination<'_>) -> upon::Value {
        upon::value! {
            subject: destination.subject,
            session: destination.session,
            category: destination.category.as_str(),
            suffix: destination.suffix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn destination(category: Category, suffix: &'static str) -> Destination<'static> {
        Destination {
            subject: "sub-RID0042",
            session: "research",
            category,
            suffix,
        }
    }

    #[rstest]
    #[case(Category::Func, "task-rest_bold", "sub-RID0042/ses-research/func/sub-RID0042_ses-research_task-rest_bold")]
    #[case(Category::Anat, "T1w", "sub-RID0042/ses-research/anat/sub-RID0042_ses-research_T1w")]
    #[case(Category::Fmap, "epi", "sub-RID0042/ses-research/fmap/sub-RID0042_ses-research_epi")]
    fn test_default_template(#[case] category: Category, #[case] suffix: &'static str, #[case] expected: &str) {
        let generator: PathGenerator = DEFAULT_TEMPLATE.parse().unwrap();
        assert_eq!(generator.generate(&destination(category, suffix)).unwrap(), expected);
    }

    #[test]
    fn test_appends_extension() {
        let generator: PathGenerator = "{{ subject }}/{{ suffix }}".parse().unwrap();
        let dwi = destination(Category::Dwi, "dwi");
        assert_eq!(generator.generate_with_ext(&dwi, "nii.gz").unwrap(), "sub-RID0042/dwi.nii.gz");
        assert_eq!(generator.generate_with_ext(&dwi, ".bval").unwrap(), "sub-RID0042/dwi.bval");
    }

    #[test]
    fn test_normalizes_segments() {
        let generator: PathGenerator = " {{ subject }} // {{ category }}/ {{ suffix }} ".parse().unwrap();
        let path = generator.generate(&destination(Category::Anat, "T2w")).unwrap();
        assert_eq!(path, "sub-RID0042/anat/T2w");
    }

    #[test]
    fn test_rejects_traversal() {
        let generator: PathGenerator = "{{ subject }}/{{ suffix }}".parse().unwrap();
        let result = generator.generate(&Destination {
            subject: "..",
            ..destination(Category::Anat, "T1w")
        });
        assert!(result.is_err());
        assert!("../{{ subject }}".parse::<PathGenerator>().is_err());
    }

    #[rstest]
    #[case("{{ subject }")]
    #[case("{{ subject }}/{{ visit }}")]
    #[case("{{ subject | unknown }}")]
    fn test_invalid_templates_fail_on_parse(#[case] template: &str) {
        let err = template.parse::<PathGenerator>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Template));
    }
}
