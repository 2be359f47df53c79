//! The ordered rule table and the [`classify`] entrypoint.
//!
//! Rules are evaluated top to bottom and the first one whose conditions all
//! hold wins, so the table order is a priority order. A more specific rule
//! must sit above any more general rule that would also accept the same
//! file: the topup rule (#7) is above the plain diffusion rule (#8) because
//! both look for `DTI`.
//!
//! Rule #8 only requires `ORIGINAL`, so it also shadows the derived diffusion
//! maps (#9 to #11) whenever an `ImageType` carries both `ORIGINAL` and
//! `DERIVED`. That ordering is kept as-is: reordering would change which
//! files end up where.

use crate::models::{Category, Classification, MetadataRecord};
use tracing::instrument;

/// One row of the classification table.
///
/// Every listed token is a case-sensitive substring test. A rule holds when
/// the filename contains all of `filename`, none of `filename_excludes`, and
/// the joined `ImageType` contains all of `image_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub filename: &'static [&'static str],
    pub filename_excludes: &'static [&'static str],
    pub image_type: &'static [&'static str],
    pub category: Category,
    pub suffix: &'static str,
}
impl Rule {
    pub fn matches(&self, filename: &str, image_type: &str) -> bool {
        self.filename.iter().all(|token| filename.contains(token))
            && !self.filename_excludes.iter().any(|token| filename.contains(token))
            && self.image_type.iter().all(|token| image_type.contains(token))
    }

    pub fn classification(&self) -> Classification {
        Classification::Matched {
            category: self.category,
            suffix: self.suffix,
        }
    }
}

const fn rule(
    filename: &'static [&'static str],
    filename_excludes: &'static [&'static str],
    image_type: &'static [&'static str],
    category: Category,
    suffix: &'static str,
) -> Rule {
    Rule { filename, filename_excludes, image_type, category, suffix }
}

/// Classification rules in priority order.
pub static RULES: [Rule; 11] = [
    rule(&["BOLD"], &[], &["ORIGINAL", "DIS2D"], Category::Func, "task-rest_bold"),
    rule(&["AXIAL_T2"], &["SWI"], &["ORIGINAL"], Category::Anat, "acq-axial_T2w"),
    rule(&["COR_T1_IR"], &[], &["ORIGINAL"], Category::Anat, "acq-hippocampalIR_T1w"),
    rule(&["COR_T2"], &[], &["ORIGINAL"], Category::Anat, "acq-hippcor_T2w"),
    rule(&["T2_FLAIR"], &[], &["ORIGINAL"], Category::Anat, "FLAIR"),
    rule(&["SAG_T1_MPRAGE"], &[], &["ORIGINAL"], Category::Anat, "acq-mprage_T1w"),
    rule(&["DTI", "TOPUP"], &[], &["ORIGINAL"], Category::Fmap, "acq-topup_dwi"),
    rule(&["DTI"], &[], &["ORIGINAL"], Category::Dwi, "dwi"),
    rule(&["DTI"], &[], &["DERIVED", "ADC"], Category::Dwi, "ADC"),
    rule(&["DTI"], &[], &["DERIVED", "TRACEW"], Category::Dwi, "trace"),
    rule(&["DTI"], &[], &["DERIVED", "FA"], Category::Dwi, "FA"),
];

/// Picks the BIDS category and suffix for one image.
///
/// `filename` is tested as-is (case-sensitive, no path parsing), so callers
/// should pass the final path component rather than a full path. Total and
/// side-effect free: the same inputs always produce the same result.
#[instrument(level = "debug", skip(record), ret)]
pub fn classify(record: &MetadataRecord, filename: &str) -> Classification {
    let image_type = record.image_type_joined();
    RULES
        .iter()
        .find(|rule| rule.matches(filename, &image_type))
        .map(Rule::classification)
        .unwrap_or(Classification::NoMatch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(image_type: &[&str]) -> MetadataRecord {
        MetadataRecord::new().with("ImageType", image_type.to_vec())
    }

    fn matched(category: Category, suffix: &'static str) -> Classification {
        Classification::Matched { category, suffix }
    }

    #[rstest]
    #[case("BOLD_run1.nii.gz", &["ORIGINAL", "PRIMARY", "M", "DIS2D"], matched(Category::Func, "task-rest_bold"))]
    #[case("AXIAL_T2_TSE.nii.gz", &["ORIGINAL", "PRIMARY"], matched(Category::Anat, "acq-axial_T2w"))]
    #[case("COR_T1_IR_HIPPO.nii.gz", &["ORIGINAL", "PRIMARY"], matched(Category::Anat, "acq-hippocampalIR_T1w"))]
    #[case("COR_T2_HIPPO.nii.gz", &["ORIGINAL", "PRIMARY"], matched(Category::Anat, "acq-hippcor_T2w"))]
    #[case("AX_T2_FLAIR.nii.gz", &["ORIGINAL", "PRIMARY"], matched(Category::Anat, "FLAIR"))]
    #[case("SAG_T1_MPRAGE.nii.gz", &["ORIGINAL", "PRIMARY", "M", "ND"], matched(Category::Anat, "acq-mprage_T1w"))]
    #[case("DTI_TOPUP_PA.nii.gz", &["ORIGINAL", "PRIMARY"], matched(Category::Fmap, "acq-topup_dwi"))]
    #[case("DTI_dataset.nii.gz", &["ORIGINAL"], matched(Category::Dwi, "dwi"))]
    #[case("DTI_dataset_ADC.nii.gz", &["DERIVED", "PRIMARY", "DIFFUSION", "ADC"], matched(Category::Dwi, "ADC"))]
    #[case("DTI_dataset_TRACEW.nii.gz", &["DERIVED", "PRIMARY", "DIFFUSION", "TRACEW"], matched(Category::Dwi, "trace"))]
    #[case("DTI_dataset_FA.nii.gz", &["DERIVED", "PRIMARY", "DIFFUSION", "FA"], matched(Category::Dwi, "FA"))]
    fn test_each_rule(#[case] filename: &str, #[case] image_type: &[&str], #[case] expected: Classification) {
        assert_eq!(classify(&record(image_type), filename), expected);
    }

    #[rstest]
    // Nothing in the filename that any rule looks for.
    #[case("LOCALIZER.nii.gz", &["ORIGINAL", "PRIMARY"])]
    // BOLD without the mosaic/distortion-corrected marker.
    #[case("BOLD_run1.nii.gz", &["ORIGINAL", "PRIMARY"])]
    // Anatomical rules all require ORIGINAL.
    #[case("SAG_T1_MPRAGE.nii.gz", &["DERIVED", "PRIMARY"])]
    // SWI is excluded from the axial T2 rule and no other rule applies.
    #[case("AXIAL_T2_SWI_variant.nii.gz", &["ORIGINAL"])]
    // Derived diffusion without a recognised map type.
    #[case("DTI_dataset_COLFA.nii.gz", &["DERIVED", "PRIMARY"])]
    // Tokens are case-sensitive.
    #[case("dti_dataset.nii.gz", &["ORIGINAL"])]
    #[case("DTI_dataset.nii.gz", &["original"])]
    // Missing ImageType.
    #[case("DTI_dataset.nii.gz", &[])]
    fn test_no_match(#[case] filename: &str, #[case] image_type: &[&str]) {
        assert_eq!(classify(&record(image_type), filename), Classification::NoMatch);
    }

    #[test]
    fn test_topup_takes_priority_over_plain_diffusion() {
        let record = record(&["ORIGINAL", "PRIMARY"]);
        assert!(RULES[7].matches("DTI_TOPUP.nii.gz", &record.image_type_joined()));
        assert_eq!(classify(&record, "DTI_TOPUP.nii.gz"), matched(Category::Fmap, "acq-topup_dwi"));
    }

    #[test]
    fn test_original_shadows_derived_diffusion_maps() {
        let record = record(&["ORIGINAL", "DERIVED", "ADC"]);
        assert!(RULES[8].matches("DTI_ADC.nii.gz", &record.image_type_joined()));
        assert_eq!(classify(&record, "DTI_ADC.nii.gz"), matched(Category::Dwi, "dwi"));
    }

    #[test]
    fn test_image_type_tokens_match_across_elements() {
        // Substring tests run against the joined string, so tokens can be
        // satisfied by any element (or even span the separator).
        let record = record(&["DERIVED", "FA_MAP"]);
        assert_eq!(classify(&record, "DTI.nii.gz"), matched(Category::Dwi, "FA"));
    }

    #[test]
    fn test_sidecar_without_image_type() {
        let record = MetadataRecord::new().with("SequenceName", "*tfl3d1_16ns");
        assert_eq!(classify(&record, "SAG_T1_MPRAGE.nii.gz"), Classification::NoMatch);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let record = record(&["ORIGINAL", "DIS2D"]);
        let first = classify(&record, "BOLD_run1");
        let second = classify(&record, "BOLD_run1");
        assert_eq!(first, second);
        assert_eq!(first, matched(Category::Func, "task-rest_bold"));
    }

    #[test]
    fn test_table_order_places_specific_before_general() {
        let topup = RULES.iter().position(|r| r.suffix == "acq-topup_dwi").unwrap();
        let dwi = RULES.iter().position(|r| r.suffix == "dwi").unwrap();
        assert!(topup < dwi);
        assert_eq!(RULES.len(), 11);
    }
}
