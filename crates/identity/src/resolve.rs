use crate::label::{Fallback, SubjectLabel};
use crate::table::SubjectMappingTable;
use tracing::instrument;

/// Cell values treated as "no record id", in addition to blank cells. This is
/// the set spreadsheet and dataframe exports commonly write for gaps.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, PartialEq, Eq)]
enum RecordId {
    Missing,
    Invalid(String),
    Valid(u64),
}

/// Derives the de-identified label for a subject folder.
///
/// Precedence, after trimming `raw_id`:
/// 1. No row carries the accession: `sub-<raw_id>` ([`Fallback::NoMapping`]).
/// 2. The first matching row has no usable record id (absent, blank, or an
///    NA marker): `sub-<raw_id>` ([`Fallback::MissingRecordId`]).
/// 3. The record id isn't a non-negative integer: `sub-<raw_id>`
///    ([`Fallback::InvalidRecordId`]).
/// 4. Otherwise `sub-RID<record id, zero-padded to 4 digits>`.
///
/// Decimal record ids (`42.0`, as written by exports of numeric columns with
/// gaps) are truncated toward zero.
#[instrument(level = "debug", skip(table), fields(label))]
pub fn resolve(raw_id: &str, table: &SubjectMappingTable) -> SubjectLabel {
    let accession = raw_id.trim();
    let label = match table.lookup(accession) {
        None => SubjectLabel::from_accession(accession, Fallback::NoMapping),
        Some(row) => match parse_record_id(row.record_id.as_deref()) {
            RecordId::Valid(id) => SubjectLabel::from_record_id(accession, id),
            RecordId::Missing => SubjectLabel::from_accession(accession, Fallback::MissingRecordId),
            RecordId::Invalid(value) => SubjectLabel::from_accession(accession, Fallback::InvalidRecordId(value)),
        },
    };
    tracing::Span::current().record("label", label.as_str());
    label
}

fn parse_record_id(cell: Option<&str>) -> RecordId {
    let Some(value) = cell.map(str::trim).filter(|v| !v.is_empty() && !MISSING_MARKERS.contains(v)) else {
        return RecordId::Missing;
    };
    if let Ok(id) = value.parse::<u64>() {
        return RecordId::Valid(id);
    }
    match value.parse::<f64>() {
        // `u64::MAX as f64` rounds up to 2^64, so the comparison must be strict.
        Ok(float) if float.is_finite() && float >= 0.0 && float < u64::MAX as f64 => {
            RecordId::Valid(float.trunc() as u64)
        },
        _ => RecordId::Invalid(value.to_string()),
    }
}
