use std::fmt::{Display, Formatter, Result as FmtResult};

/// Why a [`SubjectLabel`] was built from the raw accession instead of a
/// record id. Informational only; the label is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fallback {
    /// No row in the lookup table carries this accession.
    NoMapping,
    /// The matching row's record id is absent, blank or an NA marker.
    MissingRecordId,
    /// The matching row's record id isn't a non-negative integer.
    InvalidRecordId(String),
}

impl Display for Fallback {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoMapping => write!(f, "no mapping found"),
            Self::MissingRecordId => write!(f, "record id is missing"),
            Self::InvalidRecordId(value) => write!(f, "record id '{value}' is not a usable integer"),
        }
    }
}

/// The de-identified subject label: `sub-RID0042`, or `sub-<accession>` when
/// the lookup table can't provide a record id.
///
/// Computed once per subject and used to build every destination path for
/// that subject's files.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectLabel {
    label: String,
    accession: String,
    fallback: Option<Fallback>,
}
impl SubjectLabel {
    pub fn from_record_id(accession: impl Into<String>, record_id: u64) -> Self {
        Self {
            label: format!("sub-RID{record_id:04}"),
            accession: accession.into(),
            fallback: None,
        }
    }

    pub fn from_accession(accession: impl Into<String>, reason: Fallback) -> Self {
        let accession = accession.into();
        Self {
            label: format!("sub-{accession}"),
            accession,
            fallback: Some(reason),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// The trimmed accession this label was resolved from.
    pub fn accession(&self) -> &str {
        &self.accession
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}
impl AsRef<str> for SubjectLabel {
    fn as_ref(&self) -> &str {
        &self.label
    }
}

impl Display for SubjectLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.label)
    }
}
