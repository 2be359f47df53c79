//! The accession to record-id lookup table.

use crate::error::{ErrorKind, Result};
use csv::{ReaderBuilder, StringRecord};
use exn::{OptionExt, ResultExt};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::instrument;

/// Accession column name used when none is configured.
pub const DEFAULT_ACCESSION_COLUMN: &str = "accession";
/// Name of the column holding de-identified record ids.
pub const RECORD_ID_COLUMN: &str = "record_id";

/// One row of the lookup table; cells are kept verbatim.
///
/// A cell is `None` when the row is shorter than the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingRow {
    pub accession: Option<String>,
    pub record_id: Option<String>,
}
impl MappingRow {
    pub fn new(accession: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            accession: Some(accession.into()),
            record_id: Some(record_id.into()),
        }
    }
}

/// Rows of the lookup table in file order.
///
/// Loaded once before any subject is processed and read-only afterwards.
/// Header names are matched after trimming and lowercasing, so `Accession`,
/// ` ACCESSION ` and `accession` all name the same column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectMappingTable {
    rows: Vec<MappingRow>,
}
impl SubjectMappingTable {
    pub fn new(rows: impl IntoIterator<Item = MappingRow>) -> Self {
        Self { rows: rows.into_iter().collect() }
    }

    /// Loads a CSV lookup table from disk.
    ///
    /// # Errors
    /// - [`ErrorKind::Unreadable`] if the file can't be opened.
    /// - [`ErrorKind::Malformed`] if the CSV can't be parsed.
    /// - [`ErrorKind::MissingColumn`] if either the accession column or
    ///   [`RECORD_ID_COLUMN`] is absent.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>, accession_column: &str) -> Result<Self> {
        let file = File::open(path.as_ref()).or_raise(|| ErrorKind::Unreadable)?;
        Self::from_reader(file, accession_column)
    }

    /// Loads a CSV lookup table from any reader. See [`from_path`](Self::from_path).
    pub fn from_reader(reader: impl Read, accession_column: &str) -> Result<Self> {
        let mut csv = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = csv.headers().or_raise(|| ErrorKind::Malformed)?.clone();
        let accession = column_index(&headers, accession_column)?;
        let record_id = column_index(&headers, RECORD_ID_COLUMN)?;

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record.or_raise(|| ErrorKind::Malformed)?;
            rows.push(MappingRow {
                accession: record.get(accession).map(str::to_string),
                record_id: record.get(record_id).map(str::to_string),
            });
        }
        let table = Self { rows };
        let duplicates = table.duplicate_accessions();
        if duplicates > 0 {
            tracing::warn!(duplicates, "Lookup table repeats some accessions; the first matching row wins");
        }
        tracing::info!(rows = table.len(), "Loaded subject mapping table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    /// Finds the first row whose trimmed accession equals the trimmed input.
    ///
    /// Duplicate accessions are not deduplicated: table order decides.
    pub fn lookup(&self, accession: &str) -> Option<&MappingRow> {
        let accession = accession.trim();
        self.rows.iter().find(|row| row.accession.as_deref().map(str::trim) == Some(accession))
    }

    /// Number of rows shadowed by an earlier row with the same accession.
    fn duplicate_accessions(&self) -> usize {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .filter_map(|row| row.accession.as_deref().map(str::trim))
            .filter(|accession| !seen.insert(*accession))
            .count()
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

fn column_index(headers: &StringRecord, column: &str) -> Result<usize> {
    let wanted = normalize_header(column);
    headers
        .iter()
        .position(|header| normalize_header(header) == wanted)
        .ok_or_raise(|| ErrorKind::MissingColumn(wanted.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn load(csv: &str) -> Result<SubjectMappingTable> {
        SubjectMappingTable::from_reader(csv.as_bytes(), DEFAULT_ACCESSION_COLUMN)
    }

    #[test]
    fn test_loads_rows_in_order() {
        let table = load("accession,record_id\nA123,42\nB200,\nC300,7\n").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[0], MappingRow::new("A123", "42"));
        assert_eq!(table.rows()[1], MappingRow::new("B200", ""));
        assert_eq!(table.rows()[2], MappingRow::new("C300", "7"));
    }

    #[rstest]
    #[case("Accession,Record_ID\nA123,42\n")]
    #[case(" ACCESSION , RECORD_ID \nA123,42\n")]
    #[case("site,record_id,notes,accession\nX,42,,A123\n")]
    fn test_header_normalization(#[case] csv: &str) {
        let table = load(csv).unwrap();
        assert_eq!(table.lookup("A123").and_then(|r| r.record_id.as_deref()), Some("42"));
    }

    #[rstest]
    #[case("record_id\n42\n", "accession")]
    #[case("accession\nA123\n", "record_id")]
    #[case("", "accession")]
    fn test_missing_column(#[case] csv: &str, #[case] column: &str) {
        let err = load(csv).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingColumn(column.to_string()));
    }

    #[test]
    fn test_custom_accession_column() {
        let csv = "NewAccession,Record_ID\nA123,42\n";
        let table = SubjectMappingTable::from_reader(csv.as_bytes(), "NewAccession").unwrap();
        assert!(table.lookup("A123").is_some());
        let err = SubjectMappingTable::from_reader(csv.as_bytes(), DEFAULT_ACCESSION_COLUMN).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingColumn("accession".to_string()));
    }

    #[test]
    fn test_short_rows_have_missing_cells() {
        let table = load("accession,notes,record_id\nA123\n").unwrap();
        assert_eq!(table.rows()[0].accession.as_deref(), Some("A123"));
        assert_eq!(table.rows()[0].record_id, None);
    }

    #[test]
    fn test_lookup_trims_both_sides() {
        let table = load("accession,record_id\n  A123  ,42\n").unwrap();
        assert!(table.lookup("A123").is_some());
        assert!(table.lookup(" A123\t").is_some());
        assert!(table.lookup("A12").is_none());
    }

    #[test]
    fn test_lookup_first_row_wins() {
        let table = load("accession,record_id\nA123,42\nA123,43\n").unwrap();
        assert_eq!(table.duplicate_accessions(), 1);
        assert_eq!(table.lookup("A123").and_then(|r| r.record_id.as_deref()), Some("42"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Accession,Record_ID").unwrap();
        writeln!(file, "A123,42").unwrap();
        let table = SubjectMappingTable::from_path(file.path(), DEFAULT_ACCESSION_COLUMN).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SubjectMappingTable::from_path(dir.path().join("nope.csv"), DEFAULT_ACCESSION_COLUMN).unwrap_err();
        assert_eq!(*err, ErrorKind::Unreadable);
    }
}
