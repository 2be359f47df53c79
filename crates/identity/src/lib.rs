//! Subject identity resolution.
//!
//! Subject folders in the source tree are named after a raw accession. The
//! [`SubjectMappingTable`] maps accessions to de-identified record ids, and
//! [`resolve`] turns an accession into the [`SubjectLabel`] used throughout
//! the destination tree, falling back to the accession itself when the table
//! can't provide a usable record id.

pub mod error;
mod label;
mod resolve;
mod table;

pub use crate::label::{Fallback, SubjectLabel};
pub use crate::resolve::resolve;
pub use crate::table::{DEFAULT_ACCESSION_COLUMN, MappingRow, RECORD_ID_COLUMN, SubjectMappingTable};
