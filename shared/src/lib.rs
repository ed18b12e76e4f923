use serde::{Deserialize, Serialize};
use std::fmt;

/// How an import treats the collection that is already stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImportMode {
    /// Discard the existing collection and start the id counter at 1
    Replace,
    /// Overlay imported rows onto the existing collection
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImportMode::Replace => write!(f, "replace"),
            ImportMode::Merge => write!(f, "merge"),
        }
    }
}

/// Outcome of a CSV import, shown to the user after the file was processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Source file path
    pub file_path: String,
    pub mode: ImportMode,
    /// Number of data rows that passed validation and were committed
    pub accepted_count: usize,
    /// Total size of the collection after the commit
    pub collection_size: usize,
    /// One line per rejected row (or a single header diagnostic)
    pub errors: Vec<String>,
    /// False when the import was aborted before any row was processed
    pub committed: bool,
}

impl ImportReport {
    /// True when every data row was accepted
    pub fn is_clean(&self) -> bool {
        self.committed && self.errors.is_empty()
    }
}

/// Outcome of a CSV export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReport {
    /// Where the file was written
    pub file_path: String,
    /// Number of data rows written (header excluded)
    pub record_count: usize,
}
