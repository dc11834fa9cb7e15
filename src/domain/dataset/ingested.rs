// ============================================================
// INGESTION RESULTS
// ============================================================
// What the pipeline hands back to the session layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::{ColumnRename, NormalizedTable, TextEncoding};

/// A parsed upload and the file backing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestedDataset {
    /// Logical dataset name: the upload filename or the ZIP entry path
    pub name: String,
    /// Where the raw bytes were persisted
    pub path: PathBuf,
    pub table: NormalizedTable,
    pub encoding: TextEncoding,
    /// Headers changed by normalization
    pub renamed_columns: Vec<ColumnRename>,
}

impl IngestedDataset {
    /// True when invalid UTF-8 bytes were dropped while decoding.
    pub fn lossy(&self) -> bool {
        self.encoding.is_lossy()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }
}

/// Outcome of expanding a ZIP upload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZipIngestReport {
    /// Keyed by entry name inside the archive
    pub datasets: BTreeMap<String, IngestedDataset>,
    /// One message per skipped entry
    pub warnings: Vec<String>,
    /// Set when the archive itself could not be read
    pub error: Option<String>,
}

impl ZipIngestReport {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.datasets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    pub fn get(&self, entry_name: &str) -> Option<&IngestedDataset> {
        self.datasets.get(entry_name)
    }
}
