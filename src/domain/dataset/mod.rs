// ============================================================
// DATASET DOMAIN LAYER
// ============================================================
// Core types for uploaded datasets
// No I/O, no external services

mod cell;
mod column_names;
mod encoding;
mod ingested;
mod listing;
mod table;

pub use cell::Cell;
pub use column_names::{
    column_renames, normalize_column_name, normalize_column_names, ColumnRename, UNNAMED_COLUMN,
};
pub use encoding::TextEncoding;
pub use ingested::{IngestedDataset, ZipIngestReport};
pub use listing::{DirectoryListing, StoredFileInfo};
pub use table::{ColumnKind, MissingCount, NormalizedTable, TableSummary};
