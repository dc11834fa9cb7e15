//! Ingestion pipeline for uploaded CSV and zipped-CSV datasets.
//!
//! Raw upload bytes are persisted under an owned working directory, decoded
//! with an ordered list of candidate encodings, parsed into a
//! [`NormalizedTable`] whose headers are canonical and unique, and handed back
//! together with the on-disk path.

pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{available_csvs_report, DatasetIngestionUseCase};
pub use domain::dataset::{
    Cell, ColumnKind, ColumnRename, DirectoryListing, IngestedDataset, NormalizedTable,
    StoredFileInfo, TableSummary, TextEncoding, ZipIngestReport,
};
pub use domain::error::{AppError, Result};
pub use infrastructure::config::IngestConfig;
pub use infrastructure::storage::DataWorkspace;
