pub mod use_cases;

pub use use_cases::available_csvs::available_csvs_report;
pub use use_cases::dataset_ingestion::DatasetIngestionUseCase;
