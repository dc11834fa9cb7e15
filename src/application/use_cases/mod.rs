pub mod available_csvs;
pub mod dataset_ingestion;
