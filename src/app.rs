use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::application::{available_csvs_report, DatasetIngestionUseCase};
use crate::domain::dataset::{DirectoryListing, TableSummary};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::IngestConfig;
use crate::infrastructure::storage::DataWorkspace;

#[derive(Debug, Serialize)]
struct LoadedDataset {
    name: String,
    path: PathBuf,
    encoding: String,
    summary: TableSummary,
}

#[derive(Debug, Serialize)]
struct RunReport {
    datasets: Vec<LoadedDataset>,
    warnings: Vec<String>,
    directory: DirectoryListing,
    available_csvs: String,
}

impl RunReport {
    fn new(directory: DirectoryListing) -> Self {
        Self {
            datasets: Vec::new(),
            warnings: Vec::new(),
            directory,
            available_csvs: String::new(),
        }
    }
}

/// Ingest every `.csv` / `.zip` path given on the command line and print a
/// JSON report of the resulting working directory.
pub fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let config = IngestConfig::load()?;
    let inputs: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    if inputs.is_empty() {
        return Err(AppError::ValidationError(
            "usage: dataset-ingest <file.csv|file.zip>...".to_string(),
        ));
    }

    let workspace = DataWorkspace::open(&config)?;
    let pipeline = DatasetIngestionUseCase::new(&config, &workspace);

    let mut report = RunReport::new(DirectoryListing::absent(workspace.absolute_root()));

    for input in &inputs {
        ingest_path(&pipeline, input, &mut report);
    }

    report.directory = pipeline.list_directory_contents();
    report.available_csvs = available_csvs_report(workspace.root());

    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::Internal(format!("Failed to serialize report: {}", e)))?;
    println!("{}", json);

    info!(
        datasets = report.datasets.len(),
        warnings = report.warnings.len(),
        "Ingestion run finished"
    );
    Ok(())
}

fn ingest_path(pipeline: &DatasetIngestionUseCase<'_>, input: &Path, report: &mut RunReport) {
    let content = match std::fs::read(input) {
        Ok(content) => content,
        Err(e) => {
            warn!(path = %input.display(), error = %e, "Failed to read input");
            report
                .warnings
                .push(format!("Failed to read {}: {}", input.display(), e));
            return;
        }
    };

    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string());
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("csv") => match pipeline.ingest_csv(&content, &file_name) {
            Ok(dataset) => report.datasets.push(LoadedDataset {
                summary: pipeline.summarize(&dataset),
                name: dataset.name,
                path: dataset.path,
                encoding: dataset.encoding.to_string(),
            }),
            Err(e) => report.warnings.push(e.to_string()),
        },
        Some("zip") => {
            let zip_report = pipeline.ingest_zip(&content);
            if let Some(error) = zip_report.error {
                report.warnings.push(error);
            }
            report.warnings.extend(zip_report.warnings);
            for (name, dataset) in zip_report.datasets {
                report.datasets.push(LoadedDataset {
                    summary: pipeline.summarize(&dataset),
                    name,
                    path: dataset.path,
                    encoding: dataset.encoding.to_string(),
                });
            }
        }
        _ => {
            warn!(path = %input.display(), "Unsupported input type");
            report.warnings.push(format!(
                "Unsupported file type: {} (expected .csv or .zip)",
                input.display()
            ));
        }
    }
}
