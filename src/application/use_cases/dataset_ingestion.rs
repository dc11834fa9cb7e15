// ============================================================
// DATASET INGESTION USE CASE
// ============================================================
// Turn uploaded CSV / ZIP bytes into normalized tables backed by files

use std::collections::HashSet;
use std::time::Instant;

use tracing::{error, info, warn};

use crate::domain::dataset::{
    ColumnRename, DirectoryListing, IngestedDataset, NormalizedTable, TableSummary, TextEncoding,
    ZipIngestReport,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::archive::CsvArchive;
use crate::infrastructure::config::IngestConfig;
use crate::infrastructure::csv::{CsvParser, EncodingDetector};
use crate::infrastructure::storage::{sanitize_file_name, DataWorkspace};

/// Ingestion pipeline over a borrowed workspace
pub struct DatasetIngestionUseCase<'w> {
    config: IngestConfig,
    workspace: &'w DataWorkspace,
    detector: EncodingDetector,
}

impl<'w> DatasetIngestionUseCase<'w> {
    pub fn new(config: &IngestConfig, workspace: &'w DataWorkspace) -> Self {
        Self {
            config: config.clone(),
            workspace,
            detector: EncodingDetector::new(),
        }
    }

    pub fn workspace(&self) -> &DataWorkspace {
        self.workspace
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Recreate the working directory empty.
    pub fn initialize(&self) -> Result<()> {
        self.workspace.initialize()
    }

    /// Remove the working directory. Never fails.
    pub fn teardown(&self) {
        self.workspace.teardown()
    }

    /// Drop every stored file and start over with an empty directory.
    pub fn clear_all(&self) -> Result<()> {
        self.workspace.teardown();
        self.workspace.initialize()
    }

    pub fn list_directory_contents(&self) -> DirectoryListing {
        self.workspace.list()
    }

    pub fn remove_files<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.workspace.remove_files(names)
    }

    pub fn summarize(&self, dataset: &IngestedDataset) -> TableSummary {
        dataset.table.summary(self.config.preview_rows)
    }

    /// Store a single CSV upload and parse it.
    ///
    /// The raw bytes are written before parsing. If parsing fails the file
    /// just written is removed again and the error is returned.
    pub fn ingest_csv(&self, content: &[u8], filename: &str) -> Result<IngestedDataset> {
        let start = Instant::now();

        let path = self.workspace.write_file(filename, content).map_err(|e| {
            error!(file = %filename, error = %e, "Failed to store CSV upload");
            e
        })?;

        let (table, encoding, renamed_columns) = match self.parse(content) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(file = %filename, error = %e, "Failed to read CSV");
                if path.exists() {
                    if let Err(remove_err) = std::fs::remove_file(&path) {
                        warn!(
                            path = %path.display(),
                            error = %remove_err,
                            "Failed to remove unreadable upload"
                        );
                    }
                }
                return Err(AppError::ParseError(format!(
                    "Failed to read CSV {}: {}",
                    filename,
                    inner_message(&e)
                )));
            }
        };

        info!(
            file = %filename,
            rows = table.row_count(),
            columns = table.column_count(),
            encoding = %encoding,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "CSV ingested"
        );

        Ok(IngestedDataset {
            name: filename.to_string(),
            path,
            table,
            encoding,
            renamed_columns,
        })
    }

    fn parse(&self, content: &[u8]) -> Result<(NormalizedTable, TextEncoding, Vec<ColumnRename>)> {
        let decoded = self.detector.decode(content);
        if decoded.encoding.is_lossy() {
            warn!("No candidate encoding matched; invalid UTF-8 bytes were dropped");
        }

        let delimiter = if self.config.detect_delimiter {
            CsvParser::detect_delimiter(&decoded.text)
        } else {
            self.config.delimiter_byte()
        };

        let parsed = CsvParser::new()
            .with_delimiter(delimiter)
            .with_na_values(self.config.na_values.clone())
            .parse_content(&decoded.text)?;

        let (table, renames) = NormalizedTable::from_raw(&parsed.headers, parsed.rows);
        if !renames.is_empty() {
            info!(changes = renames.len(), "Column names normalized");
        }

        Ok((table, decoded.encoding, renames))
    }

    /// Ingest every CSV member of a ZIP upload.
    ///
    /// Members that fail are skipped and reported as warnings. So is a member
    /// whose stored name matches one already written from this archive
    /// (`a/b.csv` and `a__b.csv` both store as `a__b.csv`); the first one
    /// wins. An unreadable archive gives an empty report carrying the error
    /// message.
    pub fn ingest_zip(&self, content: &[u8]) -> ZipIngestReport {
        let mut archive = match CsvArchive::open(content) {
            Ok(archive) => archive,
            Err(e) => {
                error!(error = %e, "Failed to process ZIP upload");
                return ZipIngestReport::failed(format!(
                    "Failed to process ZIP file: {}",
                    inner_message(&e)
                ));
            }
        };

        let mut report = ZipIngestReport::default();
        let mut stored_names = HashSet::new();

        for entry in archive.csv_entries() {
            let outcome = entry
                .content
                .and_then(|bytes| {
                    let stored = sanitize_file_name(&entry.name)?;
                    if !stored_names.insert(stored.clone()) {
                        return Err(AppError::ValidationError(format!(
                            "stored name {} already used by another entry",
                            stored
                        )));
                    }
                    self.ingest_csv(&bytes, &entry.name)
                });

            match outcome {
                Ok(dataset) => {
                    report.datasets.insert(entry.name, dataset);
                }
                Err(e) => {
                    warn!(entry = %entry.name, error = %e, "Skipping archive entry");
                    report
                        .warnings
                        .push(format!("Failed to process {}: {}", entry.name, inner_message(&e)));
                }
            }
        }

        info!(
            loaded = report.len(),
            skipped = report.warnings.len(),
            "ZIP upload processed"
        );
        report
    }
}

/// Error text without the `Display` kind prefix.
fn inner_message(err: &AppError) -> &str {
    match err {
        AppError::Internal(msg)
        | AppError::ValidationError(msg)
        | AppError::DecodeError(msg)
        | AppError::ParseError(msg)
        | AppError::ArchiveError(msg)
        | AppError::EntryError(msg)
        | AppError::ConfigError(msg)
        | AppError::IoError(msg) => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::Cell;
    use crate::infrastructure::archive::test_support::build_zip;
    use encoding_rs::WINDOWS_1252;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DataWorkspace, IngestConfig) {
        let tmp = TempDir::new().unwrap();
        let config = IngestConfig::default().with_data_dir(tmp.path().join("data"));
        let workspace = DataWorkspace::open(&config).unwrap();
        (tmp, workspace, config)
    }

    #[test]
    fn test_ingest_simple_csv() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let content = b"a,b\n1,2\n";
        let dataset = pipeline.ingest_csv(content, "x.csv").unwrap();

        assert_eq!(dataset.table.columns(), &["a", "b"]);
        assert_eq!(dataset.table.rows(), &[vec![Cell::Integer(1), Cell::Integer(2)]]);
        assert_eq!(dataset.encoding, TextEncoding::Utf8);
        assert!(dataset.renamed_columns.is_empty());
        assert_eq!(dataset.path, ws.root().join("x.csv"));

        let listing = pipeline.list_directory_contents();
        assert_eq!(listing.file_names(), vec!["x.csv"]);
        assert_eq!(listing.files[0].size_bytes, content.len() as u64);
        assert_eq!(listing.total_size_bytes, content.len() as u64);
    }

    #[test]
    fn test_remove_after_ingest() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        pipeline.ingest_csv(b"a,b\n1,2\n", "x.csv").unwrap();

        pipeline.remove_files(["x.csv"]);
        assert!(pipeline.list_directory_contents().is_empty());

        pipeline.remove_files(["x.csv"]);
        assert!(pipeline.list_directory_contents().is_empty());
    }

    #[test]
    fn test_stored_file_is_verbatim() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let (bytes, _, _) = WINDOWS_1252.encode("nome\nJosé\n");

        let dataset = pipeline.ingest_csv(&bytes, "latin.csv").unwrap();
        assert_eq!(std::fs::read(&dataset.path).unwrap(), bytes.to_vec());
    }

    #[test]
    fn test_round_trips_every_candidate_encoding() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let text = "cidade,preço\nSão Paulo,10\nGoiânia,12\n";

        for (idx, label) in ["utf-8", "latin1", "windows-1252", "iso-8859-1"].iter().enumerate() {
            let encoding = encoding_rs::Encoding::for_label(label.as_bytes()).unwrap();
            let (bytes, _, had_errors) = encoding.encode(text);
            assert!(!had_errors);

            let dataset = pipeline
                .ingest_csv(&bytes, &format!("file_{}.csv", idx))
                .unwrap();
            assert_eq!(dataset.table.columns(), &["cidade", "preco"]);
            assert_eq!(
                dataset.table.column("cidade").unwrap(),
                vec![&Cell::from("São Paulo"), &Cell::from("Goiânia")]
            );
        }
    }

    #[test]
    fn test_c1_bytes_decode_as_latin1_code_points() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let dataset = pipeline.ingest_csv(b"v\n\xE9\x80\n", "l.csv").unwrap();
        assert_eq!(dataset.encoding, TextEncoding::Latin1);
        assert_eq!(dataset.table.rows()[0], vec![Cell::from("é\u{80}")]);
    }

    #[test]
    fn test_windows_1252_bytes_take_latin1_reading() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let (bytes, _, _) = WINDOWS_1252.encode("item,valor\nçaneta,€5\n");

        let dataset = pipeline.ingest_csv(&bytes, "cp.csv").unwrap();
        assert_eq!(dataset.encoding, TextEncoding::Latin1);
        assert_eq!(
            dataset.table.rows()[0],
            vec![Cell::from("çaneta"), Cell::from("\u{80}5")]
        );
    }

    #[test]
    fn test_duplicate_headers_are_suffixed() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let dataset = pipeline
            .ingest_csv("Preço,preco \n1,2\n".as_bytes(), "dup.csv")
            .unwrap();
        assert_eq!(dataset.table.columns(), &["preco", "preco_1"]);
        assert_eq!(dataset.renamed_columns.len(), 2);
    }

    #[test]
    fn test_parse_failure_removes_written_file() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let err = pipeline.ingest_csv(b"a,b\n1,2,3,4\n", "bad.csv").unwrap_err();
        assert!(err.to_string().contains("bad.csv"));
        assert!(pipeline.list_directory_contents().is_empty());

        let err = pipeline.ingest_csv(b"", "empty.csv").unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
        assert!(pipeline.list_directory_contents().is_empty());
    }

    #[test]
    fn test_invalid_filename_is_rejected() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let err = pipeline.ingest_csv(b"a\n1\n", "../").unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_traversal_name_is_stored_inside_workspace() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let dataset = pipeline.ingest_csv(b"a\n1\n", "../../evil.csv").unwrap();

        assert_eq!(dataset.name, "../../evil.csv");
        assert_eq!(dataset.path, ws.root().join("evil.csv"));
    }

    #[test]
    fn test_semicolon_detection() {
        let (_tmp, ws, config) = setup();
        let config = IngestConfig {
            detect_delimiter: true,
            ..config
        };
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let dataset = pipeline.ingest_csv(b"a;b\n1;2\n3;4\n", "semi.csv").unwrap();
        assert_eq!(dataset.table.columns(), &["a", "b"]);
        assert_eq!(dataset.table.row_count(), 2);
    }

    #[test]
    fn test_unvalidated_non_ascii_delimiter_is_not_truncated() {
        let (_tmp, ws, config) = setup();
        let config = IngestConfig {
            delimiter: '\u{13B}',
            ..config
        };
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let dataset = pipeline.ingest_csv(b"a;b\n1;2\n", "u.csv").unwrap();
        assert_eq!(dataset.table.columns(), &["a_b"]);
    }

    #[test]
    fn test_zip_with_csv_and_other_entries() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let bytes = build_zip(&[
            ("vendas.csv", "produto,qtd\ncaneta,3\n"),
            ("clientes.CSV", "nome\nAna\n"),
            ("dados/", ""),
            ("dados/estoque.csv", "item,saldo\nlapis,10\n"),
            ("leia-me.txt", "nada"),
        ]);

        let report = pipeline.ingest_zip(&bytes);
        assert_eq!(report.len(), 3);
        assert!(report.error.is_none());
        assert!(report.warnings.is_empty());

        let nested = report.get("dados/estoque.csv").unwrap();
        assert_eq!(nested.path, ws.root().join("dados__estoque.csv"));
        assert_eq!(nested.table.columns(), &["item", "saldo"]);

        assert_eq!(pipeline.list_directory_contents().files.len(), 3);
    }

    #[test]
    fn test_zip_skips_corrupt_entry() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let bytes = build_zip(&[
            ("ok.csv", "a,b\n1,2\n"),
            ("broken.csv", "a,b\n1,2,3,4\n"),
        ]);

        let report = pipeline.ingest_zip(&bytes);
        assert_eq!(report.len(), 1);
        assert!(report.get("ok.csv").is_some());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("broken.csv"));
        assert_eq!(pipeline.list_directory_contents().file_names(), vec!["ok.csv"]);
    }

    #[test]
    fn test_zip_entries_with_colliding_stored_names() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let bytes = build_zip(&[
            ("a/b.csv", "x\n1\n"),
            ("a__b.csv", "x,y\n1,2,3,4\n"),
        ]);

        let report = pipeline.ingest_zip(&bytes);
        assert_eq!(report.len(), 1);
        let kept = report.get("a/b.csv").unwrap();
        assert!(kept.path.exists());
        assert_eq!(std::fs::read(&kept.path).unwrap(), b"x\n1\n".to_vec());

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("a__b.csv"));
        assert_eq!(pipeline.list_directory_contents().file_names(), vec!["a__b.csv"]);
    }

    #[test]
    fn test_malformed_zip_returns_empty_report() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);

        let report = pipeline.ingest_zip(b"PK\x03\x04 this is not really a zip");
        assert!(report.is_empty());
        assert!(report.error.is_some());

        let report = pipeline.ingest_zip(b"");
        assert!(report.is_empty());
        assert!(report.error.is_some());
    }

    #[test]
    fn test_clear_all_and_reinitialize() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        pipeline.ingest_csv(b"a\n1\n", "one.csv").unwrap();
        pipeline.ingest_csv(b"a\n2\n", "two.csv").unwrap();

        pipeline.clear_all().unwrap();
        let listing = pipeline.list_directory_contents();
        assert!(listing.exists);
        assert!(listing.is_empty());

        pipeline.teardown();
        assert!(!pipeline.list_directory_contents().exists);
        pipeline.initialize().unwrap();
        assert!(pipeline.list_directory_contents().exists);
    }

    #[test]
    fn test_summary_uses_configured_preview() {
        let (_tmp, ws, config) = setup();
        let pipeline = DatasetIngestionUseCase::new(&config, &ws);
        let dataset = pipeline
            .ingest_csv(b"n,v\n1,a\n2,\n3,c\n4,d\n", "s.csv")
            .unwrap();

        let summary = pipeline.summarize(&dataset);
        assert_eq!(summary.row_count, 4);
        assert_eq!(summary.preview.len(), 3);
        assert_eq!(summary.missing_values.len(), 1);
        assert_eq!(summary.missing_values[0].column, "v");
    }
}
