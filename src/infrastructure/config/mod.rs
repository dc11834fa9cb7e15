// ============================================================
// INGESTION CONFIGURATION
// ============================================================
// Defaults, overridden by an optional TOML file and then by env vars

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "dataset-ingest.toml";
pub const ENV_PREFIX: &str = "DATASET_INGEST_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Working directory for uploaded files, relative to the process cwd
    pub data_dir: PathBuf,

    /// Field delimiter used when `detect_delimiter` is off
    pub delimiter: char,

    /// Pick the delimiter from a sample of the content
    pub detect_delimiter: bool,

    /// Remove the working directory when the workspace is dropped
    pub cleanup_on_exit: bool,

    /// Field values treated as missing, matched exactly
    pub na_values: Vec<String>,

    /// Rows kept in table summaries
    pub preview_rows: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            delimiter: ',',
            detect_delimiter: false,
            cleanup_on_exit: true,
            na_values: default_na_values(),
            preview_rows: 3,
        }
    }
}

fn default_na_values() -> Vec<String> {
    [
        "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
        "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl IngestConfig {
    /// Load from `dataset-ingest.toml` in the cwd (if present) and
    /// `DATASET_INGEST_*` env vars.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        let config: Self = Self::figment(config_file).extract()?;
        config.validate().map_err(|e| {
            AppError::ValidationError(format!("Invalid ingestion config: {}", e))
        })?;
        Ok(config)
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(IngestConfig::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_cleanup_on_exit(mut self, cleanup_on_exit: bool) -> Self {
        self.cleanup_on_exit = cleanup_on_exit;
        self
    }

    /// Delimiter as a byte. A non-ASCII delimiter (only reachable when the
    /// config was built without `validate`) falls back to a comma instead of
    /// being truncated to an unrelated byte.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            tracing::warn!(delimiter = ?self.delimiter, "Non-ASCII delimiter, using ','");
            b','
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(format!(
                "delimiter must be a single ASCII character other than quote or newline, got {:?}",
                self.delimiter
            ));
        }
        Ok(())
    }
}
