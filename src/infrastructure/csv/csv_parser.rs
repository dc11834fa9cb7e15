// ============================================================
// CSV PARSER
// ============================================================
// Parse decoded delimited text into headers and typed cells

use csv::{ReaderBuilder, StringRecord};

use crate::domain::dataset::Cell;
use crate::domain::error::AppError;

/// Headers and rows exactly as read, before column normalization
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

/// CSV parser over already-decoded text
pub struct CsvParser {
    /// Delimiter character (default: comma)
    delimiter: u8,

    /// Values that become `Cell::Missing`
    na_values: Vec<String>,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            na_values: Vec::new(),
        }
    }
}

impl CsvParser {
    /// Create a new CSV parser with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_na_values(mut self, na_values: Vec<String>) -> Self {
        self.na_values = na_values;
        self
    }

    /// Parse CSV content from string.
    ///
    /// The first record is the header. Short rows are allowed (padded later);
    /// a row with more fields than the header is an error.
    pub fn parse_content(&self, content: &str) -> Result<ParsedCsv, AppError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| AppError::ParseError(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        if headers.is_empty() {
            return Err(AppError::ParseError(
                "No columns to parse from file".to_string(),
            ));
        }

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::ParseError(format!("Failed to parse CSV row {}: {}", index + 1, e))
            })?;

            if record.len() > headers.len() {
                let line = record
                    .position()
                    .map(|p| p.line())
                    .unwrap_or(index as u64 + 2);
                return Err(AppError::ParseError(format!(
                    "Expected {} fields in line {}, saw {}",
                    headers.len(),
                    line,
                    record.len()
                )));
            }

            rows.push(self.parse_row(&record));
        }

        Ok(ParsedCsv {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        })
    }

    fn parse_row(&self, record: &StringRecord) -> Vec<Cell> {
        record
            .iter()
            .map(|value| Cell::parse(value, &self.na_values))
            .collect()
    }

    /// Detect delimiter from content (comma, semicolon, tab, pipe)
    pub fn detect_delimiter(content: &str) -> u8 {
        let candidates = [b',', b';', b'\t', b'|'];

        let mut best_delimiter = b',';
        let mut best_score = 0.0f32;

        let sample_lines: Vec<_> = content.lines().take(10).collect();
        if sample_lines.is_empty() {
            return best_delimiter;
        }

        for &delimiter in &candidates {
            let field_counts: Vec<usize> = sample_lines
                .iter()
                .map(|line| line.bytes().filter(|&b| b == delimiter).count())
                .collect();

            // Score by consistency (low standard deviation) and frequency
            let avg = field_counts.iter().sum::<usize>() as f32 / field_counts.len() as f32;
            let variance = field_counts
                .iter()
                .map(|&x| (x as f32 - avg).powi(2))
                .sum::<f32>()
                / field_counts.len() as f32;

            let score = avg / (1.0 + variance.sqrt());

            if score > best_score {
                best_score = score;
                best_delimiter = delimiter;
            }
        }

        best_delimiter
    }
}
