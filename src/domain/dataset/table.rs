// ============================================================
// NORMALIZED TABLE
// ============================================================
// Parsed CSV content with canonical, unique column names

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::column_names::{column_renames, normalize_column_names, ColumnRename};
use super::Cell;

/// Tabular data with normalized headers.
///
/// Every row has exactly one cell per column. Column names always match
/// `[a-z0-9_]+` and are pairwise distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl NormalizedTable {
    /// Build a table from raw headers, normalizing the names.
    ///
    /// Rows are padded with `Cell::Missing` or truncated to the header width.
    /// Returns the table together with the headers that were renamed.
    pub fn from_raw<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<Cell>>) -> (Self, Vec<ColumnRename>) {
        let columns = normalize_column_names(headers);
        let renames = column_renames(headers, &columns);
        let width = columns.len();

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Missing);
                row
            })
            .collect();

        (Self { columns, rows }, renames)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a column, in row order.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn head(&self, n: usize) -> &[Vec<Cell>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Re-apply normalization to the current headers. A no-op on any table
    /// built through `from_raw`.
    pub fn renormalize(&mut self) -> Vec<ColumnRename> {
        let normalized = normalize_column_names(&self.columns);
        let renames = column_renames(&self.columns, &normalized);
        self.columns = normalized;
        renames
    }

    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        let mut kind = ColumnKind::Empty;
        for row in &self.rows {
            let cell_kind = match &row[idx] {
                Cell::Missing => continue,
                Cell::Integer(_) => ColumnKind::Integer,
                Cell::Float(_) => ColumnKind::Float,
                Cell::Text(_) => ColumnKind::Text,
            };
            kind = kind.merge(cell_kind);
        }
        kind
    }

    /// Overview of shape, column kinds and missing values.
    pub fn summary(&self, preview_rows: usize) -> TableSummary {
        let mut kind_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut missing_values = Vec::new();

        for (idx, name) in self.columns.iter().enumerate() {
            *kind_counts
                .entry(self.column_kind(idx).as_str().to_string())
                .or_insert(0) += 1;

            let missing = self.rows.iter().filter(|row| row[idx].is_missing()).count();
            if missing > 0 {
                missing_values.push(MissingCount {
                    column: name.clone(),
                    count: missing,
                });
            }
        }

        TableSummary {
            row_count: self.row_count(),
            column_count: self.column_count(),
            columns: self.columns.clone(),
            kind_counts,
            missing_values,
            preview: self.head(preview_rows).to_vec(),
        }
    }
}

/// Inferred type of a whole column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
    /// Text mixed with numbers
    Mixed,
    /// Every value missing
    Empty,
}

impl ColumnKind {
    fn merge(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Empty, k) | (k, Empty) => k,
            (a, b) if a == b => a,
            (Integer, Float) | (Float, Integer) => Float,
            _ => Mixed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
            ColumnKind::Mixed => "mixed",
            ColumnKind::Empty => "empty",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    pub column: String,
    pub count: usize,
}

/// Dataset overview shown next to an uploaded table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
    /// Number of columns per inferred kind
    pub kind_counts: BTreeMap<String, usize>,
    /// Only columns with at least one missing value, in column order
    pub missing_values: Vec<MissingCount>,
    pub preview: Vec<Vec<Cell>>,
}
