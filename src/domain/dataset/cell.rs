// ============================================================
// CELL VALUES
// ============================================================
// Typed cell values produced when parsing delimited text

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed value in a table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Empty field or one of the configured NA markers
    Missing,
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// Infer the cell type of a raw field.
    ///
    /// Empty strings and exact matches against `na_values` become `Missing`.
    /// Numeric detection tolerates surrounding whitespace; text keeps the raw
    /// value untouched.
    pub fn parse(raw: &str, na_values: &[String]) -> Self {
        if raw.is_empty() || na_values.iter().any(|na| na == raw) {
            return Cell::Missing;
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Text(raw.to_string());
        }

        if let Ok(value) = trimmed.parse::<i64>() {
            return Cell::Integer(value);
        }

        if Self::looks_like_float(trimmed) {
            if let Ok(value) = trimmed.parse::<f64>() {
                return Cell::Float(value);
            }
        }

        Cell::Text(raw.to_string())
    }

    // `f64::from_str` also accepts words like "inf" or "infinity"; only
    // digit-bearing literals count as numbers here.
    fn looks_like_float(value: &str) -> bool {
        value.chars().any(|c| c.is_ascii_digit())
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, "NaN"),
            Cell::Integer(value) => write!(f, "{}", value),
            Cell::Float(value) => write!(f, "{}", value),
            Cell::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Integer(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}
