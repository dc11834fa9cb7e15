// ============================================================
// COLUMN NAME NORMALIZATION
// ============================================================
// Canonicalize headers to `[a-z0-9_]+` and make them unique

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Name given to headers that normalize to nothing
pub const UNNAMED_COLUMN: &str = "unnamed_column";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("valid regex"));
static UNDERSCORE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").expect("valid regex"));

/// A header that changed during normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub original: String,
    pub normalized: String,
}

/// Normalize a single header, without uniqueness handling.
pub fn normalize_column_name(name: &str) -> String {
    let without_accents: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();

    let cleaned = WHITESPACE_RUN.replace_all(without_accents.trim(), "_");
    let cleaned = NON_WORD.replace_all(&cleaned, "_");
    let cleaned = UNDERSCORE_RUN.replace_all(&cleaned, "_");
    let cleaned = cleaned.trim_matches('_').to_ascii_lowercase();

    if cleaned.is_empty() {
        UNNAMED_COLUMN.to_string()
    } else {
        cleaned
    }
}

/// Normalize every header and resolve collisions in column order.
///
/// The first occurrence of a name keeps the bare form; later ones get `_1`,
/// `_2`, ... A suffixed candidate that is already taken keeps counting up, so
/// the output is always pairwise distinct.
pub fn normalize_column_names<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let base = normalize_column_name(name.as_ref());

        let candidate = if taken.contains(&base) {
            let counter = counters.entry(base.clone()).or_insert(0);
            loop {
                *counter += 1;
                let suffixed = format!("{}_{}", base, counter);
                if !taken.contains(&suffixed) {
                    break suffixed;
                }
            }
        } else {
            counters.entry(base.clone()).or_insert(0);
            base
        };

        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

/// Pair up original and normalized headers, keeping only the ones that changed.
pub fn column_renames<S: AsRef<str>>(originals: &[S], normalized: &[String]) -> Vec<ColumnRename> {
    originals
        .iter()
        .zip(normalized)
        .filter(|(orig, norm)| orig.as_ref() != norm.as_str())
        .map(|(orig, norm)| ColumnRename {
            original: orig.as_ref().to_string(),
            normalized: norm.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_canonical(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn test_strips_accents_and_spaces() {
        assert_eq!(normalize_column_name("Preço Unitário"), "preco_unitario");
        assert_eq!(normalize_column_name("  First   Name "), "first_name");
        assert_eq!(normalize_column_name("Ação/Status (%)"), "acao_status");
    }

    #[test]
    fn test_collapses_and_trims_underscores() {
        assert_eq!(normalize_column_name("__a--b__"), "a_b");
        assert_eq!(normalize_column_name("valor.total"), "valor_total");
    }

    #[test]
    fn test_empty_names_use_placeholder() {
        assert_eq!(normalize_column_name(""), UNNAMED_COLUMN);
        assert_eq!(normalize_column_name("???"), UNNAMED_COLUMN);
        assert_eq!(normalize_column_name("   "), UNNAMED_COLUMN);
    }

    #[test]
    fn test_non_ascii_letters_become_underscores() {
        let name = normalize_column_name("数量 count");
        assert_eq!(name, "count");
        assert!(is_canonical(&normalize_column_name("Straße")));
    }

    #[test]
    fn test_duplicates_get_suffixes_in_order() {
        let names = normalize_column_names(&["Preço", "preco "]);
        assert_eq!(names, vec!["preco", "preco_1"]);

        let names = normalize_column_names(&["id", "ID", "Id", "name"]);
        assert_eq!(names, vec!["id", "id_1", "id_2", "name"]);
    }

    #[test]
    fn test_suffix_never_collides_with_existing_name() {
        let names = normalize_column_names(&["a", "a_1", "a", "a"]);
        assert_eq!(names, vec!["a", "a_1", "a_2", "a_3"]);

        let names = normalize_column_names(&["a", "a", "a_1"]);
        assert_eq!(names, vec!["a", "a_1", "a_1_1"]);
    }

    #[test]
    fn test_output_is_canonical_and_distinct() {
        let inputs = [
            "Nome do Cliente",
            "nome-do-cliente",
            "",
            "",
            "Ünïcödé",
            "123",
            "Total (R$)",
            "\t\n",
            "ｆｕｌｌ",
        ];
        let names = normalize_column_names(&inputs);
        assert_eq!(names.len(), inputs.len());
        assert!(names.iter().all(|n| is_canonical(n)));
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_idempotent() {
        let inputs = ["Preço", "preco ", "Data de Venda", "", "a_1", "a"];
        let once = normalize_column_names(&inputs);
        let twice = normalize_column_names(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_renames_only_list_changes() {
        let originals = ["a", "Preço"];
        let normalized = normalize_column_names(&originals);
        let renames = column_renames(&originals, &normalized);
        assert_eq!(
            renames,
            vec![ColumnRename {
                original: "Preço".to_string(),
                normalized: "preco".to_string(),
            }]
        );
    }
}
