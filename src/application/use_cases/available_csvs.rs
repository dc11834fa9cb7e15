// ============================================================
// AVAILABLE CSVS
// ============================================================
// Plain-text listing of the CSVs in a directory, as handed to the agent's
// `list_available_csvs` tool

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Describe the CSV files in `directory`. Never fails; problems are reported
/// in the returned text.
pub fn available_csvs_report(directory: &Path) -> String {
    if !directory.exists() {
        return format!(
            "Directory '{}' does not exist. Make sure the CSV files are in the right folder.",
            directory.display()
        );
    }

    let csv_files = match csv_files_in(directory) {
        Ok(files) => files,
        Err(e) => return format!("Error listing CSVs: {}", e),
    };

    if csv_files.is_empty() {
        return format!(
            "No CSV files found in directory '{}'.",
            directory.display()
        );
    }

    let mut report = format!("CSV files available in '{}':\n\n", directory.display());
    for (idx, (path, size)) in csv_files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let _ = writeln!(report, "{}. {}", idx + 1, name);
        let _ = writeln!(report, "   Path: {}", path.display());
        let _ = writeln!(report, "   Size: {:.2} MB\n", *size as f64 / BYTES_PER_MB);
    }
    let _ = write!(report, "Total: {} CSV file(s) found", csv_files.len());

    report
}

/// Regular `.csv` files in the directory with their sizes, sorted by path.
fn csv_files_in(directory: &Path) -> std::io::Result<Vec<(PathBuf, u64)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            continue;
        }
        let meta = entry.metadata()?;
        if meta.is_file() {
            files.push((path, meta.len()));
        }
    }
    files.sort();
    Ok(files)
}
