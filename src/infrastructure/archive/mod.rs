// ============================================================
// ZIP ARCHIVE READER
// ============================================================
// Read CSV members out of an in-memory ZIP upload

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::domain::error::{AppError, Result};

/// Resource-fork metadata written by macOS archivers
const MACOS_METADATA_DIR: &str = "__MACOSX/";

/// A CSV member read from the archive
#[derive(Debug)]
pub struct ArchiveEntry {
    pub name: String,
    pub content: Result<Vec<u8>>,
}

pub struct CsvArchive<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
    source_len: usize,
}

impl<'a> CsvArchive<'a> {
    /// Open archive bytes. Fails if the bytes are not a readable ZIP.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| AppError::ArchiveError(format!("Failed to read ZIP archive: {}", e)))?;
        Ok(Self {
            archive,
            source_len: bytes.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Read every CSV member, in archive order.
    ///
    /// Directories, non-CSV files and `__MACOSX/` metadata are skipped. A
    /// member that cannot be read is returned with its error so the caller
    /// can report it and carry on.
    pub fn csv_entries(&mut self) -> Vec<ArchiveEntry> {
        let mut entries = Vec::new();

        for index in 0..self.archive.len() {
            let mut file = match self.archive.by_index(index) {
                Ok(file) => file,
                Err(e) => {
                    entries.push(ArchiveEntry {
                        name: format!("entry #{}", index),
                        content: Err(AppError::EntryError(format!(
                            "Failed to open entry #{}: {}",
                            index, e
                        ))),
                    });
                    continue;
                }
            };

            let name = file.name().to_string();
            if file.is_dir() || !is_csv_entry(&name) {
                tracing::debug!(entry = %name, "Skipping non-CSV archive entry");
                continue;
            }

            // Declared sizes are untrusted; never reserve past the upload itself.
            let declared = usize::try_from(file.size()).unwrap_or(usize::MAX);
            let mut content = Vec::with_capacity(declared.min(self.source_len));
            let content = match file.read_to_end(&mut content) {
                Ok(_) => Ok(content),
                Err(e) => Err(AppError::EntryError(format!(
                    "Failed to read {}: {}",
                    name, e
                ))),
            };

            entries.push(ArchiveEntry { name, content });
        }

        entries
    }
}

/// True for non-metadata members whose last `.`-separated segment is `csv`,
/// ignoring case. A bare `.csv` counts.
pub fn is_csv_entry(name: &str) -> bool {
    if name.starts_with(MACOS_METADATA_DIR) || name.ends_with('/') {
        return false;
    }

    name.rsplit('.')
        .next()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}
