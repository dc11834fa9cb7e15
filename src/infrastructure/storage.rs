// ============================================================
// DATA WORKSPACE
// ============================================================
// Owned working directory for uploaded dataset files

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::dataset::{DirectoryListing, StoredFileInfo};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::IngestConfig;

fn io_err(msg: impl Into<String>) -> AppError {
    AppError::IoError(msg.into())
}

fn invalid_input(msg: impl Into<String>) -> AppError {
    AppError::ValidationError(msg.into())
}

/// Working directory that holds every ingested file.
///
/// Created empty by [`DataWorkspace::initialize`] and removed by
/// [`DataWorkspace::teardown`]. When `cleanup_on_drop` is set the directory is
/// also removed when the value is dropped, so the release happens exactly once
/// per workspace even on early returns.
///
/// Not synchronized: one session drives a workspace at a time.
#[derive(Debug)]
pub struct DataWorkspace {
    root: PathBuf,
    cleanup_on_drop: bool,
}

impl DataWorkspace {
    /// Describe a workspace without touching the filesystem.
    pub fn new(root: impl Into<PathBuf>, cleanup_on_drop: bool) -> Self {
        Self {
            root: root.into(),
            cleanup_on_drop,
        }
    }

    /// Create the workspace from config and initialize it.
    pub fn open(config: &IngestConfig) -> Result<Self> {
        let workspace = Self::new(&config.data_dir, config.cleanup_on_exit);
        workspace.initialize()?;
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn absolute_root(&self) -> PathBuf {
        std::path::absolute(&self.root).unwrap_or_else(|_| self.root.clone())
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Keep the directory on drop and hand back its path.
    pub fn persist(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        self.root.clone()
    }

    /// Remove any previous directory and recreate it empty.
    ///
    /// Calling it twice wipes whatever was stored in between.
    pub fn initialize(&self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root).map_err(|e| {
                warn!(error = %e, path = %self.root.display(), "Failed to clear data directory");
                io_err(format!(
                    "Failed to clear data directory {}: {e}",
                    self.root.display()
                ))
            })?;
            info!(path = %self.root.display(), "Cleared data directory on initialize");
        }

        self.ensure_root()?;
        info!(path = %self.root.display(), "Data directory initialized");
        Ok(())
    }

    /// Recursively remove the directory. Errors are logged, never returned.
    pub fn teardown(&self) {
        if !self.root.exists() {
            return;
        }

        match fs::remove_dir_all(&self.root) {
            Ok(()) => info!(path = %self.root.display(), "Data directory removed"),
            Err(e) => warn!(
                error = %e,
                path = %self.root.display(),
                "Failed to remove data directory"
            ),
        }
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            warn!(error = %e, path = %self.root.display(), "Failed to create data directory");
            io_err(format!(
                "Failed to create data directory {}: {e}",
                self.root.display()
            ))
        })
    }

    /// On-disk location for an upload name.
    pub fn file_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.root.join(sanitize_file_name(name)?))
    }

    /// Write `bytes` verbatim under the sanitized `name`.
    ///
    /// The content goes to a temp file first and is renamed into place, so a
    /// failed write never leaves a truncated file behind.
    pub fn write_file(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.file_path(name)?;
        self.ensure_root()?;

        let tmp_path = self
            .root
            .join(format!(".upload-{}.tmp", Uuid::new_v4()));
        {
            let mut file = fs::File::create(&tmp_path).map_err(|e| {
                io_err(format!(
                    "Failed to create temp file {}: {e}",
                    tmp_path.display()
                ))
            })?;
            if let Err(e) = file.write_all(bytes) {
                let _ = fs::remove_file(&tmp_path);
                return Err(io_err(format!(
                    "Failed to write temp file {}: {e}",
                    tmp_path.display()
                )));
            }
            file.sync_all().ok();
        }

        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            io_err(format!(
                "Failed to rename temp file {} to {}: {e}",
                tmp_path.display(),
                path.display()
            ))
        })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(path)
    }

    /// Delete one stored file. Returns whether a file was removed.
    pub fn remove_file(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| io_err(format!("Failed to remove {}: {e}", path.display())))?;
        info!(file = %name, "Removed stored file");
        Ok(true)
    }

    /// Delete each named file. A failure is logged and the rest proceed.
    pub fn remove_files<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref();
            if let Err(e) = self.remove_file(name) {
                warn!(file = %name, error = %e, "Failed to remove stored file");
            }
        }
    }

    /// Current directory contents. Never fails; unreadable entries are skipped.
    pub fn list(&self) -> DirectoryListing {
        let path = self.absolute_root();
        if !self.exists() {
            return DirectoryListing::absent(path);
        }

        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, path = %self.root.display(), "Failed to read data directory");
                return DirectoryListing {
                    exists: true,
                    ..DirectoryListing::absent(path)
                };
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Failed to read directory entry");
                    continue;
                }
            };
            let meta = match entry.metadata() {
                Ok(meta) => meta,
                Err(e) => {
                    warn!(error = %e, path = %entry.path().display(), "Failed to stat entry");
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            files.push(StoredFileInfo {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
                path: entry.path(),
            });
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();

        DirectoryListing {
            exists: true,
            path,
            files,
            total_size_bytes,
        }
    }
}

impl Drop for DataWorkspace {
    fn drop(&mut self) {
        if self.cleanup_on_drop {
            self.teardown();
        }
    }
}

/// Turn an untrusted upload name into a single path component.
///
/// Separators split the name; empty, `.` and `..` components are dropped and
/// the rest are joined with `__`, so `reports/2024/a.csv` becomes
/// `reports__2024__a.csv`. Control characters and `:` become `_`.
pub fn sanitize_file_name(name: &str) -> Result<String> {
    let parts: Vec<String> = name
        .split(|c| c == '/' || c == '\\')
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .map(|part| {
            part.chars()
                .map(|c| if c.is_control() || c == ':' { '_' } else { c })
                .collect()
        })
        .collect();

    let sanitized = parts.join("__");
    if sanitized.trim().is_empty() {
        return Err(invalid_input(format!("Invalid file name: {:?}", name)));
    }
    Ok(sanitized)
}
