// ============================================================
// DIRECTORY LISTING
// ============================================================
// Snapshot of the working directory contents

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFileInfo {
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl StoredFileInfo {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryListing {
    pub exists: bool,
    /// Absolute path of the working directory
    pub path: PathBuf,
    /// Regular files only, sorted by name
    pub files: Vec<StoredFileInfo>,
    pub total_size_bytes: u64,
}

impl DirectoryListing {
    pub fn absent(path: PathBuf) -> Self {
        Self {
            exists: false,
            path,
            files: Vec::new(),
            total_size_bytes: 0,
        }
    }

    pub fn total_size_mb(&self) -> f64 {
        self.total_size_bytes as f64 / BYTES_PER_MB
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
