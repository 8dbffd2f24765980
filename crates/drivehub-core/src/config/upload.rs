//! Upload staging configuration.

use serde::{Deserialize, Serialize};

/// Limits and staging location for incoming uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Maximum number of files accepted in one batch.
    #[serde(default = "default_max_files")]
    pub max_files_per_batch: usize,
    /// Directory for temporary staging files. Empty means the OS temp dir.
    #[serde(default)]
    pub staging_dir: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: default_max_file_size(),
            max_files_per_batch: default_max_files(),
            staging_dir: String::new(),
        }
    }
}

impl UploadConfig {
    /// Resolve the staging directory.
    pub fn staging_path(&self) -> std::path::PathBuf {
        if self.staging_dir.is_empty() {
            std::env::temp_dir()
        } else {
            std::path::PathBuf::from(&self.staging_dir)
        }
    }
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100 MB
}

fn default_max_files() -> usize {
    20
}
