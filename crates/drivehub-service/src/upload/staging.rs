//! Temporary files holding upload bodies until they are forwarded.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use drivehub_core::config::UploadConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;

/// Creates staged files in the configured staging directory.
#[derive(Debug, Clone)]
pub struct UploadStager {
    dir: PathBuf,
    max_file_size: u64,
}

impl UploadStager {
    /// Build a stager from upload configuration.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.staging_path(),
            max_file_size: config.max_file_size_bytes,
        }
    }

    /// The staging directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Open an empty staged file for `name`.
    pub async fn begin(&self, name: &str, content_type: Option<&str>) -> AppResult<StagedFile> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create staging directory {}", self.dir.display()),
                e,
            )
        })?;

        let temp = tempfile::Builder::new()
            .prefix("drivehub-upload-")
            .tempfile_in(&self.dir)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to create staging file", e)
            })?;
        let writer = temp.as_file().try_clone().map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to open staging file", e)
        })?;

        debug!(name = %name, path = %temp.path().display(), "Staging upload");
        Ok(StagedFile {
            name: name.to_string(),
            content_type: content_type
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .map(str::to_string),
            size: 0,
            max_size: self.max_file_size,
            oversized: false,
            writer: tokio::fs::File::from_std(writer),
            temp,
        })
    }

    /// Stage a complete body in one go.
    pub async fn stage(
        &self,
        name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> AppResult<StagedFile> {
        let mut staged = self.begin(name, content_type).await?;
        staged.write_chunk(data).await?;
        staged.finish().await?;
        Ok(staged)
    }
}

/// One upload body on disk. The file is deleted on drop.
#[derive(Debug)]
pub struct StagedFile {
    name: String,
    content_type: Option<String>,
    size: u64,
    max_size: u64,
    oversized: bool,
    writer: tokio::fs::File,
    temp: NamedTempFile,
}

impl StagedFile {
    /// Append a chunk of the body.
    ///
    /// Once the size limit is crossed the file is marked oversized and
    /// further chunks are counted but not written.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> AppResult<()> {
        self.size += chunk.len() as u64;
        if self.size > self.max_size {
            self.oversized = true;
            return Ok(());
        }
        self.writer.write_all(chunk).await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to write staging file", e)
        })
    }

    /// Flush buffered writes.
    pub async fn finish(&mut self) -> AppResult<()> {
        self.writer.flush().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to flush staging file", e)
        })
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type, if the client sent one.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Size of the body in bytes, including any part past the limit.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the body exceeded the size limit.
    pub fn is_oversized(&self) -> bool {
        self.oversized
    }

    /// The size limit this file was staged under.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Path of the staging file.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Read the staged body back.
    pub async fn read(&self) -> AppResult<Bytes> {
        tokio::fs::read(self.temp.path())
            .await
            .map(Bytes::from)
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to read staging file", e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stager(dir: &Path, max: u64) -> UploadStager {
        UploadStager::new(&UploadConfig {
            max_file_size_bytes: max,
            max_files_per_batch: 10,
            staging_dir: dir.display().to_string(),
        })
    }

    #[tokio::test]
    async fn test_staged_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let staged = stager(dir.path(), 1024)
            .stage("a.txt", Some("text/plain"), b"hello")
            .await
            .unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(&staged.read().await.unwrap()[..], b"hello");
        assert_eq!(staged.size(), 5);

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_chunks_past_limit_mark_oversized() {
        let dir = tempfile::tempdir().unwrap();
        let mut staged = stager(dir.path(), 4).begin("big.bin", None).await.unwrap();
        staged.write_chunk(b"abc").await.unwrap();
        staged.write_chunk(b"def").await.unwrap();
        staged.finish().await.unwrap();

        assert!(staged.is_oversized());
        assert_eq!(staged.size(), 6);
        assert_eq!(&staged.read().await.unwrap()[..], b"abc");
    }

    #[tokio::test]
    async fn test_missing_staging_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("staging/uploads");
        let staged = stager(&nested, 1024).stage("x", Some(" "), b"1").await.unwrap();
        assert!(nested.is_dir());
        assert_eq!(staged.content_type(), None);
    }
}
