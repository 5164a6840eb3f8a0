//! # File Storage
//!
//! Keeps on-disk copies of uploads and of the files the service produces.
//! The audio core never sees a path; handlers pass bytes in and out of this
//! store only when `storage.persist` is enabled.

use crate::config::StorageConfig;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

const FALLBACK_FILENAME: &str = "upload.wav";

/// Upload and output directories.
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    processed_dir: PathBuf,
}

impl FileStore {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            processed_dir: config.processed_dir.clone(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Create both directories if they are missing.
    pub async fn ensure_dirs(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        tokio::fs::create_dir_all(&self.processed_dir).await?;
        Ok(())
    }

    /// Write an upload as `upload_dir/<name>`.
    ///
    /// The directory is created if missing, since persistence can be switched
    /// on at runtime.
    pub async fn save_upload(&self, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        let path = self.upload_dir.join(sanitize_filename(filename));
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Saved upload");
        Ok(path)
    }

    /// Write a result as `processed_dir/<prefix>_<name>`.
    pub async fn save_processed(&self, prefix: &str, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.processed_dir).await?;
        let path = self.processed_dir.join(output_filename(prefix, filename));
        tokio::fs::write(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Saved processed file");
        Ok(path)
    }
}

/// Name a result file the way clients expect: `<prefix>_<uploaded name>`.
pub fn output_filename(prefix: &str, filename: &str) -> String {
    format!("{}_{}", prefix, sanitize_filename(filename))
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// Directory parts are dropped (both `/` and `\` separators) and any character
/// outside `[A-Za-z0-9._-]` is removed. Names that end up empty or made only
/// of dots become `upload.wav`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    if cleaned.chars().all(|c| c == '.') {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("song.wav"), "song.wav");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\music\\take 1.wav"), "take1.wav");
        assert_eq!(sanitize_filename(".."), "upload.wav");
        assert_eq!(sanitize_filename(""), "upload.wav");
        assert_eq!(sanitize_filename("dir/"), "upload.wav");
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(output_filename("merged", "a.wav"), "merged_a.wav");
        assert_eq!(output_filename("processed", "/tmp/x.wav"), "processed_x.wav");
    }

    #[tokio::test]
    async fn test_save_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            upload_dir: dir.path().join("uploads"),
            processed_dir: dir.path().join("processed"),
            persist: true,
        };
        let store = FileStore::new(&config);
        store.ensure_dirs().await.unwrap();

        let upload = store.save_upload("in.wav", b"abc").await.unwrap();
        assert_eq!(upload, dir.path().join("uploads").join("in.wav"));
        assert_eq!(tokio::fs::read(&upload).await.unwrap(), b"abc");

        let output = store.save_processed("silence", "in.wav", b"xyz").await.unwrap();
        assert_eq!(output, dir.path().join("processed").join("silence_in.wav"));
        assert_eq!(tokio::fs::read(&output).await.unwrap(), b"xyz");
    }

    #[tokio::test]
    async fn test_save_creates_missing_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            upload_dir: dir.path().join("late").join("uploads"),
            processed_dir: dir.path().join("late").join("processed"),
            persist: true,
        };
        let store = FileStore::new(&config);

        let upload = store.save_upload("in.wav", b"abc").await.unwrap();
        assert!(upload.exists());
        let output = store.save_processed("merged", "in.wav", b"xyz").await.unwrap();
        assert!(output.exists());
    }
}
