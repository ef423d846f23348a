//! Local filesystem storage for pipeline files.
//!
//! Every file lives under one data directory:
//!
//! ```text
//! {root}/
//! ├── config.toml       # Pipeline configuration
//! ├── *.dat             # Listing caches (read only)
//! ├── keys.dat          # Record store (batch)
//! ├── urls.dat          # Signed URLs, one per line
//! └── probe.json        # Optional probe report
//! ```
//!
//! Writes go to a temporary sibling first and are renamed into place.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::file_access(parent, e))?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    pub async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let io = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&tmp, &path).await
        };
        io.await.map_err(|e| AppError::file_access(&path, e))
    }

    pub async fn write_text(&self, key: &str, text: &str) -> Result<()> {
        self.write_bytes(key, text.as_bytes()).await
    }

    /// Write one line per item, each newline-terminated.
    pub async fn write_lines<S: AsRef<str>>(&self, key: &str, lines: &[S]) -> Result<()> {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        self.write_text(key, &text).await
    }

    /// Write JSON data.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read a UTF-8 file.
    pub async fn read_text(&self, key: &str) -> Result<String> {
        let path = self.path(key);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::file_access(&path, e))
    }

    /// Trimmed, non-empty lines of a file.
    pub async fn read_lines(&self, key: &str) -> Result<Vec<String>> {
        let text = self.read_text(key).await?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_text("keys.dat", "hello").await.unwrap();
        assert_eq!(storage.read_text("keys.dat").await.unwrap(), "hello");
        assert!(!storage.path("keys.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_missing_is_file_access_error() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        match storage.read_text("nope.dat").await {
            Err(AppError::FileAccess { path, .. }) => assert!(path.ends_with("nope.dat")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lines_round_trip_skips_blanks() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_lines("urls.dat", &["https://a/1", "https://a/2"])
            .await
            .unwrap();
        let raw = storage.read_text("urls.dat").await.unwrap();
        assert_eq!(raw, "https://a/1\nhttps://a/2\n");

        storage
            .write_text("urls.dat", "https://a/1\n\n   \n  https://a/2  \n")
            .await
            .unwrap();
        assert_eq!(
            storage.read_lines("urls.dat").await.unwrap(),
            vec!["https://a/1", "https://a/2"]
        );
    }

    #[tokio::test]
    async fn test_write_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage
            .write_json("reports/probe.json", &vec![1, 2, 3])
            .await
            .unwrap();
        assert!(storage.path("reports/probe.json").exists());
    }
}
