//! File storage for uploaded images and their thumbnails.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, CatalogResult};

/// Abstraction over the media file store.
///
/// Names are plain file names under the store root, never paths; the
/// store rejects anything that would escape the root.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Write a file, replacing any existing content under that name
    async fn put(&self, name: &str, bytes: &[u8]) -> CatalogResult<()>;

    /// Remove a file. Removing a missing file is an error
    async fn delete(&self, name: &str) -> CatalogResult<()>;
}

/// Local filesystem implementation writing under a configured media root
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the media root directory if it does not exist yet
    pub async fn ensure_root(&self) -> CatalogResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> CatalogResult<PathBuf> {
        // Artifact names are generated UUIDs, but the store still refuses
        // anything that is not a bare file name.
        if name.is_empty() || name.contains('/') || name.contains("..") {
            return Err(CatalogError::Storage(format!(
                "Invalid file name: {name:?}"
            )));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> CatalogResult<()> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(file = %path.display(), size = bytes.len(), "File written");
        Ok(())
    }

    async fn delete(&self, name: &str) -> CatalogResult<()> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path).await?;
        tracing::debug!(file = %path.display(), "File removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        store.put("a.png", b"bytes").await.unwrap();
        assert!(dir.path().join("a.png").exists());

        store.delete("a.png").await.unwrap();
        assert!(!dir.path().join("a.png").exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert!(store.delete("missing.png").await.is_err());
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert!(store.put("../escape.png", b"x").await.is_err());
        assert!(store.delete("a/../../b").await.is_err());
    }

    #[tokio::test]
    async fn test_ensure_root_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("media");
        let store = LocalFileStore::new(&nested);
        store.ensure_root().await.unwrap();
        assert!(nested.is_dir());
    }
}
