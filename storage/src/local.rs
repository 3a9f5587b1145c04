//! Local-disk implementation of the `FileStore` trait.
//!
//! Files are kept below a single root directory with one sub-directory per
//! `FileCategory`. Relative paths coming from requests are resolved against
//! that root and must not escape it.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::errors::StorageError;
use crate::models::{FileCategory, StoredFile};
use crate::FileStore;

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Opens the store at `root`, creating the root and every category
    /// directory if they are missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        for category in FileCategory::ALL {
            tokio::fs::create_dir_all(root.join(category.directory())).await?;
        }
        info!(root = %root.display(), "opened local file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a request path onto the disk. Only plain path segments are
    /// accepted, so `..`, absolute paths and drive prefixes never resolve.
    fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(relative_path);
        let mut resolved = self.root.clone();
        let mut segments = 0;
        for component in relative.components() {
            match component {
                Component::Normal(segment) => {
                    resolved.push(segment);
                    segments += 1;
                }
                Component::CurDir => {}
                _ => return Err(StorageError::InvalidPath(relative_path.to_string())),
            }
        }
        if segments == 0 {
            return Err(StorageError::InvalidPath(relative_path.to_string()));
        }
        Ok(resolved)
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    fn kind(&self) -> &'static str {
        "local"
    }

    async fn put(
        &self,
        category: FileCategory,
        file_name: &str,
        contents: Bytes,
    ) -> Result<StoredFile, StorageError> {
        let stored = StoredFile::new(category, file_name, contents.len());
        let target = self.resolve(&stored.relative_path)?;
        tokio::fs::write(&target, &contents).await?;
        debug!(path = %target.display(), size = stored.size, "stored upload");
        Ok(stored)
    }

    async fn read(&self, relative_path: &str) -> Result<Bytes, StorageError> {
        let target = self.resolve(relative_path)?;
        if tokio::fs::metadata(&target).await.map(|m| m.is_dir()).unwrap_or(false) {
            return Err(StorageError::NotFound(relative_path.to_string()));
        }
        match tokio::fs::read(&target).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(relative_path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, relative_path: &str) -> Result<(), StorageError> {
        let target = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(relative_path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store() -> (tempfile::TempDir, LocalFileStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::open(dir.path()).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn open_creates_category_directories() {
        let (dir, store) = open_store().await;
        assert_eq!(store.kind(), "local");
        for category in FileCategory::ALL {
            assert!(dir.path().join(category.directory()).is_dir());
        }
    }

    #[tokio::test]
    async fn put_then_read() {
        let (_dir, store) = open_store().await;
        let stored = store
            .put(
                FileCategory::CourseResource,
                "slides.pdf",
                Bytes::from_static(b"%PDF-1.4"),
            )
            .await
            .unwrap();

        assert_eq!(stored.url, "/uploads/courses/slides.pdf");
        let contents = store.read(&stored.relative_path).await.unwrap();
        assert_eq!(&contents[..], b"%PDF-1.4");
    }

    #[tokio::test]
    async fn put_replaces_existing_file() {
        let (_dir, store) = open_store().await;
        store
            .put(FileCategory::UserAvatar, "u1.png", Bytes::from_static(b"old"))
            .await
            .unwrap();
        store
            .put(FileCategory::UserAvatar, "u1.png", Bytes::from_static(b"new"))
            .await
            .unwrap();

        assert_eq!(&store.read("avatars/u1.png").await.unwrap()[..], b"new");
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (_dir, store) = open_store().await;
        for path in ["../secret", "avatars/../../etc/passwd", "/etc/passwd", ""] {
            assert!(
                matches!(store.read(path).await, Err(StorageError::InvalidPath(_))),
                "{path} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn missing_files_report_not_found() {
        let (_dir, store) = open_store().await;
        assert!(matches!(
            store.read("grievances/nope.png").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.delete("grievances/nope.png").await,
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            store.read("grievances").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_file() {
        let (_dir, store) = open_store().await;
        let stored = store
            .put(FileCategory::GrievancePhoto, "a.jpg", Bytes::from_static(b"x"))
            .await
            .unwrap();
        store.delete(&stored.relative_path).await.unwrap();
        assert!(store.read(&stored.relative_path).await.is_err());
    }
}
