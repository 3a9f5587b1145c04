//! Core `storage` crate for abstracting where uploaded files live.
//!
//! This crate defines the `FileStore` trait, which outlines the operations the
//! backend needs from an upload backend (store, read, delete), together with
//! the upload categories and validation rules shared by every backend. The
//! `local` module provides the on-disk implementation.

pub mod errors;
pub mod local;
pub mod models;

pub use errors::StorageError;
pub use local::LocalFileStore;
pub use models::{content_type_for, unique_file_name, FileCategory, StoredFile, UploadPolicy};

use async_trait::async_trait;
use bytes::Bytes;

/// Generic functionality every upload backend provides.
///
/// Paths handed to `read` and `delete` are relative to the store root, e.g.
/// `grievances/3f1c....png`, exactly as returned in `StoredFile::relative_path`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Short name of the backend, used in logs.
    fn kind(&self) -> &'static str;

    /// Writes `contents` under the category directory, replacing any file with
    /// the same name.
    async fn put(
        &self,
        category: FileCategory,
        file_name: &str,
        contents: Bytes,
    ) -> Result<StoredFile, StorageError>;

    async fn read(&self, relative_path: &str) -> Result<Bytes, StorageError>;

    async fn delete(&self, relative_path: &str) -> Result<(), StorageError>;
}
