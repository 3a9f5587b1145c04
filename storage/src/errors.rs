//! Custom error types specific to the `storage` crate.
//!
//! This module defines errors that can occur while validating, writing or
//! reading uploaded files, providing a unified error handling mechanism for
//! every storage backend.

use thiserror::Error;

use crate::models::FileCategory;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{}", .category.rejection_message())]
    DisallowedExtension {
        category: FileCategory,
        extension: String,
    },

    #[error("File too large. Max size: {} MB", .max / (1024 * 1024))]
    TooLarge { size: usize, max: usize },

    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage I/O failure: {0}")]
    Io(#[from] std::io::Error),
}
