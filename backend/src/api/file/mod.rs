//! Module for file uploads and serving uploaded files.
//!
//! Uploads arrive as `multipart/form-data` with a single `file` field. They
//! are validated against the category's extension list and the configured
//! size limit, then handed to the `storage::FileStore` in the app state.

pub mod handlers;
pub mod models;
pub mod routes;

use axum::extract::multipart::Multipart;
use axum::extract::DefaultBodyLimit;
use bytes::Bytes;
use storage::{FileCategory, UploadPolicy};
use tracing::debug;

use crate::errors::{AppError, AppResult};

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Request body limit for upload routes.
pub fn upload_body_limit(max_file_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_file_size.saturating_add(MULTIPART_OVERHEAD))
}

/// A validated file taken from a multipart body.
#[derive(Debug)]
pub struct Upload {
    pub original_name: String,
    /// Lower-cased, with the leading dot.
    pub extension: String,
    pub contents: Bytes,
}

/// Reads the `file` field. The extension is checked before the body so a
/// rejected type is reported without buffering the upload.
pub async fn read_upload(
    mut multipart: Multipart,
    category: FileCategory,
    policy: &UploadPolicy,
) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let extension = policy.check_extension(category, &original_name)?;
        let contents = field.bytes().await?;
        policy.check_size(contents.len())?;
        debug!(name = %original_name, size = contents.len(), ?category, "received upload");
        return Ok(Upload {
            original_name,
            extension,
            contents,
        });
    }
    Err(AppError::bad_request("No file uploaded"))
}
