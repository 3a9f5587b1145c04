//! Generic data models for the `storage` crate.
//!
//! These models describe what kind of file is being uploaded, which rules it
//! must satisfy, and where it ended up, independent of the backend that
//! actually holds the bytes.

use serde::Serialize;
use std::path::Path;

use crate::errors::StorageError;

pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

const GENERAL_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".jpg", ".jpeg", ".png", ".gif", ".mp4", ".zip",
];
const RESUME_EXTENSIONS: &[&str] = &[".pdf"];
const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];

/// The kinds of uploads the platform accepts. Each one maps to its own
/// directory below the store root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    GrievancePhoto,
    CourseResource,
    ApplicationResume,
    UserAvatar,
}

impl FileCategory {
    pub const ALL: [FileCategory; 4] = [
        FileCategory::GrievancePhoto,
        FileCategory::CourseResource,
        FileCategory::ApplicationResume,
        FileCategory::UserAvatar,
    ];

    pub fn directory(&self) -> &'static str {
        match self {
            FileCategory::GrievancePhoto => "grievances",
            FileCategory::CourseResource => "courses",
            FileCategory::ApplicationResume => "opportunities",
            FileCategory::UserAvatar => "avatars",
        }
    }

    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            FileCategory::GrievancePhoto | FileCategory::CourseResource => GENERAL_EXTENSIONS,
            FileCategory::ApplicationResume => RESUME_EXTENSIONS,
            FileCategory::UserAvatar => IMAGE_EXTENSIONS,
        }
    }

    pub fn rejection_message(&self) -> String {
        match self {
            FileCategory::ApplicationResume => "Resume must be a PDF file".to_string(),
            FileCategory::UserAvatar => "Avatar must be an image file (jpg, png, gif)".to_string(),
            _ => format!(
                "File type not allowed. Allowed: {}",
                self.allowed_extensions().join(", ")
            ),
        }
    }
}

/// Where an accepted upload was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub category: FileCategory,
    pub file_name: String,
    /// Path below the store root, always using `/` separators.
    pub relative_path: String,
    /// Public URL the file is served from.
    pub url: String,
    pub size: usize,
}

impl StoredFile {
    pub fn new(category: FileCategory, file_name: &str, size: usize) -> Self {
        let relative_path = format!("{}/{}", category.directory(), file_name);
        Self {
            category,
            file_name: file_name.to_string(),
            url: format!("/uploads/{}", relative_path),
            relative_path,
            size,
        }
    }
}

/// Validation rules applied to an upload before it reaches a backend.
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub max_file_size: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl UploadPolicy {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Checks the extension of `original_name` against the category. Done
    /// before the body is read so rejected uploads cost nothing.
    pub fn check_extension(
        &self,
        category: FileCategory,
        original_name: &str,
    ) -> Result<String, StorageError> {
        let extension = extension_of(original_name);
        if category.allowed_extensions().contains(&extension.as_str()) {
            Ok(extension)
        } else {
            Err(StorageError::DisallowedExtension {
                category,
                extension,
            })
        }
    }

    pub fn check_size(&self, size: usize) -> Result<(), StorageError> {
        if size > self.max_file_size {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_file_size,
            });
        }
        Ok(())
    }
}

/// Lower-cased extension including the leading dot, or an empty string.
pub fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// A collision-free name for an upload that keeps the original extension.
pub fn unique_file_name(original_name: &str) -> String {
    format!("{}{}", uuid::Uuid::new_v4(), extension_of(original_name))
}

pub fn content_type_for(path: &str) -> &'static str {
    match extension_of(path).as_str() {
        ".pdf" => "application/pdf",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".png" => "image/png",
        ".gif" => "image/gif",
        ".mp4" => "video/mp4",
        ".zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        let policy = UploadPolicy::default();
        assert_eq!(
            policy
                .check_extension(FileCategory::GrievancePhoto, "Leak.JPG")
                .unwrap(),
            ".jpg"
        );
    }

    #[test]
    fn resumes_must_be_pdf() {
        let policy = UploadPolicy::default();
        let err = policy
            .check_extension(FileCategory::ApplicationResume, "cv.docx")
            .unwrap_err();
        assert_eq!(err.to_string(), "Resume must be a PDF file");
        assert!(policy
            .check_extension(FileCategory::ApplicationResume, "cv.pdf")
            .is_ok());
    }

    #[test]
    fn avatars_must_be_images() {
        let policy = UploadPolicy::default();
        assert!(policy
            .check_extension(FileCategory::UserAvatar, "me.pdf")
            .is_err());
        assert!(policy
            .check_extension(FileCategory::UserAvatar, "me.png")
            .is_ok());
    }

    #[test]
    fn files_without_extension_are_rejected() {
        let policy = UploadPolicy::default();
        assert!(policy
            .check_extension(FileCategory::CourseResource, "Makefile")
            .is_err());
    }

    #[test]
    fn size_limit_is_inclusive() {
        let policy = UploadPolicy::new(10);
        assert!(policy.check_size(10).is_ok());
        assert!(matches!(
            policy.check_size(11),
            Err(StorageError::TooLarge { size: 11, max: 10 })
        ));
    }

    #[test]
    fn unique_names_keep_extension() {
        let a = unique_file_name("notes.PDF");
        let b = unique_file_name("notes.PDF");
        assert!(a.ends_with(".pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn stored_file_urls_live_under_uploads() {
        let stored = StoredFile::new(FileCategory::UserAvatar, "abc.png", 3);
        assert_eq!(stored.relative_path, "avatars/abc.png");
        assert_eq!(stored.url, "/uploads/avatars/abc.png");
    }
}
