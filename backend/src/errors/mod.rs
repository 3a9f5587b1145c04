//! Global application error types and handlers.
//!
//! This module defines the error type returned by every handler and how it is
//! rendered: a JSON body `{"detail": "..."}` with the matching status code.
//! Server-side failures are logged and reported with a generic detail.

use axum::extract::multipart::MultipartError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(err) => err.status_code(),
            AppError::Storage(err) => match err {
                StorageError::DisallowedExtension { .. } | StorageError::TooLarge { .. } => {
                    StatusCode::BAD_REQUEST
                }
                StorageError::InvalidPath(_) => StatusCode::FORBIDDEN,
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Storage(StorageError::TooLarge { .. }) => "File too large".to_string(),
            AppError::Storage(StorageError::InvalidPath(_)) => "Invalid file path".to_string(),
            AppError::Storage(StorageError::NotFound(_)) => "File not found".to_string(),
            err if err.status_code().is_server_error() => "Internal server error".to_string(),
            err => err.to_string(),
        }
    }
}

/// Bodies over the upload limit surface as multipart errors while the file
/// field is being read; they are reported like any other oversized upload.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::BadRequest("File too large".to_string())
        } else {
            AppError::BadRequest(format!("Invalid multipart body: {}", err.body_text()))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let body = Json(json!({ "detail": self.detail() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::FileCategory;

    #[test]
    fn statuses() {
        assert_eq!(
            AppError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(AuthError::InvalidToken).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(StorageError::InvalidPath("..".into())).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::from(rusqlite::Error::QueryReturnedNoRows).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn details_hide_internals() {
        assert_eq!(
            AppError::from(rusqlite::Error::QueryReturnedNoRows).detail(),
            "Internal server error"
        );
        assert_eq!(
            AppError::from(StorageError::DisallowedExtension {
                category: FileCategory::ApplicationResume,
                extension: ".doc".into(),
            })
            .detail(),
            "Resume must be a PDF file"
        );
    }

    #[test]
    fn unauthorized_responses_challenge_for_bearer() {
        let response = AppError::from(AuthError::MissingCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }
}
