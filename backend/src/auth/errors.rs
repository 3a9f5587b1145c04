//! Custom error types specific to authentication failures.
//!
//! This module defines a comprehensive set of errors that can occur during
//! authentication processes, together with the HTTP status each one maps to.

use axum::http::StatusCode;
use thiserror::Error;

use crate::database::models::UserRole;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not authenticated")]
    MissingCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid token type")]
    WrongTokenType,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is deactivated")]
    AccountDisabled,

    #[error("User not found or deactivated")]
    UserUnavailable,

    #[error("ADMIN role cannot be self-assigned. Contact an existing admin for role promotion.")]
    AdminSelfAssignment,

    #[error("Invalid role. Must be one of: {}", UserRole::variants())]
    InvalidRole,

    #[error("{}", domain_message(.0))]
    EmailDomain(UserRole),

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

fn domain_message(role: &UserRole) -> &'static str {
    match role {
        UserRole::Student => "Students must use @students.iitmandi.ac.in email addresses",
        _ => "Faculty, Authority, and Admin must use @iitmandi.ac.in email addresses",
    }
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::InvalidToken
            | AuthError::WrongTokenType
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidCredentials
            | AuthError::UserUnavailable => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled | AuthError::AdminSelfAssignment => StatusCode::FORBIDDEN,
            AuthError::InvalidRole
            | AuthError::EmailDomain(_)
            | AuthError::InvalidEmail
            | AuthError::WeakPassword(_)
            | AuthError::EmailTaken
            | AuthError::WrongPassword => StatusCode::BAD_REQUEST,
            AuthError::Hashing(_)
            | AuthError::Encoding(_)
            | AuthError::Task(_)
            | AuthError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountDisabled.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::EmailDomain(UserRole::Faculty).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn domain_messages_depend_on_role() {
        assert_eq!(
            AuthError::EmailDomain(UserRole::Student).to_string(),
            "Students must use @students.iitmandi.ac.in email addresses"
        );
        assert!(AuthError::EmailDomain(UserRole::Authority)
            .to_string()
            .contains("@iitmandi.ac.in"));
    }
}
