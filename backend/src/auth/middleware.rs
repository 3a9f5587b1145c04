//! Middleware for protecting authenticated routes and handling authorization.
//!
//! `CurrentUser` is an extractor: any handler that takes it as an argument
//! requires a valid bearer access token. Role checks are plain functions the
//! handlers call once they know which rule applies.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::errors::AuthError;
use super::models::TokenKind;
use crate::database::models::UserRole;
use crate::errors::AppError;
use crate::AppState;

/// Identity carried by the access token of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn is_admin(&self) -> bool {
        self.is(UserRole::Admin)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(AuthError::MissingCredentials)?;

        let claims = state.auth.decode(token, TokenKind::Access)?;
        Ok(CurrentUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Fails with 403 and `message` unless the user has one of `allowed`.
pub fn require_role(user: &CurrentUser, allowed: &[UserRole], message: &str) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: "u1".to_string(),
            email: "u1@iitmandi.ac.in".to_string(),
            role,
        }
    }

    #[test]
    fn parses_bearer_headers() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[test]
    fn role_requirements() {
        let faculty = user(UserRole::Faculty);
        assert!(require_role(&faculty, &[UserRole::Faculty, UserRole::Admin], "no").is_ok());
        assert!(matches!(
            require_role(&faculty, &[UserRole::Admin], "Admin access required"),
            Err(AppError::Forbidden(msg)) if msg == "Admin access required"
        ));
        assert!(user(UserRole::Admin).is_admin());
    }
}
