//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle endpoints like user login, registration, token refreshing
//! and logout. They are nested under `/api/v1/auth` by the main router.

use axum::routing::post;
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}
