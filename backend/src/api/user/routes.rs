//! Defines the HTTP routes for user profiles and account management.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        .route("/me/change-password", post(handlers::change_password))
        .route("/:id/role", put(handlers::update_role))
        .route("/:id/active", put(handlers::set_active))
}
