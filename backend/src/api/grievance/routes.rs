//! Defines the HTTP routes for grievances.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::api::file;
use crate::AppState;

pub fn grievance_router(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_grievances).post(handlers::create_grievance))
        .route("/:id", get(handlers::get_grievance))
        .route("/:id/updates", post(handlers::add_update))
        .route(
            "/:id/photos",
            post(file::handlers::upload_grievance_photo).layer(file::upload_body_limit(max_file_size)),
        )
}
