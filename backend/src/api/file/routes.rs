//! Defines the HTTP routes for uploads and for serving stored files.

use axum::routing::{get, post};
use axum::Router;

use super::{handlers, upload_body_limit};
use crate::AppState;

pub fn file_router(max_file_size: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/grievances/:id/photos", post(handlers::upload_grievance_photo))
        .route("/courses/:id/resources", post(handlers::upload_course_resource))
        .route(
            "/opportunities/:opportunity_id/applications/:application_id/resume",
            post(handlers::upload_resume),
        )
        .route("/users/avatar", post(handlers::upload_avatar))
        .layer(upload_body_limit(max_file_size));

    Router::new()
        .route("/uploads/*path", get(handlers::serve_upload))
        .merge(uploads)
}
