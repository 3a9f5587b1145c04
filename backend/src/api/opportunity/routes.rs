//! Defines the HTTP routes for opportunities, applications and tasks.

use axum::routing::{get, post, put};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn opportunity_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_opportunities).post(handlers::create_opportunity),
        )
        .route("/my/applications", get(handlers::my_applications))
        .route("/my/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/my/tasks/:id",
            put(handlers::update_task).delete(handlers::delete_task),
        )
        .route(
            "/applications/:id/status",
            put(handlers::update_application_status),
        )
        .route("/:id", get(handlers::get_opportunity))
        .route("/:id/close", put(handlers::close_opportunity))
        .route("/:id/apply", post(handlers::apply))
        .route("/:id/applications", get(handlers::list_applications))
}
