//! Defines the HTTP routes for courses and their resources and calendar.

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::AppState;

pub fn course_router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_courses).post(handlers::create_course))
        .route("/my/enrollments", get(handlers::my_enrollments))
        .route("/:id", get(handlers::get_course))
        .route("/:id/enroll", post(handlers::enroll))
        .route(
            "/:id/resources",
            get(handlers::list_resources).post(handlers::create_resource),
        )
        .route(
            "/:id/calendar",
            get(handlers::list_calendar).post(handlers::create_calendar_event),
        )
}
