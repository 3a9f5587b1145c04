//! Handler functions for the academics API.
//!
//! Course details are restricted to the professor, enrolled students and
//! admins. Resources and calendar events can only be added by the professor
//! of the course or an admin.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::models::{
    CalendarEventCreate, CalendarEventResponse, CourseCreate, CourseQuery, CourseResponse,
    EnrollmentResponse, ResourceCreate, ResourceQuery, ResourceResponse,
};
use crate::api::lenient;
use crate::auth::{require_role, CurrentUser, MessageResponse};
use crate::database::models::{Course, NewCalendarEvent, NewCourse, NewResource, ResourceType, UserRole};
use crate::database::queries::{self, CourseFilter, Page};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::AppState;

pub(crate) async fn find_course(db: &Database, id: &str) -> AppResult<Course> {
    db.call(|conn| queries::find_course(conn, id))
        .await?
        .ok_or_else(|| AppError::not_found("Course not found"))
}

pub(crate) fn is_professor(user: &CurrentUser, course: &Course) -> bool {
    course.professor_id.as_deref() == Some(user.id.as_str())
}

/// Only the professor of the course or an admin may add material to it.
pub(crate) fn require_course_manager(user: &CurrentUser, course: &Course) -> AppResult<()> {
    if is_professor(user, course) || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Only the course professor can upload resources"))
    }
}

pub async fn list_courses(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<CourseQuery>,
) -> AppResult<Json<Vec<CourseResponse>>> {
    let filter = CourseFilter {
        department: query.department.as_deref().filter(|d| !d.is_empty()),
        semester: query.semester.as_deref().filter(|s| !s.is_empty()),
        page: Page::new(query.skip, query.limit),
    };
    let courses = state
        .db
        .call(|conn| queries::list_courses(conn, &filter))
        .await?;
    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

pub async fn create_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CourseCreate>,
) -> AppResult<(StatusCode, Json<CourseResponse>)> {
    require_role(
        &user,
        &[UserRole::Faculty, UserRole::Admin],
        "Only faculty or admin can create courses",
    )?;

    let new = NewCourse {
        code: &request.code,
        name: &request.name,
        credits: request.credits,
        semester: &request.semester,
        professor_id: user.is(UserRole::Faculty).then_some(user.id.as_str()),
        department: &request.department,
        description: request.description.as_deref(),
    };
    let course = state
        .db
        .call(|conn| {
            if queries::course_code_exists(conn, new.code)? {
                return Ok(None);
            }
            queries::insert_course(conn, &new).map(Some)
        })
        .await?
        .ok_or_else(|| AppError::bad_request("Course code already exists"))?;

    info!(course_id = %course.id, code = %course.code, "course created");
    Ok((StatusCode::CREATED, Json(course.into())))
}

pub async fn get_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CourseResponse>> {
    let course = find_course(&state.db, &id).await?;

    let enrolled = user.is(UserRole::Student)
        && state
            .db
            .call(|conn| queries::is_enrolled(conn, &user.id, &course.id))
            .await?;
    if !(is_professor(&user, &course) || enrolled || user.is_admin()) {
        return Err(AppError::forbidden(
            "You must be enrolled in this course to view details",
        ));
    }
    Ok(Json(course.into()))
}

pub async fn enroll(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    require_role(&user, &[UserRole::Student], "Only students can enroll in courses")?;
    let course = find_course(&state.db, &id).await?;

    let enrolled = state
        .db
        .call(|conn| {
            if queries::is_enrolled(conn, &user.id, &course.id)? {
                return Ok(false);
            }
            queries::insert_enrollment(conn, &user.id, &course).map(|_| true)
        })
        .await?;
    if !enrolled {
        return Err(AppError::bad_request("Already enrolled in this course"));
    }

    info!(course_id = %course.id, student_id = %user.id, "student enrolled");
    Ok(Json(MessageResponse::new("Successfully enrolled in course")))
}

pub async fn my_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<EnrollmentResponse>>> {
    let enrollments = state
        .db
        .call(|conn| queries::enrollments_for_student(conn, &user.id))
        .await?;
    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from).collect()))
}

pub async fn list_resources(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ResourceQuery>,
) -> AppResult<Json<Vec<ResourceResponse>>> {
    let resource_type = lenient::<ResourceType>(query.resource_type.as_deref());
    let resources = state
        .db
        .call(|conn| queries::list_resources(conn, &id, resource_type))
        .await?;
    Ok(Json(resources.into_iter().map(ResourceResponse::from).collect()))
}

pub async fn create_resource(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ResourceCreate>,
) -> AppResult<(StatusCode, Json<ResourceResponse>)> {
    let course = find_course(&state.db, &id).await?;
    require_course_manager(&user, &course)?;

    let resource_type: ResourceType = request.resource_type.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid resource type. Must be one of: {}",
            ResourceType::variants()
        ))
    })?;

    let new = NewResource {
        course_id: &course.id,
        uploader_id: &user.id,
        resource_type,
        title: &request.title,
        year: request.year,
        exam_type: request.exam_type.as_deref(),
        file_path: None,
        tags: &request.tags,
    };
    let resource = state
        .db
        .call(|conn| queries::insert_resource(conn, &new))
        .await?;

    info!(course_id = %course.id, resource_id = %resource.id, "resource added");
    Ok((StatusCode::CREATED, Json(resource.into())))
}

pub async fn list_calendar(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<CalendarEventResponse>>> {
    let events = state
        .db
        .call(|conn| queries::list_calendar_events(conn, &id))
        .await?;
    Ok(Json(events.into_iter().map(CalendarEventResponse::from).collect()))
}

pub async fn create_calendar_event(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<CalendarEventCreate>,
) -> AppResult<(StatusCode, Json<CalendarEventResponse>)> {
    let course = find_course(&state.db, &id).await?;
    if !(is_professor(&user, &course) || user.is_admin()) {
        return Err(AppError::forbidden(
            "Only the course professor can add calendar events",
        ));
    }
    if matches!(request.end_date, Some(end) if end < request.start_date) {
        return Err(AppError::bad_request("End date must not be before start date"));
    }

    let new = NewCalendarEvent {
        course_id: Some(course.id.as_str()),
        title: &request.title,
        description: request.description.as_deref(),
        event_type: &request.event_type,
        start_date: request.start_date,
        end_date: request.end_date,
        created_by: &user.id,
    };
    let event = state
        .db
        .call(|conn| queries::insert_calendar_event(conn, &new))
        .await?;

    info!(course_id = %course.id, event_id = %event.id, "calendar event added");
    Ok((StatusCode::CREATED, Json(event.into())))
}
