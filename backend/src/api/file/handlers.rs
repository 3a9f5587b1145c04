//! Handler functions for uploads and file serving.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use storage::{content_type_for, unique_file_name, FileCategory};
use tracing::info;

use super::models::{ResourceUploadQuery, UploadResponse};
use super::read_upload;
use crate::api::course::handlers::{find_course, require_course_manager};
use crate::auth::CurrentUser;
use crate::database::models::{NewResource, ResourceType};
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::AppState;

pub async fn upload_grievance_photo(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload = read_upload(multipart, FileCategory::GrievancePhoto, &state.uploads).await?;

    let grievance = state
        .db
        .call(|conn| queries::find_grievance(conn, &id))
        .await?
        .ok_or_else(|| AppError::not_found("Grievance not found"))?;
    if grievance.submitter_id.as_deref() != Some(user.id.as_str()) {
        return Err(AppError::forbidden(
            "Not authorized to upload photos for this grievance",
        ));
    }

    let file_name = unique_file_name(&upload.original_name);
    let stored = state
        .files
        .put(FileCategory::GrievancePhoto, &file_name, upload.contents)
        .await?;
    state
        .db
        .call(|conn| queries::add_grievance_photo(conn, &grievance.id, &stored.url))
        .await?;

    info!(store = state.files.kind(), grievance_id = %grievance.id, url = %stored.url, "grievance photo uploaded");
    Ok(Json(UploadResponse {
        message: "Photo uploaded successfully".to_string(),
        filename: Some(stored.file_name),
        url: stored.url,
        resource_id: None,
    }))
}

pub async fn upload_course_resource(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Query(query): Query<ResourceUploadQuery>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload = read_upload(multipart, FileCategory::CourseResource, &state.uploads).await?;

    let course = find_course(&state.db, &id).await?;
    require_course_manager(&user, &course)?;

    let file_name = unique_file_name(&upload.original_name);
    let stored = state
        .files
        .put(FileCategory::CourseResource, &file_name, upload.contents)
        .await?;

    let title = query
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or(upload.original_name);
    let new = NewResource {
        course_id: &course.id,
        uploader_id: &user.id,
        resource_type: ResourceType::Other,
        title: &title,
        year: None,
        exam_type: None,
        file_path: Some(stored.url.as_str()),
        tags: &[],
    };
    let resource = state
        .db
        .call(|conn| queries::insert_resource(conn, &new))
        .await?;

    info!(store = state.files.kind(), course_id = %course.id, resource_id = %resource.id, "course resource uploaded");
    Ok(Json(UploadResponse {
        message: "Resource uploaded successfully".to_string(),
        filename: Some(stored.file_name),
        url: stored.url,
        resource_id: Some(resource.id),
    }))
}

pub async fn upload_resume(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((opportunity_id, application_id)): Path<(String, String)>,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload = read_upload(multipart, FileCategory::ApplicationResume, &state.uploads).await?;

    let application = state
        .db
        .call(|conn| queries::find_application(conn, &application_id))
        .await?
        .filter(|application| application.opportunity_id == opportunity_id)
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    if application.student_id != user.id {
        return Err(AppError::forbidden(
            "Not authorized to upload resume for this application",
        ));
    }

    let file_name = unique_file_name(&upload.original_name);
    let stored = state
        .files
        .put(FileCategory::ApplicationResume, &file_name, upload.contents)
        .await?;
    state
        .db
        .call(|conn| queries::set_resume_path(conn, &application.id, &stored.url))
        .await?;

    info!(store = state.files.kind(), application_id = %application.id, "resume uploaded");
    Ok(Json(UploadResponse {
        message: "Resume uploaded successfully".to_string(),
        filename: Some(stored.file_name),
        url: stored.url,
        resource_id: None,
    }))
}

/// Avatars are stored under the user's id, so a new upload with the same
/// extension replaces the previous one.
pub async fn upload_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let upload = read_upload(multipart, FileCategory::UserAvatar, &state.uploads).await?;

    let file_name = format!("{}{}", user.id, upload.extension);
    let stored = state
        .files
        .put(FileCategory::UserAvatar, &file_name, upload.contents)
        .await?;
    state
        .db
        .call(|conn| queries::update_profile(conn, &user.id, None, None, Some(stored.url.as_str())))
        .await?;

    info!(store = state.files.kind(), user_id = %user.id, url = %stored.url, "avatar uploaded");
    Ok(Json(UploadResponse {
        message: "Avatar uploaded successfully".to_string(),
        filename: None,
        url: stored.url,
        resource_id: None,
    }))
}

/// Serves a stored file by its path relative to the upload root.
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> AppResult<impl IntoResponse> {
    let relative = path.trim_start_matches('/');
    let contents = state.files.read(relative).await?;
    Ok(([(header::CONTENT_TYPE, content_type_for(relative))], contents))
}
