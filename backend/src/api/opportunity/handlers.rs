//! Handler functions for the opportunities API.
//!
//! Opportunities are posted by faculty or authority users and managed by
//! their owner (or an admin). Students apply once per opportunity while it is
//! open and before its deadline. Tasks are private to the user who owns them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use tracing::info;

use super::models::{
    ApplicationCreate, ApplicationResponse, ApplicationStatusUpdate, OpportunityCreate,
    OpportunityQuery, OpportunityResponse, TaskCreate, TaskQuery, TaskResponse, TaskUpdate,
};
use crate::api::lenient;
use crate::auth::{require_role, CurrentUser, MessageResponse};
use crate::database::models::{
    ApplicationStatus, NewOpportunity, NewTask, Opportunity, OpportunityType, TaskChanges,
    TaskStatus, UserRole,
};
use crate::database::queries::{self, OpportunityFilter, Page};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::AppState;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

async fn find_opportunity(db: &Database, id: &str) -> AppResult<Opportunity> {
    db.call(|conn| queries::find_opportunity(conn, id))
        .await?
        .ok_or_else(|| AppError::not_found("Opportunity not found"))
}

fn is_owner_or_admin(user: &CurrentUser, owner_id: &str) -> bool {
    user.id == owner_id || user.is_admin()
}

pub async fn list_opportunities(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<OpportunityQuery>,
) -> AppResult<Json<Vec<OpportunityResponse>>> {
    let filter = OpportunityFilter {
        is_open: Some(query.is_open),
        deadline_from: today(),
        skills: query.skill_list(),
        page: Page::new(query.skip, query.limit),
    };
    let opportunities = state
        .db
        .call(|conn| queries::list_opportunities(conn, &filter))
        .await?;
    Ok(Json(
        opportunities.into_iter().map(OpportunityResponse::from).collect(),
    ))
}

pub async fn create_opportunity(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<OpportunityCreate>,
) -> AppResult<(StatusCode, Json<OpportunityResponse>)> {
    require_role(
        &user,
        &[UserRole::Faculty, UserRole::Authority],
        "Only faculty and authority can create opportunities",
    )?;
    let opportunity_type: OpportunityType = request.opportunity_type.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid opportunity type. Must be one of: {}",
            OpportunityType::variants()
        ))
    })?;
    if request.deadline < today() {
        return Err(AppError::bad_request("Deadline must be in the future"));
    }

    let new = NewOpportunity {
        faculty_id: &user.id,
        title: &request.title,
        description: &request.description,
        opportunity_type,
        skills: &request.skills,
        duration: &request.duration,
        stipend: request.stipend.as_deref(),
        deadline: request.deadline,
    };
    let opportunity = state
        .db
        .call(|conn| queries::insert_opportunity(conn, &new))
        .await?;

    info!(opportunity_id = %opportunity.id, owner = %user.id, "opportunity posted");
    Ok((StatusCode::CREATED, Json(opportunity.into())))
}

pub async fn get_opportunity(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OpportunityResponse>> {
    Ok(Json(find_opportunity(&state.db, &id).await?.into()))
}

pub async fn close_opportunity(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let opportunity = find_opportunity(&state.db, &id).await?;
    if !is_owner_or_admin(&user, &opportunity.faculty_id) {
        return Err(AppError::forbidden("Not authorized to close this opportunity"));
    }

    state
        .db
        .call(|conn| queries::close_opportunity(conn, &opportunity.id))
        .await?;
    info!(opportunity_id = %opportunity.id, "opportunity closed");
    Ok(Json(MessageResponse::new("Opportunity closed successfully")))
}

pub async fn apply(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ApplicationCreate>,
) -> AppResult<(StatusCode, Json<ApplicationResponse>)> {
    require_role(
        &user,
        &[UserRole::Student],
        "Only students can apply to opportunities",
    )?;
    let opportunity = find_opportunity(&state.db, &id).await?;
    if !opportunity.is_open {
        return Err(AppError::bad_request("This opportunity is closed"));
    }
    if opportunity.deadline < today() {
        return Err(AppError::bad_request("Application deadline has passed"));
    }

    let application = state
        .db
        .call(|conn| {
            if queries::has_applied(conn, &opportunity.id, &user.id)? {
                return Ok(None);
            }
            queries::insert_application(conn, &opportunity.id, &user.id, &request.cover_letter)
                .map(Some)
        })
        .await?
        .ok_or_else(|| AppError::bad_request("Already applied to this opportunity"))?;

    info!(opportunity_id = %opportunity.id, student_id = %user.id, "application submitted");
    Ok((StatusCode::CREATED, Json(application.into())))
}

pub async fn list_applications(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<ApplicationResponse>>> {
    let opportunity = find_opportunity(&state.db, &id).await?;
    if !is_owner_or_admin(&user, &opportunity.faculty_id) {
        return Err(AppError::forbidden("Not authorized to view applications"));
    }

    let applications = state
        .db
        .call(|conn| queries::applications_for_opportunity(conn, &opportunity.id))
        .await?;
    Ok(Json(
        applications.into_iter().map(ApplicationResponse::from).collect(),
    ))
}

pub async fn update_application_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<ApplicationStatusUpdate>,
) -> AppResult<Json<ApplicationResponse>> {
    let application = state
        .db
        .call(|conn| queries::find_application(conn, &id))
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    if !is_owner_or_admin(&user, &application.opportunity_owner_id) {
        return Err(AppError::forbidden(
            "Not authorized to update application status",
        ));
    }

    let status: ApplicationStatus = request.status.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid status. Must be one of: {}",
            ApplicationStatus::variants()
        ))
    })?;

    let updated = state
        .db
        .call(|conn| queries::set_application_status(conn, &application.id, status))
        .await?
        .ok_or_else(|| AppError::not_found("Application not found"))?;
    info!(application_id = %updated.id, status = %status, "application status changed");
    Ok(Json(updated.into()))
}

pub async fn my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ApplicationResponse>>> {
    let applications = state
        .db
        .call(|conn| queries::applications_for_student(conn, &user.id))
        .await?;
    Ok(Json(
        applications.into_iter().map(ApplicationResponse::from).collect(),
    ))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<TaskQuery>,
) -> AppResult<Json<Vec<TaskResponse>>> {
    let status = lenient::<TaskStatus>(query.status.as_deref());
    let tasks = state
        .db
        .call(|conn| queries::list_tasks(conn, &user.id, status))
        .await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub async fn create_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<TaskCreate>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let new = NewTask {
        student_id: &user.id,
        title: &request.title,
        description: request.description.as_deref(),
        category: &request.category,
        deadline: request.deadline,
    };
    let task = state.db.call(|conn| queries::insert_task(conn, &new)).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

fn task_changes(update: TaskUpdate) -> AppResult<TaskChanges> {
    let status = update
        .status
        .map(|status| status.parse::<TaskStatus>())
        .transpose()
        .map_err(|_| {
            AppError::BadRequest(format!(
                "Invalid status. Must be one of: {}",
                TaskStatus::variants()
            ))
        })?;
    Ok(TaskChanges {
        title: update.title,
        description: update.description,
        status,
        progress: update.progress.map(|progress| progress.clamp(0, 100)),
    })
}

pub async fn update_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<TaskUpdate>,
) -> AppResult<Json<TaskResponse>> {
    let exists = state
        .db
        .call(|conn| queries::find_task(conn, &id, &user.id))
        .await?
        .is_some();
    if !exists {
        return Err(AppError::not_found("Task not found"));
    }

    let changes = task_changes(request)?;
    let task = state
        .db
        .call(|conn| queries::update_task(conn, &id, &user.id, &changes))
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    Ok(Json(task.into()))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = state
        .db
        .call(|conn| queries::delete_task(conn, &id, &user.id))
        .await?;
    if !deleted {
        return Err(AppError::not_found("Task not found"));
    }
    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_progress_is_clamped() {
        let changes = task_changes(TaskUpdate {
            progress: Some(150),
            ..TaskUpdate::default()
        })
        .unwrap();
        assert_eq!(changes.progress, Some(100));

        let changes = task_changes(TaskUpdate {
            progress: Some(-5),
            status: Some("COMPLETED".to_string()),
            ..TaskUpdate::default()
        })
        .unwrap();
        assert_eq!(changes.progress, Some(0));
        assert_eq!(changes.status, Some(TaskStatus::Completed));
    }

    #[test]
    fn task_status_must_be_known() {
        let err = task_changes(TaskUpdate {
            status: Some("DONE".to_string()),
            ..TaskUpdate::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
