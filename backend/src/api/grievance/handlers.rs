//! Handler functions for the grievance API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::models::{GrievanceCreate, GrievanceQuery, GrievanceResponse, GrievanceUpdateCreate};
use crate::api::lenient;
use crate::auth::{require_role, CurrentUser};
use crate::database::models::{GrievanceCategory, GrievanceStatus, NewGrievance, Priority, UserRole};
use crate::database::queries::{self, GrievanceFilter, Page};
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::AppState;

/// Loads a grievance with its update history.
async fn load_response(db: &Database, id: &str) -> AppResult<GrievanceResponse> {
    let (grievance, updates) = db
        .call(|conn| {
            let Some(grievance) = queries::find_grievance(conn, id)? else {
                return Ok(None);
            };
            let updates = queries::grievance_updates(conn, id)?;
            Ok::<_, rusqlite::Error>(Some((grievance, updates)))
        })
        .await?
        .ok_or_else(|| AppError::not_found("Grievance not found"))?;
    Ok(GrievanceResponse::new(grievance, updates))
}

/// Students see their own grievances plus anonymous ones.
fn can_view(user: &CurrentUser, submitter_id: Option<&str>, is_anonymous: bool) -> bool {
    !user.is(UserRole::Student) || is_anonymous || submitter_id == Some(user.id.as_str())
}

pub async fn create_grievance(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<GrievanceCreate>,
) -> AppResult<(StatusCode, Json<GrievanceResponse>)> {
    let category: GrievanceCategory = request
        .category
        .parse()
        .map_err(|err| AppError::BadRequest(format!("Invalid category or priority: {}", err)))?;
    let priority: Priority = request
        .priority
        .parse()
        .map_err(|err| AppError::BadRequest(format!("Invalid category or priority: {}", err)))?;

    let new = NewGrievance {
        submitter_id: (!request.is_anonymous).then_some(user.id.as_str()),
        category,
        priority,
        location: &request.location,
        title: &request.title,
        description: &request.description,
        is_anonymous: request.is_anonymous,
    };
    let id = state
        .db
        .call(|conn| -> rusqlite::Result<String> {
            let tx = conn.transaction()?;
            let id = queries::insert_grievance(&tx, &new, &user.id)?;
            tx.commit()?;
            Ok(id)
        })
        .await?;
    info!(grievance_id = %id, anonymous = request.is_anonymous, "grievance submitted");

    let response = load_response(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list_grievances(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<GrievanceQuery>,
) -> AppResult<Json<Vec<GrievanceResponse>>> {
    let restricted = user.is(UserRole::Student) || user.is(UserRole::Faculty);
    let filter = GrievanceFilter {
        status: lenient::<GrievanceStatus>(query.status.as_deref()),
        category: lenient::<GrievanceCategory>(query.category.as_deref()),
        visible_to: restricted.then_some(user.id.as_str()),
        page: Page::new(query.skip, query.limit),
    };

    let grievances = state
        .db
        .call(|conn| {
            queries::list_grievances(conn, &filter)?
                .into_iter()
                .map(|grievance| {
                    let updates = queries::grievance_updates(conn, &grievance.id)?;
                    Ok(GrievanceResponse::new(grievance, updates))
                })
                .collect::<rusqlite::Result<Vec<_>>>()
        })
        .await?;
    Ok(Json(grievances))
}

pub async fn get_grievance(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<GrievanceResponse>> {
    let response = load_response(&state.db, &id).await?;
    if !can_view(&user, response.submitter_id.as_deref(), response.is_anonymous) {
        return Err(AppError::forbidden("Not authorized to view this grievance"));
    }
    Ok(Json(response))
}

pub async fn add_update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<GrievanceUpdateCreate>,
) -> AppResult<Json<GrievanceResponse>> {
    require_role(
        &user,
        &[UserRole::Authority, UserRole::Admin],
        "Only authority or admin can update grievances",
    )?;

    let exists = state
        .db
        .call(|conn| queries::find_grievance(conn, &id))
        .await?
        .is_some();
    if !exists {
        return Err(AppError::not_found("Grievance not found"));
    }

    let status: GrievanceStatus = request.status.parse().map_err(|_| {
        AppError::BadRequest(format!(
            "Invalid status. Must be one of: {}",
            GrievanceStatus::variants()
        ))
    })?;

    state
        .db
        .call(|conn| -> rusqlite::Result<bool> {
            let tx = conn.transaction()?;
            let changed = queries::add_grievance_update(&tx, &id, &user.id, status, &request.remark)?;
            tx.commit()?;
            Ok(changed)
        })
        .await?;
    info!(grievance_id = %id, status = %status, updated_by = %user.id, "grievance updated");

    Ok(Json(load_response(&state.db, &id).await?))
}
