//! Handler functions for user profile and management API endpoints.
//!
//! These functions process requests for user data, interact with the database
//! and the auth service, and return user-specific information.

use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::info;

use super::models::{ActiveQuery, PasswordChange, ProfileUpdate, RoleQuery};
use crate::api::Pagination;
use crate::auth::service::email_matches_role;
use crate::auth::{require_role, CurrentUser, MessageResponse, UserResponse};
use crate::database::models::UserRole;
use crate::database::queries;
use crate::errors::{AppError, AppResult};
use crate::AppState;

const ADMIN_REQUIRED: &str = "Admin access required";

pub async fn get_me(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<UserResponse>> {
    let profile = state
        .db
        .call(|conn| queries::find_user(conn, &user.id))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(profile.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> AppResult<Json<UserResponse>> {
    let profile = state
        .db
        .call(|conn| {
            queries::update_profile(
                conn,
                &user.id,
                update.display_name.as_deref(),
                update.department.as_deref(),
                update.avatar_url.as_deref(),
            )
        })
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(profile.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<PasswordChange>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth
        .change_password(&state.db, &user.id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_role(&user, &[UserRole::Admin], ADMIN_REQUIRED)?;
    let users = state
        .db
        .call(|conn| queries::list_users(conn, pagination.page()))
        .await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn update_role(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<MessageResponse>> {
    require_role(&user, &[UserRole::Admin], ADMIN_REQUIRED)?;
    let role: UserRole = query.role.parse().map_err(|_| {
        AppError::bad_request(format!(
            "Invalid role. Must be one of: {}",
            UserRole::variants()
        ))
    })?;

    let target = state
        .db
        .call(|conn| queries::find_user(conn, &user_id))
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if !email_matches_role(&target.email, role) {
        let detail = match role {
            UserRole::Student => format!(
                "Cannot assign STUDENT role: {} is not a student email (@students.iitmandi.ac.in required)",
                target.email
            ),
            other => format!(
                "Cannot assign {} role: {} is not a staff email (@iitmandi.ac.in required)",
                other, target.email
            ),
        };
        return Err(AppError::BadRequest(detail));
    }

    state
        .db
        .call(|conn| queries::update_role(conn, &target.id, role))
        .await?;
    info!(admin = %user.id, user_id = %target.id, role = %role, "updated user role");
    Ok(Json(MessageResponse::new(format!("User role updated to {}", role))))
}

pub async fn set_active(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<String>,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<MessageResponse>> {
    require_role(&user, &[UserRole::Admin], ADMIN_REQUIRED)?;
    if user_id == user.id && !query.is_active {
        return Err(AppError::bad_request("Admins cannot deactivate their own account"));
    }

    let updated = state
        .db
        .call(|conn| queries::set_user_active(conn, &user_id, query.is_active))
        .await?;
    if !updated {
        return Err(AppError::not_found("User not found"));
    }

    info!(admin = %user.id, user_id = %user_id, is_active = query.is_active, "changed account status");
    let message = if query.is_active {
        "User activated"
    } else {
        "User deactivated"
    };
    Ok(Json(MessageResponse::new(message)))
}
