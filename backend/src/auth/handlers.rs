//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for user authentication (login, registration,
//! token refresh, logout), parse request data and delegate to `auth::service`
//! for the core business logic.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::models::{LoginRequest, MessageResponse, RefreshRequest, RegisterRequest, TokenPair, UserResponse};
use crate::errors::AppResult;
use crate::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = state.auth.register(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(state.auth.login(&state.db, request).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    Ok(Json(state.auth.refresh(&state.db, &request.refresh_token).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.auth.logout(&state.db, &request.refresh_token).await?;
    Ok(Json(MessageResponse::new("Successfully logged out")))
}
