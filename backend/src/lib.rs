//! AEGIS platform backend.
//!
//! Wires configuration, persistence, authentication and the domain APIs into
//! a single Axum router. The `aegis` binary in `main.rs` is a thin CLI around
//! this library; integration tests drive [`build_app`] directly.

pub mod api;
pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod middleware;
pub mod services;

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use storage::{FileStore, UploadPolicy};

use crate::auth::AuthService;
use crate::config::Config;
use crate::database::Database;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Database>,
    pub auth: Arc<AuthService>,
    pub files: Arc<dyn FileStore>,
    pub uploads: UploadPolicy,
}

impl AppState {
    pub fn new(config: Config, db: Database, files: Arc<dyn FileStore>) -> Self {
        let auth = AuthService::new(&config);
        let uploads = UploadPolicy::new(config.max_file_size);
        Self {
            config: Arc::new(config),
            db: Arc::new(db),
            auth: Arc::new(auth),
            files,
            uploads,
        }
    }
}

/// Builds the complete HTTP application.
pub fn build_app(state: AppState) -> Router {
    let max_file_size = state.config.max_file_size;
    let api = Router::new()
        .nest("/auth", auth::auth_router())
        .nest("/users", api::user::routes::user_router())
        .nest("/grievances", api::grievance::routes::grievance_router(max_file_size))
        .nest("/courses", api::course::routes::course_router())
        .nest("/opportunities", api::opportunity::routes::opportunity_router())
        .nest("/files", api::file::routes::file_router(max_file_size));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/uploads/*path", get(api::file::handlers::serve_upload))
        .nest("/api/v1", api)
        .layer(middleware::cors_layer(&state.config))
        .layer(middleware::trace_layer())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to AEGIS Platform API",
        "version": VERSION,
        "status": "operational",
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
