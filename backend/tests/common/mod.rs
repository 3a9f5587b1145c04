//! Shared harness for the HTTP integration tests: an in-memory database, a
//! temporary upload directory and helpers for sending requests through the
//! router without a socket.

#![allow(dead_code)]

use std::sync::Arc;

use aegis_backend::config::Config;
use aegis_backend::database::models::{NewUser, UserRole};
use aegis_backend::database::{queries, Database};
use aegis_backend::{build_app, AppState};
use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use storage::LocalFileStore;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    _uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub raw: Vec<u8>,
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config {
            bcrypt_cost: 4,
            upload_dir: uploads.path().to_path_buf(),
            max_file_size: 1024,
            ..Config::default()
        };
        let db = Database::open_in_memory().unwrap();
        let files = LocalFileStore::open(uploads.path()).await.unwrap();
        let state = AppState::new(config, db, Arc::new(files));
        Self {
            router: build_app(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let raw = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        let body = serde_json::from_slice(&raw).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn upload(&self, uri: &str, token: &str, file_name: &str, contents: &[u8]) -> TestResponse {
        let boundary = "aegis-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Registers through the API and returns the new user's id.
    pub async fn register(&self, email: &str, role: &str, name: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "role": role,
                    "display_name": name,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_str().unwrap().to_string()
    }

    pub async fn login_pair(&self, email: &str) -> Value {
        let response = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body
    }

    pub async fn login(&self, email: &str) -> String {
        self.login_pair(email).await["access_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Admins cannot self-register, so they are inserted directly.
    pub async fn create_admin(&self, email: &str) -> String {
        let hash = self.state.auth.hash_password(PASSWORD).await.unwrap();
        let user = self
            .state
            .db
            .call(|conn| {
                queries::insert_user(
                    conn,
                    &NewUser {
                        email,
                        password_hash: &hash,
                        role: UserRole::Admin,
                        display_name: Some("Admin"),
                        department: None,
                        avatar_url: None,
                    },
                )
            })
            .await
            .unwrap();
        user.id
    }
}
