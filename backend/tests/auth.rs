mod common;

use axum::http::{header, Method, StatusCode};
use common::{TestApp, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn root_and_health() {
    let app = TestApp::new().await;
    let root = app.request(Method::GET, "/", None, None).await;
    assert_eq!(root.status, StatusCode::OK);
    assert_eq!(root.body["status"], "operational");

    let health = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(health.body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn registration_rules() {
    let app = TestApp::new().await;
    let register = |email: &'static str, role: &'static str, password: &'static str| {
        let app = &app;
        async move {
            app.request(
                Method::POST,
                "/api/v1/auth/register",
                None,
                Some(json!({ "email": email, "password": password, "role": role })),
            )
            .await
        }
    };

    let admin = register("boss@iitmandi.ac.in", "ADMIN", PASSWORD).await;
    assert_eq!(admin.status, StatusCode::FORBIDDEN);

    let bad_role = register("x@iitmandi.ac.in", "JANITOR", PASSWORD).await;
    assert_eq!(bad_role.status, StatusCode::BAD_REQUEST);

    let student_domain = register("s@iitmandi.ac.in", "STUDENT", PASSWORD).await;
    assert_eq!(student_domain.status, StatusCode::BAD_REQUEST);
    assert!(student_domain.body["detail"]
        .as_str()
        .unwrap()
        .contains("@students.iitmandi.ac.in"));

    let staff_domain = register("f@students.iitmandi.ac.in", "FACULTY", PASSWORD).await;
    assert_eq!(staff_domain.status, StatusCode::BAD_REQUEST);

    let short = register("s@students.iitmandi.ac.in", "STUDENT", "short").await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let created = register("  New.Student@Students.IITMandi.ac.in ", "STUDENT", PASSWORD).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["email"], "new.student@students.iitmandi.ac.in");
    assert_eq!(created.body["role"], "STUDENT");
    assert!(created.body.get("password_hash").is_none());

    let duplicate = register("new.student@students.iitmandi.ac.in", "STUDENT", PASSWORD).await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.body["detail"], "Email already registered");
}

#[tokio::test]
async fn login_and_bearer_authentication() {
    let app = TestApp::new().await;
    app.register("ana@students.iitmandi.ac.in", "STUDENT", "Ana").await;

    let wrong = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "ana@students.iitmandi.ac.in", "password": "nope-nope" })),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body["detail"], "Invalid email or password");
    assert_eq!(wrong.headers[header::WWW_AUTHENTICATE], "Bearer");

    let pair = app.login_pair("ANA@students.iitmandi.ac.in").await;
    assert_eq!(pair["token_type"], "bearer");
    let access = pair["access_token"].as_str().unwrap();
    let refresh = pair["refresh_token"].as_str().unwrap();

    let me = app.get("/api/v1/users/me", access).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["display_name"], "Ana");

    let anonymous = app.request(Method::GET, "/api/v1/users/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["detail"], "Not authenticated");

    let garbage = app.get("/api/v1/users/me", "not-a-jwt").await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage.body["detail"], "Invalid or expired token");

    let refresh_as_access = app.get("/api/v1/users/me", refresh).await;
    assert_eq!(refresh_as_access.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_tokens_rotate_and_logout_revokes() {
    let app = TestApp::new().await;
    app.register("bo@students.iitmandi.ac.in", "STUDENT", "Bo").await;
    let pair = app.login_pair("bo@students.iitmandi.ac.in").await;
    let refresh = pair["refresh_token"].as_str().unwrap().to_string();

    let access_as_refresh = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": pair["access_token"] })),
        )
        .await;
    assert_eq!(access_as_refresh.status, StatusCode::UNAUTHORIZED);

    let rotated = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(rotated.status, StatusCode::OK);
    let next = rotated.body["refresh_token"].as_str().unwrap().to_string();

    let replay = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);

    let logout = app
        .request(
            Method::POST,
            "/api/v1/auth/logout",
            None,
            Some(json!({ "refresh_token": next })),
        )
        .await;
    assert_eq!(logout.status, StatusCode::OK);
    assert_eq!(logout.body["message"], "Successfully logged out");

    let after_logout = app
        .request(
            Method::POST,
            "/api/v1/auth/refresh",
            None,
            Some(json!({ "refresh_token": next })),
        )
        .await;
    assert_eq!(after_logout.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_and_password_changes() {
    let app = TestApp::new().await;
    app.register("cy@students.iitmandi.ac.in", "STUDENT", "Cy").await;
    let token = app.login("cy@students.iitmandi.ac.in").await;

    let updated = app
        .put("/api/v1/users/me", &token, json!({ "department": "Physics" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["department"], "Physics");
    assert_eq!(updated.body["display_name"], "Cy");

    let wrong = app
        .post(
            "/api/v1/users/me/change-password",
            &token,
            json!({ "current_password": "incorrect", "new_password": "another-pass" }),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong.body["detail"], "Current password is incorrect");

    let short = app
        .post(
            "/api/v1/users/me/change-password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "tiny" }),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);

    let changed = app
        .post(
            "/api/v1/users/me/change-password",
            &token,
            json!({ "current_password": PASSWORD, "new_password": "another-pass" }),
        )
        .await;
    assert_eq!(changed.status, StatusCode::OK);

    let old_login = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "cy@students.iitmandi.ac.in", "password": PASSWORD })),
        )
        .await;
    assert_eq!(old_login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_user_management() {
    let app = TestApp::new().await;
    app.create_admin("root@iitmandi.ac.in").await;
    let admin = app.login("root@iitmandi.ac.in").await;
    let faculty_id = app.register("prof@iitmandi.ac.in", "FACULTY", "Prof").await;
    let student_id = app.register("stu@students.iitmandi.ac.in", "STUDENT", "Stu").await;
    let student = app.login("stu@students.iitmandi.ac.in").await;

    let forbidden = app.get("/api/v1/users", &student).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["detail"], "Admin access required");

    let listed = app.get("/api/v1/users?limit=2", &admin).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body.as_array().unwrap().len(), 2);

    let invalid = app
        .request(
            Method::PUT,
            &format!("/api/v1/users/{faculty_id}/role?role=KING"),
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let wrong_domain = app
        .request(
            Method::PUT,
            &format!("/api/v1/users/{student_id}/role?role=AUTHORITY"),
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(wrong_domain.status, StatusCode::BAD_REQUEST);

    let missing = app
        .request(
            Method::PUT,
            "/api/v1/users/no-such-user/role?role=FACULTY",
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let promoted = app
        .request(
            Method::PUT,
            &format!("/api/v1/users/{faculty_id}/role?role=AUTHORITY"),
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["message"], "User role updated to AUTHORITY");

    let deactivated = app
        .request(
            Method::PUT,
            &format!("/api/v1/users/{student_id}/active?is_active=false"),
            Some(admin.as_str()),
            None,
        )
        .await;
    assert_eq!(deactivated.status, StatusCode::OK);

    let blocked = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "stu@students.iitmandi.ac.in", "password": PASSWORD })),
        )
        .await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);
}
