mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

fn grievance(title: &str, anonymous: bool) -> Value {
    json!({
        "title": title,
        "description": "Water leaking from the ceiling",
        "category": "HOSTEL",
        "priority": "HIGH",
        "location": "B10 Hostel",
        "is_anonymous": anonymous,
    })
}

fn titles(body: &Value) -> Vec<&str> {
    let mut titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["title"].as_str().unwrap())
        .collect();
    titles.sort_unstable();
    titles
}

#[tokio::test]
async fn submission_records_initial_update() {
    let app = TestApp::new().await;
    let student_id = app.register("ria@students.iitmandi.ac.in", "STUDENT", "Ria").await;
    let token = app.login("ria@students.iitmandi.ac.in").await;

    let created = app
        .post("/api/v1/grievances", &token, grievance("Leak", false))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "SUBMITTED");
    assert_eq!(created.body["submitter_id"], student_id.as_str());
    assert_eq!(created.body["submitter_name"], "Ria");
    assert_eq!(created.body["photos"], json!([]));
    let updates = created.body["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["status"], "SUBMITTED");

    let invalid = app
        .post(
            "/api/v1/grievances",
            &token,
            json!({
                "title": "Bad",
                "description": "x",
                "category": "WEATHER",
                "priority": "HIGH",
                "location": "Campus",
            }),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_grievances_hide_the_submitter() {
    let app = TestApp::new().await;
    app.register("ria@students.iitmandi.ac.in", "STUDENT", "Ria").await;
    let token = app.login("ria@students.iitmandi.ac.in").await;

    let created = app
        .post("/api/v1/grievances", &token, grievance("Ragging", true))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["is_anonymous"], true);
    assert!(created.body["submitter_id"].is_null());
    assert!(created.body["submitter_name"].is_null());
}

#[tokio::test]
async fn students_see_their_own_and_anonymous_grievances() {
    let app = TestApp::new().await;
    app.register("ria@students.iitmandi.ac.in", "STUDENT", "Ria").await;
    app.register("dev@students.iitmandi.ac.in", "STUDENT", "Dev").await;
    app.register("warden@iitmandi.ac.in", "AUTHORITY", "Warden").await;
    let ria = app.login("ria@students.iitmandi.ac.in").await;
    let dev = app.login("dev@students.iitmandi.ac.in").await;
    let warden = app.login("warden@iitmandi.ac.in").await;

    let private = app
        .post("/api/v1/grievances", &ria, grievance("Private", false))
        .await;
    let private_id = private.body["id"].as_str().unwrap().to_string();
    app.post("/api/v1/grievances", &ria, grievance("Anonymous", true))
        .await;
    app.post("/api/v1/grievances", &dev, grievance("Dev's", false))
        .await;

    let for_ria = app.get("/api/v1/grievances", &ria).await;
    assert_eq!(titles(&for_ria.body), vec!["Anonymous", "Private"]);

    let for_dev = app.get("/api/v1/grievances", &dev).await;
    assert_eq!(titles(&for_dev.body), vec!["Anonymous", "Dev's"]);

    let for_warden = app.get("/api/v1/grievances", &warden).await;
    assert_eq!(for_warden.body.as_array().unwrap().len(), 3);

    let forbidden = app
        .get(&format!("/api/v1/grievances/{private_id}"), &dev)
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.body["detail"], "Not authorized to view this grievance");

    let allowed = app
        .get(&format!("/api/v1/grievances/{private_id}"), &warden)
        .await;
    assert_eq!(allowed.status, StatusCode::OK);

    let missing = app.get("/api/v1/grievances/nope", &warden).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn authorities_move_grievances_through_statuses() {
    let app = TestApp::new().await;
    app.register("ria@students.iitmandi.ac.in", "STUDENT", "Ria").await;
    app.register("warden@iitmandi.ac.in", "AUTHORITY", "Warden").await;
    let ria = app.login("ria@students.iitmandi.ac.in").await;
    let warden = app.login("warden@iitmandi.ac.in").await;

    let created = app
        .post("/api/v1/grievances", &ria, grievance("Leak", false))
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();
    let updates_uri = format!("/api/v1/grievances/{id}/updates");

    let by_student = app
        .post(
            &updates_uri,
            &ria,
            json!({ "status": "RESOLVED", "remark": "fixed it myself" }),
        )
        .await;
    assert_eq!(by_student.status, StatusCode::FORBIDDEN);

    let bad_status = app
        .post(&updates_uri, &warden, json!({ "status": "DONE", "remark": "?" }))
        .await;
    assert_eq!(bad_status.status, StatusCode::BAD_REQUEST);

    let missing = app
        .post(
            "/api/v1/grievances/nope/updates",
            &warden,
            json!({ "status": "IN_PROGRESS", "remark": "on it" }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let updated = app
        .post(
            &updates_uri,
            &warden,
            json!({ "status": "IN_PROGRESS", "remark": "Plumber assigned" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["status"], "IN_PROGRESS");
    let updates = updated.body["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates
        .iter()
        .any(|u| u["remark"] == "Plumber assigned" && u["updated_by"]["name"] == "Warden"));

    let filtered = app
        .get("/api/v1/grievances?status=IN_PROGRESS", &warden)
        .await;
    assert_eq!(filtered.body.as_array().unwrap().len(), 1);
    let none = app.get("/api/v1/grievances?status=RESOLVED", &warden).await;
    assert!(none.body.as_array().unwrap().is_empty());
}
