//! HTTP-level behavior through the full router, backed by the file store in a
//! temporary directory.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use campus_api::{common_routes, resource_routes, AppState, JsonFileStore, Registry};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

async fn test_app() -> (Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(Registry::builtin());
    let store = JsonFileStore::open(dir.path(), &registry).await.unwrap();
    let state = AppState {
        store: Arc::new(store),
        registry,
    };
    let app = Router::new()
        .merge(common_routes(state.clone()))
        .merge(resource_routes(state));
    (app, dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn event_body() -> Value {
    json!({
        "description": "Staff sync",
        "date": "2024-05-20T14:30:00Z",
        "comments": "Q2 goals"
    })
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let (app, _dir) = test_app().await;
    let (status, created) = send(&app, "POST", "/events", Some(event_body())).await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap();
    assert!(!id.is_empty());
    assert_eq!(created["description"], "Staff sync");

    let (status, fetched) = send(&app, "GET", &format!("/events/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_assigns_unique_ids() {
    let (app, _dir) = test_app().await;
    let (_, first) = send(&app, "POST", "/events", Some(event_body())).await;
    let (_, second) = send(&app, "POST", "/events", Some(event_body())).await;
    assert_ne!(first["id"], second["id"]);
}

#[tokio::test]
async fn missing_field_is_rejected_with_no_partial_write() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/events",
        Some(json!({"description": "Staff sync", "comments": "Q2 goals"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation_error");
    assert_eq!(body["message"], "date is required");

    let (_, records) = send(&app, "GET", "/events", None).await;
    assert_eq!(records, json!([]));
}

#[tokio::test]
async fn blank_string_fields_are_rejected() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/students",
        Some(json!({"name": "  ", "age": 14, "phone": "555", "active": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn active_false_is_a_present_value() {
    let (app, _dir) = test_app().await;
    let (status, created) = send(
        &app,
        "POST",
        "/teachers",
        Some(json!({
            "name": "Ana Ribeiro",
            "subjects": "Mathematics",
            "email": "ana@school.example",
            "phone": "555-0101",
            "active": false
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["active"], false);
}

#[tokio::test]
async fn update_unknown_id_is_404_and_collection_unchanged() {
    let (app, _dir) = test_app().await;
    let (_, created) = send(&app, "POST", "/events", Some(event_body())).await;

    let (status, body) = send(&app, "PUT", "/events/does-not-exist", Some(event_body())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");

    let (_, records) = send(&app, "GET", "/events", None).await;
    assert_eq!(records, json!([created]));
}

#[tokio::test]
async fn update_replaces_whole_record_but_keeps_the_path_id() {
    let (app, _dir) = test_app().await;
    let (_, created) = send(&app, "POST", "/events", Some(event_body())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, updated) = send(
        &app,
        "PUT",
        &format!("/events/{}", id),
        Some(json!({
            "id": "smuggled-id",
            "description": "Rescheduled staff sync",
            "date": "2024-05-27T14:30:00Z",
            "comments": "moved a week out"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["description"], "Rescheduled staff sync");

    let (_, fetched) = send(&app, "GET", &format!("/events/{}", id), None).await;
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn delete_removes_exactly_one_and_second_delete_misses() {
    let (app, _dir) = test_app().await;
    let (_, first) = send(&app, "POST", "/events", Some(event_body())).await;
    let (_, second) = send(&app, "POST", "/events", Some(event_body())).await;
    let first_id = first["id"].as_str().unwrap();

    let (status, removed) = send(&app, "DELETE", &format!("/events/{}", first_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(removed, first);

    let (_, records) = send(&app, "GET", "/events", None).await;
    assert_eq!(records, json!([second]));

    let (status, _) = send(&app, "DELETE", &format!("/events/{}", first_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_matches_case_insensitive_substring() {
    let (app, _dir) = test_app().await;
    for (name, age) in [("Ana Souza", 14), ("Bruno Lima", 15)] {
        let (status, _) = send(
            &app,
            "POST",
            "/students",
            Some(json!({"name": name, "age": age, "phone": "555", "active": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, hits) = send(&app, "GET", "/students/search/souza", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);
    assert_eq!(hits[0]["name"], "Ana Souza");

    let (status, hits) = send(&app, "GET", "/students/search/nobody", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits, json!([]));
}

#[tokio::test]
async fn appointments_reference_people_by_free_text_name() {
    let (app, _dir) = test_app().await;
    // No referential check: the student named here was never created.
    let (status, created) = send(
        &app,
        "POST",
        "/appointments",
        Some(json!({
            "specialty": "Speech therapy",
            "comments": "first session",
            "date": "2024-06-03T09:00:00Z",
            "student": "Ana Souza",
            "professional": "Dr. Paula Mendes"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["student"], "Ana Souza");

    let (_, hits) = send(&app, "GET", "/appointments/search/ana", None).await;
    assert_eq!(hits.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn user_password_is_stored_but_never_returned() {
    let (app, _dir) = test_app().await;
    let user = json!({
        "name": "Clara Dias",
        "email": "clara@school.example",
        "username": "cdias",
        "level": "admin",
        "password": "plaintext-as-shipped",
        "active": true
    });
    let (status, created) = send(&app, "POST", "/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(created.get("password").is_none());

    let id = created["id"].as_str().unwrap();
    let (_, fetched) = send(&app, "GET", &format!("/users/{}", id), None).await;
    assert!(fetched.get("password").is_none());
    assert_eq!(fetched, created);

    // Still required on create.
    let mut missing = user.as_object().unwrap().clone();
    missing.remove("password");
    let (status, body) = send(&app, "POST", "/users", Some(Value::Object(missing))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "password is required");
}

#[tokio::test]
async fn unknown_resource_segment_is_404() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, "GET", "/grades", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn non_object_body_is_a_bad_request() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, "POST", "/events", Some(json!(["not", "an", "object"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn common_routes_respond() {
    let (app, _dir) = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "ok");

    let (status, body) = send(&app, "GET", "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "campus-api");
}
