//! Integration Test: 登録・全削除API
//!
//! POST /api/register → レジストリ反映、POST /api/clear → 空

use crate::support::{build_app, get, post_json, StaticProber};
use axum::http::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn test_register_then_reregister_then_clear() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, body) = post_json(
        &app,
        "/api/register",
        r#"{"name":"Alice","ip":"10.0.0.5","port":"22","username":"alice"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "registered");
    assert_eq!(state.registry.list().await.len(), 1);

    let (status, body) = post_json(
        &app,
        "/api/register",
        r#"{"name":"Alice","ip":"10.0.0.5","port":"22","username":"alice2"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");
    let records = state.registry.list().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].username, "alice2");

    let (status, body) = post_json(&app, "/api/clear", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "success": true }));
    assert!(state.registry.list().await.is_empty());
}

#[tokio::test]
async fn test_register_missing_username_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, body) = post_json(&app, "/api/register", r#"{"name":"Alice","ip":"10.0.0.5"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "username is required");
    assert!(state.registry.list().await.is_empty());
}

#[tokio::test]
async fn test_register_malformed_json_is_rejected_with_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, body) = post_json(&app, "/api/register", "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    assert!(state.registry.list().await.is_empty());
}

#[tokio::test]
async fn test_register_defaults_port_and_persists_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, _) = post_json(
        &app,
        "/api/register",
        r#"{"name":"Bob","ip":"10.0.0.6","username":"bob"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let raw = std::fs::read_to_string(dir.path().join("endpoints.json")).unwrap();
    let persisted: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(persisted[0]["ip"], "10.0.0.6");
    assert_eq!(persisted[0]["port"], 22);
    assert_eq!(persisted[0]["online"], true);
    assert!(persisted[0]["lastSeen"].is_string());
}

#[tokio::test]
async fn test_store_write_failure_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();
    let (_state, app) = build_app(&blocker, Arc::new(StaticProber::new(&[])));

    let (status, body) = post_json(
        &app,
        "/api/register",
        r#"{"name":"Alice","ip":"10.0.0.5","username":"alice"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Failed to persist registry");

    let (status, body) = post_json(&app, "/api/clear", "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, _, body) = get(&app, "/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Not Found");
}
