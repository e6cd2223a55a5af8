//! Integration Test: ダッシュボード
//!
//! GET / → 全ホストをプローブ → HTML描画

use crate::support::{build_app, get, post_json, StaticProber};
use axum::http::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn test_dashboard_empty_state() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&[])));

    let (status, content_type, html) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(html.contains("No Hosts Registered Yet"));
    assert!(html.contains("http://192.168.1.10:8080/register"));
}

#[tokio::test]
async fn test_dashboard_shows_fresh_status() {
    let dir = tempfile::tempdir().unwrap();
    let (state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&["10.0.0.5"])));

    post_json(
        &app,
        "/api/register",
        r#"{"name":"Alice","ip":"10.0.0.5","port":"22","username":"alice"}"#,
    )
    .await;
    post_json(
        &app,
        "/api/register",
        r#"{"name":"Bob","ip":"10.0.0.6","port":2222,"username":"bob"}"#,
    )
    .await;

    let (status, _, html) = get(&app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<strong>Alice</strong>"));
    assert!(html.contains("<strong>Bob</strong>"));
    assert!(html.contains("ssh -p 2222 bob@10.0.0.6"));
    assert_eq!(html.matches("🟢 Online").count(), 1);
    assert_eq!(html.matches("🔴 Offline").count(), 1);

    // 表示のたびにプローブ結果が永続化される
    let records = state.registry.list().await;
    let bob = records.iter().find(|r| r.ip == "10.0.0.6").unwrap();
    assert!(!bob.online);
}

#[tokio::test]
async fn test_endpoints_api_returns_counts() {
    let dir = tempfile::tempdir().unwrap();
    let (_state, app) = build_app(dir.path(), Arc::new(StaticProber::new(&["10.0.0.5"])));

    for body in [
        r#"{"name":"Alice","ip":"10.0.0.5","username":"alice"}"#,
        r#"{"name":"Bob","ip":"10.0.0.6","username":"bob"}"#,
        r#"{"name":"Carol","ip":"10.0.0.7","username":"carol"}"#,
    ] {
        post_json(&app, "/api/register", body).await;
    }

    let (status, content_type, body) = get(&app, "/api/endpoints").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("application/json"));

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["endpoints"].as_array().unwrap().len(), 3);
    assert_eq!(json["online"], 1);
    assert_eq!(json["offline"], 2);
    assert_eq!(json["persisted"], true);
    assert_eq!(json["summary"]["probed"], 3);
}
