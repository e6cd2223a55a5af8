//! 統合テスト共通ユーティリティ

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rollcall::config::ProbeConfig;
use rollcall::health::{ProbeResult, Prober};
use rollcall::registry::{RegistryService, RegistryStore};
use rollcall::{api, AppState};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

/// 指定アドレスだけ到達可能とみなすプローバー
pub struct StaticProber {
    reachable: HashSet<String>,
}

impl StaticProber {
    #[allow(dead_code)]
    pub fn new(reachable: &[&str]) -> Self {
        Self {
            reachable: reachable.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Prober for StaticProber {
    async fn probe(&self, address: &str, _port: u16, _budget: Duration) -> ProbeResult {
        if self.reachable.contains(address) {
            ProbeResult::Reachable
        } else {
            ProbeResult::Unreachable
        }
    }
}

/// テスト用のアプリを組み立てる
#[allow(dead_code)]
pub fn build_app(data_dir: &Path, prober: Arc<dyn Prober>) -> (AppState, Router) {
    let store = Arc::new(RegistryStore::new(data_dir));
    let service =
        RegistryService::new(store, prober, ProbeConfig::default().with_timeout_ms(300));
    let state = AppState::with_service(service, "http://192.168.1.10:8080".to_string());
    let app = api::create_app(state.clone());
    (state, app)
}

/// JSONをPOSTしてステータスとJSONボディを返す
#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// GETしてステータス・Content-Type・本文を返す
#[allow(dead_code)]
pub async fn get(app: &Router, uri: &str) -> (StatusCode, String, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (
        status,
        content_type,
        String::from_utf8(bytes.to_vec()).unwrap(),
    )
}
