//! REST APIハンドラー
//!
//! ダッシュボード表示、エンドポイント登録・一覧・全削除

pub mod dashboard;
pub mod endpoints;
pub mod error;

use crate::AppState;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/api/endpoints", get(endpoints::list))
        .route("/api/register", post(endpoints::register))
        .route("/api/clear", post(endpoints::clear))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
