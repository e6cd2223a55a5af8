//! ダッシュボードページハンドラー

use crate::web::render_dashboard;
use crate::AppState;
use axum::{extract::State, response::Html};

/// GET / - 全エンドポイントをプローブしてダッシュボードを返す
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let status = state.registry.list_with_fresh_status().await;
    Html(render_dashboard(&status, &state.dashboard))
}
