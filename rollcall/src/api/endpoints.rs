//! 登録・削除・一覧APIハンドラー

use super::error::AppError;
use crate::common::types::{EndpointRecord, RegisterRequest, UpsertStatus};
use crate::health::ProbeSummary;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

/// `GET /api/endpoints` のレスポンス
#[derive(Debug, Serialize)]
pub struct EndpointListResponse {
    /// 最新ステータス付きレコード
    pub endpoints: Vec<EndpointRecord>,
    /// オンライン数
    pub online: usize,
    /// オフライン数
    pub offline: usize,
    /// 永続化に成功したか
    pub persisted: bool,
    /// プローブ集計
    pub summary: ProbeSummary,
}

/// POST /api/register - エンドポイント登録
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    let outcome = state.registry.register(req).await?;

    let message = match outcome.status {
        UpsertStatus::Registered => "Endpoint registered",
        UpsertStatus::Updated => "Endpoint updated",
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "status": outcome.status,
    })))
}

/// POST /api/clear - 全エンドポイント削除
pub async fn clear(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    state.registry.clear_all().await?;
    Ok(Json(json!({ "success": true })))
}

/// GET /api/endpoints - 全エンドポイントをプローブして一覧を返す
pub async fn list(State(state): State<AppState>) -> Json<EndpointListResponse> {
    let status = state.registry.list_with_fresh_status().await;
    Json(EndpointListResponse {
        online: status.online_count(),
        offline: status.offline_count(),
        persisted: status.persisted,
        summary: status.summary,
        endpoints: status.records,
    })
}
