//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング。失敗は `{"success": false, "error": ...}` で返す。

use crate::common::error::{CommonError, RollcallError};
use axum::{extract::rejection::JsonRejection, response::IntoResponse, Json};
use serde_json::json;
use tracing::{error, warn};

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub RollcallError);

impl From<RollcallError> for AppError {
    fn from(err: RollcallError) -> Self {
        AppError(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(RollcallError::Common(CommonError::Validation(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        ))))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        // Full error details are logged; clients get external_message()
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }

        let payload = json!({
            "success": false,
            "error": self.0.external_message(),
        });

        (status, Json(payload)).into_response()
    }
}
