//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `RollcallError`は`external_message()`と`status_code()`を提供し、
//! APIレイヤーが内部情報（パスやOSエラー）を漏らさずにレスポンスを組み立てられる。

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

use super::types::EndpointRecord;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// レジストリファイルの読み書きエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backing file could not be read
    #[error("Failed to read registry file {path}: {source}")]
    Read {
        /// Registry file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Backing file is not valid JSON
    #[error("Failed to parse registry file {path}: {source}")]
    Parse {
        /// Registry file path
        path: PathBuf,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },

    /// Backing file could not be written
    #[error("Failed to write registry file {path}: {source}")]
    Write {
        /// Registry file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Unreadable registry file could not be set aside before rewriting
    #[error("Failed to preserve unreadable registry file as {path}: {source}")]
    Preserve {
        /// Destination of the preserved copy
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized
    #[error("Failed to serialize registry: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// 永続化に失敗した read-modify-write の結果
///
/// 書き込みに失敗してもメモリ上の結果は破棄せず、呼び出し側に返す。
#[derive(Debug, Error)]
#[error("{source}")]
pub struct Unpersisted {
    /// 書き込めなかったレコード一覧
    pub records: Vec<EndpointRecord>,
    /// 書き込み失敗の原因
    #[source]
    pub source: StoreError,
}

/// rollcall error type
#[derive(Debug, Error)]
pub enum RollcallError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Registry persistence error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RollcallError {
    /// Returns a safe error message for external clients.
    ///
    /// Validation messages are written for the registrant and are returned as-is.
    /// Everything else is replaced with a generic message; full details belong in server logs.
    pub fn external_message(&self) -> String {
        match self {
            Self::Common(CommonError::Validation(msg)) => msg.clone(),
            Self::Common(CommonError::Serialization(_)) => "Invalid request body".to_string(),
            Self::Store(_) => "Failed to persist registry".to_string(),
            Self::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Result type alias using RollcallError
pub type RollcallResult<T> = Result<T, RollcallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_message_for_clients() {
        let err = RollcallError::from(CommonError::Validation("ip is required".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.external_message(), "ip is required");
    }

    #[test]
    fn store_error_hides_path_from_clients() {
        let err = RollcallError::from(StoreError::Write {
            path: PathBuf::from("/var/lib/rollcall/endpoints.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.external_message().contains("/var/lib"));
        assert!(err.to_string().contains("/var/lib/rollcall/endpoints.json"));
    }
}
