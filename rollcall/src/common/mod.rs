//! 共通型定義・エラー型

/// エラー型
pub mod error;

/// LANアドレス検出
pub mod ip;

/// レコード・リクエスト型
pub mod types;
