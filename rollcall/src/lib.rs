//! Rollcall Dashboard Server
//!
//! 自己登録したホストを管理し、ダッシュボード表示のたびに到達性を再確認するサーバー

#![warn(missing_docs)]

/// 共通型定義・エラー型
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 到達性プローブとライブネスラウンド
pub mod health;

/// エンドポイント登録管理（JSONファイルストア）
pub mod registry;

/// ダッシュボードHTML生成
pub mod web;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// CLIインターフェース
pub mod cli;

/// サーバーインスタンスの排他制御（シングル実行制約）
pub mod lock;

/// axumサーバー起動
pub mod server;

use std::path::Path;
use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// レジストリサービス
    pub registry: registry::RegistryService,
    /// ダッシュボード描画の付帯情報
    pub dashboard: web::DashboardContext,
}

impl AppState {
    /// `data_dir` のレジストリとTCPプローバーで状態を組み立てる
    pub fn new(data_dir: &Path, probe_config: config::ProbeConfig, base_url: String) -> Self {
        let store = Arc::new(registry::RegistryStore::new(data_dir));
        Self::with_service(
            registry::RegistryService::new(store, Arc::new(health::TcpProber), probe_config),
            base_url,
        )
    }

    /// 任意のサービス（テスト用プローバー等）で状態を組み立てる
    pub fn with_service(registry: registry::RegistryService, base_url: String) -> Self {
        Self {
            registry,
            dashboard: web::DashboardContext { base_url },
        }
    }
}
