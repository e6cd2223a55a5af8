//! serve サブコマンド
//!
//! ダッシュボードサーバーを起動します。
//! 省略したフラグは環境変数（新旧どちらの名前でも）→既定値の順で解決します。

use crate::config::{self, ProbeConfig, ServerConfig};
use clap::Args;
use std::path::PathBuf;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port [env: ROLLCALL_PORT, DASHBOARD_PORT] [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address [env: ROLLCALL_HOST, DASHBOARD_HOST] [default: 0.0.0.0]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Registry directory [env: ROLLCALL_DATA_DIR, DASHBOARD_DATA_DIR] [default: ~/.rollcall]
    #[arg(short = 'd', long)]
    pub data_dir: Option<PathBuf>,

    /// Per-host probe budget in milliseconds [env: ROLLCALL_PROBE_TIMEOUT_MS, PROBE_TIMEOUT_MS] [default: 2000]
    #[arg(long)]
    pub probe_timeout_ms: Option<u64>,
}

impl ServeArgs {
    /// バインド設定（フラグ優先）
    pub fn server_config(&self) -> ServerConfig {
        let mut server_config = ServerConfig::from_env();
        if let Some(port) = self.port {
            server_config.port = port;
        }
        if let Some(host) = &self.host {
            server_config.host = host.clone();
        }
        server_config
    }

    /// データディレクトリ（フラグ優先）
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(config::data_dir)
    }

    /// プローブ設定（フラグ優先）
    pub fn probe_config(&self) -> ProbeConfig {
        let probe_config = ProbeConfig::from_env();
        match self.probe_timeout_ms {
            Some(timeout_ms) => probe_config.with_timeout_ms(timeout_ms),
            None => probe_config,
        }
    }
}
