//! ロギング初期化ユーティリティ
//!
//! 標準出力とデータディレクトリ配下の日次ローテーションファイルの両方に出力する。
//! フィルタは `ROLLCALL_LOG_LEVEL`（旧: `LOG_LEVEL`）、無ければ `RUST_LOG`、
//! どちらも無ければ `info`。

use crate::config;
use std::path::Path;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログファイル名のプレフィックス
pub const LOG_FILE_PREFIX: &str = "rollcall.log";

fn env_filter() -> EnvFilter {
    match config::log_level() {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    }
}

/// ロギングを初期化する
///
/// `data_dir` 配下（`ROLLCALL_LOG_DIR` で上書き可）にログファイルを作成する。
pub fn init(data_dir: &Path) -> anyhow::Result<()> {
    let log_dir = config::log_dir(data_dir);
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_PREFIX);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_appender))
        .try_init()?;

    Ok(())
}

/// 標準エラー出力のみのロギング（CLIのオフラインコマンド用）
pub fn init_stderr() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}
