//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to the names used by the original instructor dashboard (`DASHBOARD_PORT` etc.),
//! logging a deprecation warning when only the old name is set.

use std::path::PathBuf;
use std::time::Duration;

/// デフォルトのリッスンポート
pub const DEFAULT_PORT: u16 = 8080;

/// デフォルトのバインドアドレス
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// プローブのデフォルトタイムアウト（ミリ秒）
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// 同時プローブ数のデフォルト上限
pub const DEFAULT_MAX_CONCURRENT_PROBES: usize = 64;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `default` if neither variable is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Server bind configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl ServerConfig {
    /// Load bind configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: get_env_with_fallback_or("ROLLCALL_HOST", "DASHBOARD_HOST", DEFAULT_HOST),
            port: get_env_with_fallback_parse("ROLLCALL_PORT", "DASHBOARD_PORT", DEFAULT_PORT),
        }
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Probe configuration (per-probe budget and fan-out cap)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Time budget for a single reachability check.
    pub timeout: Duration,
    /// Maximum number of probes in flight during one view cycle.
    pub max_concurrent: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            max_concurrent: DEFAULT_MAX_CONCURRENT_PROBES,
        }
    }
}

impl ProbeConfig {
    /// Load probe configuration from environment variables.
    ///
    /// Zero values are ignored and fall back to the defaults.
    pub fn from_env() -> Self {
        let timeout_ms = get_env_with_fallback_parse(
            "ROLLCALL_PROBE_TIMEOUT_MS",
            "PROBE_TIMEOUT_MS",
            DEFAULT_PROBE_TIMEOUT_MS,
        );
        let max_concurrent = get_env_with_fallback_parse(
            "ROLLCALL_MAX_CONCURRENT_PROBES",
            "MAX_CONCURRENT_PROBES",
            DEFAULT_MAX_CONCURRENT_PROBES,
        );
        Self::default()
            .with_timeout_ms(timeout_ms)
            .with_max_concurrent(max_concurrent)
    }

    /// タイムアウトを設定（0は無視）
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        if timeout_ms > 0 {
            self.timeout = Duration::from_millis(timeout_ms);
        }
        self
    }

    /// 同時実行数の上限を設定（0は無視）
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        if max_concurrent > 0 {
            self.max_concurrent = max_concurrent;
        }
        self
    }
}

/// データディレクトリを取得
///
/// `ROLLCALL_DATA_DIR`（旧: `DASHBOARD_DATA_DIR`）が優先。
/// 未設定の場合は `$HOME/.rollcall`（Windowsは`%USERPROFILE%`）、
/// どちらも無ければカレントディレクトリ配下の `.rollcall`。
pub fn data_dir() -> PathBuf {
    if let Some(dir) = get_env_with_fallback("ROLLCALL_DATA_DIR", "DASHBOARD_DATA_DIR") {
        return PathBuf::from(dir);
    }
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".rollcall")
}

/// ログレベル指定を取得（`ROLLCALL_LOG_LEVEL`、旧: `LOG_LEVEL`）
pub fn log_level() -> Option<String> {
    get_env_with_fallback("ROLLCALL_LOG_LEVEL", "LOG_LEVEL")
}

/// ログ出力ディレクトリ
///
/// `ROLLCALL_LOG_DIR` が未設定なら `<data_dir>/logs`。
pub fn log_dir(data_dir: &std::path::Path) -> PathBuf {
    std::env::var_os("ROLLCALL_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.join("logs"))
}
