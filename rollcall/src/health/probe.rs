//! 到達性プローブ
//!
//! 1エンドポイントに対してTCP接続を試み、時間予算内に到達可否を判定する。
//! ネットワーク障害でもエラーは返さず、結果として報告する。

use async_trait::async_trait;
use std::io::ErrorKind;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// プローブ予算に上乗せする猶予
pub const PROBE_GRACE: Duration = Duration::from_millis(250);

/// プローブ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// 接続が確立できた
    Reachable,
    /// 拒否・タイムアウト等で接続できなかった
    Unreachable,
    /// 到達性を判定できなかった（オフライン扱い）
    Error(String),
}

impl ProbeResult {
    /// オンラインとみなせるか
    ///
    /// `Error` はオフライン扱い。
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeResult::Reachable)
    }
}

/// 到達性チェックの実装
#[async_trait]
pub trait Prober: Send + Sync {
    /// `address:port` への到達性を `budget` 内で判定する
    async fn probe(&self, address: &str, port: u16, budget: Duration) -> ProbeResult;
}

/// TCP接続スキャンによるプローバー
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, address: &str, port: u16, budget: Duration) -> ProbeResult {
        if address.trim().is_empty() {
            return ProbeResult::Error("address is empty".to_string());
        }
        if port == 0 {
            return ProbeResult::Error("port must be between 1 and 65535".to_string());
        }
        if budget.is_zero() {
            return ProbeResult::Error("probe budget must be positive".to_string());
        }

        // 名前解決も含めて予算内に収める
        match timeout(budget, TcpStream::connect((address, port))).await {
            Ok(Ok(_stream)) => ProbeResult::Reachable,
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused
                | ErrorKind::ConnectionReset
                | ErrorKind::ConnectionAborted
                | ErrorKind::TimedOut => ProbeResult::Unreachable,
                _ => ProbeResult::Error(e.to_string()),
            },
            Err(_elapsed) => ProbeResult::Unreachable,
        }
    }
}
