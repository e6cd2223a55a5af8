//! ライブネスコーディネーター
//!
//! ダッシュボード表示1回につき1ラウンド:
//! スナップショット取得 → 全エンドポイントを並列プローブ → 全結果を待ち合わせ →
//! 最新のストア内容にマージして永続化。
//!
//! マージはストアのクリティカルセクション内で最新状態に対して行うため、
//! プローブ中に登録されたエンドポイントが上書きで失われることはない。

use super::probe::{ProbeResult, Prober, PROBE_GRACE};
use crate::common::types::EndpointRecord;
use crate::config::ProbeConfig;
use crate::registry::store::RegistryStore;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// 1エンドポイント分のプローブ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// プローブしたポート
    pub port: u16,
    /// 結果
    pub result: ProbeResult,
}

/// 1ラウンドの集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    /// プローブしたエンドポイント数
    pub probed: usize,
    /// 到達できた数
    pub reachable: usize,
    /// 判定不能（エラー）だった数
    pub errors: usize,
    /// ラウンド全体の所要時間（ミリ秒）
    pub elapsed_ms: u64,
}

/// 最新ステータス付きのレコード一覧
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshStatus {
    /// マージ済みレコード
    pub records: Vec<EndpointRecord>,
    /// 永続化に成功したか
    pub persisted: bool,
    /// プローブ集計
    pub summary: ProbeSummary,
}

impl FreshStatus {
    /// オンライン数
    pub fn online_count(&self) -> usize {
        self.records.iter().filter(|r| r.online).count()
    }

    /// オフライン数
    pub fn offline_count(&self) -> usize {
        self.records.len() - self.online_count()
    }
}

/// プローブ結果をレコードへマージする
///
/// - 到達可: `online = true`、`last_seen = checked_at`
/// - 到達不可/エラー: `online = false`、`last_seen` は維持
/// - プローブ後にポートが変わった（再登録された）レコードと、
///   プローブしていないレコードは登録内容を優先してそのまま
pub fn merge_round(
    records: Vec<EndpointRecord>,
    outcomes: &HashMap<String, ProbeOutcome>,
    checked_at: DateTime<Utc>,
) -> Vec<EndpointRecord> {
    records
        .into_iter()
        .map(|mut record| {
            if let Some(outcome) = outcomes.get(&record.ip) {
                if outcome.port == record.port {
                    record.online = outcome.result.is_reachable();
                    if record.online {
                        record.last_seen = Some(checked_at);
                    }
                }
            }
            record
        })
        .collect()
}

/// ライブネスコーディネーター
#[derive(Clone)]
pub struct LivenessCoordinator {
    store: Arc<RegistryStore>,
    prober: Arc<dyn Prober>,
    config: ProbeConfig,
}

impl LivenessCoordinator {
    /// 新しいコーディネーターを作成
    pub fn new(store: Arc<RegistryStore>, prober: Arc<dyn Prober>, config: ProbeConfig) -> Self {
        Self {
            store,
            prober,
            config,
        }
    }

    /// プローブ設定
    pub fn config(&self) -> ProbeConfig {
        self.config
    }

    /// 1ラウンド実行する
    ///
    /// プローブやストアの失敗でエラーにはならない。永続化に失敗した場合は
    /// `persisted = false` でマージ結果を返す。
    pub async fn run_cycle(&self) -> FreshStatus {
        let started = Instant::now();
        let snapshot = self.store.load().await;
        let outcomes = self.probe_all(&snapshot).await;
        let checked_at = Utc::now();

        let (records, persisted) = match self
            .store
            .modify(|records| merge_round(records, &outcomes, checked_at))
            .await
        {
            Ok(records) => (records, true),
            Err(e) => {
                error!(error = %e, "Failed to persist probe round");
                (e.records, false)
            }
        };

        let summary = ProbeSummary {
            probed: outcomes.len(),
            reachable: outcomes.values().filter(|o| o.result.is_reachable()).count(),
            errors: outcomes
                .values()
                .filter(|o| matches!(o.result, ProbeResult::Error(_)))
                .count(),
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            total = records.len(),
            probed = summary.probed,
            reachable = summary.reachable,
            errors = summary.errors,
            elapsed_ms = summary.elapsed_ms,
            persisted,
            "Liveness round completed"
        );

        FreshStatus {
            records,
            persisted,
            summary,
        }
    }

    /// スナップショットの全エンドポイントを並列プローブ
    ///
    /// 同時実行数はセマフォで制限し、各プローブは `timeout + PROBE_GRACE` で打ち切る。
    async fn probe_all(&self, snapshot: &[EndpointRecord]) -> HashMap<String, ProbeOutcome> {
        if snapshot.is_empty() {
            debug!("No endpoints to probe");
            return HashMap::new();
        }

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let budget = self.config.timeout;
        let deadline = budget + PROBE_GRACE;

        let handles: Vec<_> = snapshot
            .iter()
            .map(|record| {
                let prober = self.prober.clone();
                let semaphore = semaphore.clone();
                let ip = record.ip.clone();
                let port = record.port;
                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await;
                    match timeout(deadline, prober.probe(&ip, port, budget)).await {
                        Ok(result) => result,
                        Err(_) => ProbeResult::Unreachable,
                    }
                })
            })
            .collect();

        let joined = join_all(handles).await;

        snapshot
            .iter()
            .zip(joined)
            .map(|(record, joined)| {
                let result = joined.unwrap_or_else(|e| {
                    warn!(address = %record.ip, error = %e, "Probe task failed");
                    ProbeResult::Unreachable
                });
                if let ProbeResult::Error(reason) = &result {
                    debug!(address = %record.ip, port = record.port, reason = %reason, "Probe error");
                }
                (
                    record.ip.clone(),
                    ProbeOutcome {
                        port: record.port,
                        result,
                    },
                )
            })
            .collect()
    }
}
