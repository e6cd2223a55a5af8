//! レジストリサービス
//!
//! HTTPレイヤーから呼ばれる問い合わせ・コマンドの窓口。

use super::store::RegistryStore;
use crate::common::error::RollcallResult;
use crate::common::types::{EndpointRecord, RegisterRequest, UpsertStatus};
use crate::config::ProbeConfig;
use crate::health::{FreshStatus, LivenessCoordinator, Prober};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// 登録結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterOutcome {
    /// 新規/更新
    pub status: UpsertStatus,
    /// 保存されたレコード
    pub record: EndpointRecord,
}

/// レジストリサービス
#[derive(Clone)]
pub struct RegistryService {
    store: Arc<RegistryStore>,
    coordinator: LivenessCoordinator,
}

impl RegistryService {
    /// ストアとプローバーからサービスを作成
    pub fn new(store: Arc<RegistryStore>, prober: Arc<dyn Prober>, config: ProbeConfig) -> Self {
        let coordinator = LivenessCoordinator::new(store.clone(), prober, config);
        Self { store, coordinator }
    }

    /// ストア
    pub fn store(&self) -> &Arc<RegistryStore> {
        &self.store
    }

    /// 全エンドポイントをプローブし、最新ステータス付きで返す
    pub async fn list_with_fresh_status(&self) -> FreshStatus {
        self.coordinator.run_cycle().await
    }

    /// プローブせずに永続化済みのレコードを返す
    pub async fn list(&self) -> Vec<EndpointRecord> {
        self.store.load().await
    }

    /// エンドポイントを登録（同じ`ip`があれば置き換え）
    ///
    /// 検証に失敗した場合はストアを変更しない。
    pub async fn register(&self, req: RegisterRequest) -> RollcallResult<RegisterOutcome> {
        let record = req.into_record(Utc::now())?;
        let status = self.store.upsert(record.clone()).await?;

        info!(
            name = %record.name,
            address = %record.ip,
            port = record.port,
            username = %record.username,
            ?status,
            "Endpoint registered"
        );

        Ok(RegisterOutcome { status, record })
    }

    /// 全エンドポイントを削除
    pub async fn clear_all(&self) -> RollcallResult<()> {
        self.store.clear_all().await?;
        info!("Registry cleared");
        Ok(())
    }
}
