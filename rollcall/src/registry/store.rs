//! レジストリストア
//!
//! 登録エンドポイントをJSONファイルに永続化する。
//! 全ての変更は単一のクリティカルセクション（`Mutex`）で直列化される。
//! 書き込みは毎回一意な一時ファイル→`rename`で行うため、別プロセスと同時に
//! 書き込んでもファイルが途中状態になることはない。
//!
//! 読めないファイルを空のレジストリで上書きすることはない。パースできない
//! レコードがある場合は元のファイルを `<file>.corrupt-<時刻>` に退避してから書き込み、
//! I/Oエラーで読めない場合は書き込み自体を行わない。

use crate::common::error::{StoreError, Unpersisted};
use crate::common::types::{EndpointRecord, UpsertStatus};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// レジストリファイル名
pub const REGISTRY_FILE_NAME: &str = "endpoints.json";

/// ファイルから読み込んだ内容
#[derive(Debug, Default)]
struct Snapshot {
    records: Vec<EndpointRecord>,
    /// パースできずに読み飛ばしたレコード数
    rejected: usize,
}

/// JSONファイルを背後に持つレジストリストア
///
/// `Arc`で共有して使う。ロックは読み書きの間だけ保持し、プローブ中は保持しない。
#[derive(Debug)]
pub struct RegistryStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl RegistryStore {
    /// `data_dir/endpoints.json` を使うストアを作成
    pub fn new(data_dir: &Path) -> Self {
        Self::with_path(data_dir.join(REGISTRY_FILE_NAME))
    }

    /// 任意のファイルパスでストアを作成
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// 背後のファイルパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 永続化済みのレコードを読み込む
    ///
    /// 読み込み・パースに失敗した場合は警告を出して空を返す。ファイルには触れない。
    pub async fn load(&self) -> Vec<EndpointRecord> {
        let _guard = self.write_lock.lock().await;
        match self.read_records().await {
            Ok(snapshot) => snapshot.records,
            Err(e) => {
                warn!(error = %e, "Registry unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// レコード一式を置き換える
    pub async fn replace(&self, records: &[EndpointRecord]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write_records(records).await
    }

    /// `ip` をキーに挿入または置換し、同期的に永続化する
    ///
    /// 既存ファイルが読めない場合は書き込まずにエラーを返す。
    pub async fn upsert(&self, record: EndpointRecord) -> Result<UpsertStatus, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_for_update().await?;

        let status = match records.iter_mut().find(|r| r.ip == record.ip) {
            Some(existing) => {
                *existing = record;
                UpsertStatus::Updated
            }
            None => {
                records.push(record);
                UpsertStatus::Registered
            }
        };

        self.write_records(&records).await?;
        Ok(status)
    }

    /// 全レコードを削除
    pub async fn clear_all(&self) -> Result<(), StoreError> {
        self.replace(&[]).await
    }

    /// クリティカルセクション内で read-modify-write を行う
    ///
    /// `f` には直前に読み込んだ最新のレコードが渡される。読み込みに失敗した場合は
    /// 空の入力で `f` を評価するが書き込みはしない。書き込めなかった場合も
    /// 変更後のレコードは [`Unpersisted`] に入れて返す。
    pub async fn modify<F>(&self, f: F) -> Result<Vec<EndpointRecord>, Unpersisted>
    where
        F: FnOnce(Vec<EndpointRecord>) -> Vec<EndpointRecord>,
    {
        let _guard = self.write_lock.lock().await;
        let current = match self.read_for_update().await {
            Ok(records) => records,
            Err(source) => {
                return Err(Unpersisted {
                    records: f(Vec::new()),
                    source,
                })
            }
        };
        let records = f(current);

        match self.write_records(&records).await {
            Ok(()) => Ok(records),
            Err(source) => Err(Unpersisted { records, source }),
        }
    }

    /// 書き込み前の読み込み
    ///
    /// 読み飛ばしたレコードやパースできない内容があれば、元のファイルを退避してから
    /// 読めた分だけを返す。I/Oエラーや退避の失敗はそのまま返し、呼び出し側は書き込まない。
    async fn read_for_update(&self) -> Result<Vec<EndpointRecord>, StoreError> {
        let snapshot = match self.read_records().await {
            Ok(snapshot) if snapshot.rejected == 0 => return Ok(snapshot.records),
            Ok(snapshot) => snapshot,
            Err(e @ StoreError::Parse { .. }) => {
                warn!(error = %e, "Registry file is not a valid record list");
                Snapshot::default()
            }
            Err(e) => {
                error!(error = %e, "Registry unreadable, refusing to overwrite");
                return Err(e);
            }
        };

        let preserved = self.preserve_original().await?;
        warn!(
            preserved = %preserved.display(),
            kept = snapshot.records.len(),
            rejected = snapshot.rejected,
            "Unreadable registry entries set aside"
        );
        Ok(snapshot.records)
    }

    /// 元のファイルを `<file>.corrupt-<時刻>` にコピーする
    async fn preserve_original(&self) -> Result<PathBuf, StoreError> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let preserved = PathBuf::from(name);

        fs::copy(&self.path, &preserved)
            .await
            .map_err(|source| StoreError::Preserve {
                path: preserved.clone(),
                source,
            })?;
        Ok(preserved)
    }

    async fn read_records(&self) -> Result<Snapshot, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            // 親がファイルの場合（ENOTDIR）なども「存在しない」として扱う
            Err(e) if e.kind() == std::io::ErrorKind::NotFound || !self.path.exists() => {
                debug!(path = %self.path.display(), "Registry file not found");
                return Ok(Snapshot::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(Snapshot::default());
        }

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let mut snapshot = Snapshot::default();
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<EndpointRecord>(entry) {
                Ok(mut record) => {
                    if record.name.trim().is_empty() {
                        record.name = record.username.clone();
                    }
                    snapshot.records.push(record);
                }
                Err(e) => {
                    warn!(path = %self.path.display(), index, error = %e, "Skipping unreadable registry entry");
                    snapshot.rejected += 1;
                }
            }
        }
        Ok(snapshot)
    }

    async fn write_records(&self, records: &[EndpointRecord]) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(records).map_err(StoreError::Serialize)?;
        let path = self.path.clone();

        let result = tokio::task::spawn_blocking(move || persist_atomically(&path, &body))
            .await
            .unwrap_or_else(|e| Err(std::io::Error::other(e)));

        if let Err(source) = result {
            error!(path = %self.path.display(), error = %source, "Failed to write registry");
            return Err(StoreError::Write {
                path: self.path.clone(),
                source,
            });
        }

        debug!(count = records.len(), "Registry persisted");
        Ok(())
    }
}

/// 同じディレクトリに一意な一時ファイルを作り、fsync後に `path` へrenameする
///
/// 失敗時の一時ファイルは `NamedTempFile` のDropで削除される。
fn persist_atomically(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let prefix = format!(
        ".{}.",
        path.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(REGISTRY_FILE_NAME)
    );
    let mut tmp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
