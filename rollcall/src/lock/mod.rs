//! レジストリディレクトリの排他制御（シングル実行制約）
//!
//! ストアの直列化はプロセス内の`Mutex`なので、同じデータディレクトリを
//! 複数のサーバーやオフラインの `clear` が同時に書き換えないよう、
//! ディレクトリ単位のファイルロックで防止する。ポートが違っても同じ
//! ディレクトリなら二重起動は拒否される。
//!
//! - クロスプラットフォームファイルロック（fs2）
//! - ロックファイルにJSON形式でPID・起動時刻・ポートを記録
//! - Drop時にロックを解除してファイルを削除

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// データディレクトリ内のロックファイル名
pub const LOCK_FILE_NAME: &str = "rollcall.lock";

/// ロックファイルに保存される保持者情報
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LockInfo {
    /// 保持プロセスのPID
    pub pid: u32,
    /// ロック取得時刻（UTC）
    pub started_at: DateTime<Utc>,
    /// サーバーのリッスンポート（オフラインコマンドはNone）
    #[serde(default)]
    pub port: Option<u16>,
}

fn describe_port(port: &Option<u16>) -> String {
    port.map(|p| format!(", serving on port {p}"))
        .unwrap_or_default()
}

/// ロック操作に関するエラー型
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    /// 同じデータディレクトリを別プロセスが使用中
    #[error(
        "Registry {} is in use by PID {pid} (started: {started_at}{})\n\nTo stop: kill -TERM {pid}",
        .dir.display(),
        describe_port(.port)
    )]
    AlreadyRunning {
        /// データディレクトリ
        dir: PathBuf,
        /// 保持プロセスのPID
        pid: u32,
        /// 取得時刻
        started_at: DateTime<Utc>,
        /// 保持プロセスのポート
        port: Option<u16>,
    },

    /// ロックは取得されているが内容を読めない
    #[error("Registry {} is in use by another process", .dir.display())]
    FileLocked {
        /// データディレクトリ
        dir: PathBuf,
    },

    /// ロック取得に失敗
    #[error("Failed to acquire lock: {0}")]
    AcquireFailed(#[source] std::io::Error),

    /// ロックディレクトリの作成に失敗
    #[error("Failed to create lock directory: {0}")]
    DirectoryCreationFailed(#[source] std::io::Error),
}

/// ロックファイルからロック情報を読み取る
///
/// ファイルが無い、または内容が壊れている場合は `None`。
pub fn read_lock_info(path: &Path) -> Option<LockInfo> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(info) => Some(info),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Lock file is not readable");
            None
        }
    }
}

/// レジストリロック
///
/// 保持している間は同じデータディレクトリを別プロセスが書き換えられない。
#[derive(Debug)]
pub struct RegistryLock {
    file: File,
    path: PathBuf,
    info: LockInfo,
}

impl RegistryLock {
    /// `data_dir` のロックを取得
    ///
    /// サーバーは `port` を、オフラインコマンドは `None` を渡す。
    pub fn acquire(data_dir: &Path, port: Option<u16>) -> Result<Self, LockError> {
        fs::create_dir_all(data_dir).map_err(LockError::DirectoryCreationFailed)?;
        let path = data_dir.join(LOCK_FILE_NAME);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(LockError::AcquireFailed)?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                let dir = data_dir.to_path_buf();
                return Err(match read_lock_info(&path) {
                    Some(info) => LockError::AlreadyRunning {
                        dir,
                        pid: info.pid,
                        started_at: info.started_at,
                        port: info.port,
                    },
                    None => LockError::FileLocked { dir },
                });
            }
            return Err(LockError::AcquireFailed(e));
        }

        let info = LockInfo {
            pid: std::process::id(),
            started_at: Utc::now(),
            port,
        };
        let body = serde_json::to_vec_pretty(&info)
            .map_err(|e| LockError::AcquireFailed(std::io::Error::other(e)))?;
        file.set_len(0).map_err(LockError::AcquireFailed)?;
        file.write_all(&body).map_err(LockError::AcquireFailed)?;
        file.sync_all().map_err(LockError::AcquireFailed)?;

        debug!(path = %path.display(), pid = info.pid, "Registry lock acquired");
        Ok(Self { file, path, info })
    }

    /// ロック情報
    pub fn info(&self) -> &LockInfo {
        &self.info
    }

    /// ロックファイルのパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove lock file");
        }
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(error = %e, "Failed to release registry lock");
        }
    }
}
