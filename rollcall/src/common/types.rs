//! 共通型定義
//!
//! 登録エンドポイントのレコードと登録リクエスト

use chrono::{DateTime, Utc};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use super::error::CommonError;

/// ポート省略時のデフォルト（SSH）
pub const DEFAULT_SSH_PORT: u16 = 22;

/// 登録済みエンドポイント
///
/// 永続化形式は `{name, ip, port, username, lastSeen, online}`。
/// `ip` がレジストリ内の一意キー。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    /// 表示名（旧形式のファイルでは欠けていることがある）
    #[serde(default)]
    pub name: String,
    /// ホスト名またはIPアドレス（識別キー）
    pub ip: String,
    /// 接続先ポート
    #[serde(default = "default_ssh_port", deserialize_with = "deserialize_port")]
    pub port: u16,
    /// ログインユーザー
    #[serde(default)]
    pub username: String,
    /// 最終確認時刻（未確認ならNone）
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// 直近のプローブ結果
    #[serde(default)]
    pub online: bool,
}

impl EndpointRecord {
    /// `ssh user@host` 形式の接続コマンド
    pub fn ssh_command(&self) -> String {
        format!("ssh {}@{}", self.username, self.ip)
    }

    /// 非標準ポートの場合のみ `ssh -p PORT user@host` を返す
    pub fn ssh_command_with_port(&self) -> Option<String> {
        (self.port != DEFAULT_SSH_PORT)
            .then(|| format!("ssh -p {} {}@{}", self.port, self.username, self.ip))
    }
}

/// ポート番号の入力表現
///
/// 旧形式のファイルやクライアントは `"22"` のように文字列で送ってくる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortInput {
    /// 数値
    Number(i64),
    /// 文字列
    Text(String),
}

impl PortInput {
    /// 空文字列はポート省略として扱う
    fn resolve(&self) -> Result<Option<u16>, CommonError> {
        let value = match self {
            PortInput::Number(n) => *n,
            PortInput::Text(s) if s.trim().is_empty() => return Ok(None),
            PortInput::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                CommonError::Validation(format!("port must be a number, got '{}'", s.trim()))
            })?,
        };
        match u16::try_from(value) {
            Ok(port) if port != 0 => Ok(Some(port)),
            _ => Err(CommonError::Validation(format!(
                "port must be between 1 and 65535, got {}",
                value
            ))),
        }
    }
}

impl From<u16> for PortInput {
    fn from(port: u16) -> Self {
        PortInput::Number(i64::from(port))
    }
}

fn default_ssh_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// 永続化済みのポートを読む（空文字は登録時と同じく22）
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let input = PortInput::deserialize(deserializer)?;
    Ok(input
        .resolve()
        .map_err(D::Error::custom)?
        .unwrap_or(DEFAULT_SSH_PORT))
}

/// 登録リクエスト（`POST /api/register`）
///
/// 必須項目の欠落はデシリアライズではなく検証で報告するため、全項目をOptionで受ける。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// 表示名（省略時はusername）
    #[serde(default)]
    pub name: Option<String>,
    /// ホスト名またはIPアドレス
    #[serde(default)]
    pub ip: Option<String>,
    /// ポート（省略時は22）
    #[serde(default)]
    pub port: Option<PortInput>,
    /// ログインユーザー
    #[serde(default)]
    pub username: Option<String>,
}

impl RegisterRequest {
    /// 検証してレコードを生成する
    ///
    /// 登録直後のレコードはオンライン扱いで、`last_seen` は `now`。
    pub fn into_record(self, now: DateTime<Utc>) -> Result<EndpointRecord, CommonError> {
        let ip = non_empty(self.ip)
            .ok_or_else(|| CommonError::Validation("ip is required".to_string()))?;
        if ip.chars().any(char::is_whitespace) {
            return Err(CommonError::Validation(
                "ip must not contain whitespace".to_string(),
            ));
        }
        let username = non_empty(self.username)
            .ok_or_else(|| CommonError::Validation("username is required".to_string()))?;
        let port = match &self.port {
            Some(input) => input.resolve()?.unwrap_or(DEFAULT_SSH_PORT),
            None => DEFAULT_SSH_PORT,
        };
        let name = non_empty(self.name).unwrap_or_else(|| username.clone());

        Ok(EndpointRecord {
            name,
            ip,
            port,
            username,
            last_seen: Some(now),
            online: true,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// upsertの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertStatus {
    /// 新規登録
    Registered,
    /// 既存レコードを置き換え
    Updated,
}
