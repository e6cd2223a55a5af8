//! list / clear サブコマンド
//!
//! サーバーを起動せずにレジストリファイルを操作します。
//! `clear` はデータディレクトリのロックを取得するため、同じディレクトリで
//! サーバーが動いている間は失敗します（その場合は `POST /api/clear` を使う）。

use super::DataDirArgs;
use crate::common::types::EndpointRecord;
use crate::lock::RegistryLock;
use crate::registry::RegistryStore;

fn format_table(records: &[EndpointRecord]) -> String {
    let mut out = format!(
        "{:<4} {:<20} {:<18} {:<6} {:<12} {:<8} {}\n",
        "#", "NAME", "IP", "PORT", "USERNAME", "STATUS", "LAST SEEN"
    );
    for (i, r) in records.iter().enumerate() {
        let last_seen = r
            .last_seen
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        out.push_str(&format!(
            "{:<4} {:<20} {:<18} {:<6} {:<12} {:<8} {}\n",
            i + 1,
            r.name,
            r.ip,
            r.port,
            r.username,
            if r.online { "online" } else { "offline" },
            last_seen
        ));
    }
    out
}

/// 登録済みエンドポイントを表形式で表示（プローブはしない）
pub async fn execute_list(args: &DataDirArgs) -> anyhow::Result<()> {
    let store = RegistryStore::new(&args.resolve());
    let records = store.load().await;
    if records.is_empty() {
        println!("No hosts registered ({})", store.path().display());
        return Ok(());
    }
    print!("{}", format_table(&records));
    Ok(())
}

/// 全エンドポイントを削除
pub async fn execute_clear(args: &DataDirArgs) -> anyhow::Result<()> {
    let data_dir = args.resolve();
    let _lock = RegistryLock::acquire(&data_dir, None)?;
    let store = RegistryStore::new(&data_dir);
    store.clear_all().await?;
    println!("Registry cleared ({})", store.path().display());
    Ok(())
}
