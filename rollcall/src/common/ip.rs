//! LANアドレス検出ユーティリティ
//!
//! ダッシュボードURL・セットアップURLの表示に使う

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// 外向きインターフェースのIPv4アドレスを推定する
///
/// UDPソケットを外部アドレスに`connect`してローカルアドレスを読むだけで、
/// パケットは送信しない。ループバックしか無い環境では`None`。
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_unspecified() => Some(v4),
        _ => None,
    }
}

/// 表示用ホスト名
///
/// ワイルドカードバインドの場合はLANアドレス（取得できなければ`localhost`）を返す。
pub fn display_host(bind_host: &str) -> String {
    match bind_host {
        "0.0.0.0" | "::" | "[::]" => local_ipv4()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "localhost".to_string()),
        other => other.to_string(),
    }
}
