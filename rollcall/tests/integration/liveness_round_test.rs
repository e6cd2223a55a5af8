//! Integration Test: 実TCPプローブでのライブネスラウンド
//!
//! 待ち受け中のポートはオンライン、閉じたポートはオフライン

use rollcall::common::types::{PortInput, RegisterRequest};
use rollcall::config::ProbeConfig;
use rollcall::health::probe::PROBE_GRACE;
use rollcall::health::TcpProber;
use rollcall::registry::{RegistryService, RegistryStore};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

fn request(name: &str, ip: &str, port: u16) -> RegisterRequest {
    RegisterRequest {
        name: Some(name.to_string()),
        ip: Some(ip.to_string()),
        port: Some(PortInput::from(port)),
        username: Some("student".to_string()),
    }
}

#[tokio::test]
async fn test_round_against_real_sockets() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open_port = listener.local_addr().unwrap().port();
    let closed_port = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };

    let config = ProbeConfig::default().with_timeout_ms(500);
    let service = RegistryService::new(
        Arc::new(RegistryStore::new(dir.path())),
        Arc::new(TcpProber),
        config,
    );
    service.register(request("open", "127.0.0.1", open_port)).await.unwrap();
    service
        .register(request("closed", "localhost", closed_port))
        .await
        .unwrap();
    let registered = service.list().await;

    let started = Instant::now();
    let status = service.list_with_fresh_status().await;

    assert!(started.elapsed() < config.timeout + PROBE_GRACE + Duration::from_secs(1));
    assert_eq!(status.records.len(), 2);

    let open = &status.records[0];
    assert!(open.online);
    assert!(open.last_seen >= registered[0].last_seen);

    let closed = &status.records[1];
    assert!(!closed.online);
    assert_eq!(closed.last_seen, registered[1].last_seen);

    drop(listener);
}

#[tokio::test]
async fn test_each_view_runs_its_own_round() {
    let dir = tempfile::tempdir().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let service = RegistryService::new(
        Arc::new(RegistryStore::new(dir.path())),
        Arc::new(TcpProber),
        ProbeConfig::default().with_timeout_ms(500),
    );
    service.register(request("flappy", "127.0.0.1", port)).await.unwrap();

    assert!(service.list_with_fresh_status().await.records[0].online);

    drop(listener);
    assert!(!service.list_with_fresh_status().await.records[0].online);
}
