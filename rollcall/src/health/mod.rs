//! エンドポイントの到達性監視
//!
//! ダッシュボード表示ごとにPULL型で全エンドポイントをプローブする。
//! 定期監視ループは持たない。

pub mod liveness;
pub mod probe;

pub use liveness::{FreshStatus, LivenessCoordinator, ProbeSummary};
pub use probe::{ProbeResult, Prober, TcpProber};
