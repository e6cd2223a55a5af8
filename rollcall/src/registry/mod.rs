//! エンドポイント登録管理
//!
//! 登録内容はJSONファイルが唯一の正で、リクエスト間でメモリにキャッシュしない。

pub mod service;
pub mod store;

pub use service::{RegisterOutcome, RegistryService};
pub use store::RegistryStore;
