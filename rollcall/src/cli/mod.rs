//! CLI module for rollcall
//!
//! Provides command-line interface for the registry dashboard.

pub mod offline;
pub mod serve;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rollcall - self-registration dashboard with live SSH reachability
#[derive(Parser, Debug)]
#[command(name = "rollcall")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ROLLCALL_HOST                   Bind address (default: 0.0.0.0)
    ROLLCALL_PORT                   Listen port (default: 8080, legacy: DASHBOARD_PORT)
    ROLLCALL_DATA_DIR               Registry/log directory (default: ~/.rollcall)
    ROLLCALL_PROBE_TIMEOUT_MS       Per-host probe budget in ms (default: 2000)
    ROLLCALL_MAX_CONCURRENT_PROBES  Probes in flight per view (default: 64)
    ROLLCALL_LOG_LEVEL              Log level (default: info)
    ROLLCALL_LOG_DIR                Log directory (default: <data dir>/logs)
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(serve::ServeArgs),
    /// Print registered hosts without probing them
    List(DataDirArgs),
    /// Remove every registered host
    Clear(DataDirArgs),
}

/// Arguments shared by offline registry commands
#[derive(Args, Debug, Clone)]
pub struct DataDirArgs {
    /// Registry directory (defaults to ROLLCALL_DATA_DIR or ~/.rollcall)
    #[arg(short = 'd', long)]
    pub data_dir: Option<PathBuf>,
}

impl DataDirArgs {
    /// 指定が無ければ環境変数・既定値から解決する
    pub fn resolve(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(crate::config::data_dir)
    }
}
