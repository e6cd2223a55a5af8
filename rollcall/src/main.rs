//! Rollcall Dashboard Entry Point

use clap::Parser;
use rollcall::cli::{offline, Cli, Commands};
use rollcall::common::ip::display_host;
use rollcall::config::{self, ProbeConfig, ServerConfig};
use rollcall::lock::RegistryLock;
use rollcall::{logging, server, AppState};
use std::path::PathBuf;
use tracing::info;

async fn run_server(
    server_config: ServerConfig,
    data_dir: PathBuf,
    probe_config: ProbeConfig,
) -> anyhow::Result<()> {
    logging::init(&data_dir)?;

    let _lock = RegistryLock::acquire(&data_dir, Some(server_config.port))?;

    let base_url = format!(
        "http://{}:{}",
        display_host(&server_config.host),
        server_config.port
    );

    info!("Rollcall v{}", env!("CARGO_PKG_VERSION"));
    info!(data_dir = %data_dir.display(), "Using registry directory");
    info!(
        timeout_ms = probe_config.timeout.as_millis() as u64,
        max_concurrent = probe_config.max_concurrent,
        "Probe configuration"
    );
    info!("Dashboard URL: {}", base_url);
    info!("Local access:  http://localhost:{}", server_config.port);

    let state = AppState::new(&data_dir, probe_config, base_url);
    server::run(state, &server_config.bind_addr()).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::List(args)) => {
            let _ = logging::init_stderr();
            offline::execute_list(&args).await
        }
        Some(Commands::Clear(args)) => {
            let _ = logging::init_stderr();
            offline::execute_clear(&args).await
        }
        Some(Commands::Serve(args)) => {
            run_server(args.server_config(), args.data_dir(), args.probe_config()).await
        }
        None => {
            run_server(
                ServerConfig::from_env(),
                config::data_dir(),
                ProbeConfig::from_env(),
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
