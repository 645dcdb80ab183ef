//! apiwatch Server Entry Point

use apiwatch::cli::serve::ServeArgs;
use apiwatch::cli::{Cli, Commands};
use apiwatch::config::{
    get_config_path, get_env_with_fallback_parse, get_host, get_sync_interval, ProbeConfig,
};
use apiwatch::shutdown::ShutdownController;
use apiwatch::{build_monitor, logging, server, AppState};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    config_path: PathBuf,
}

impl ServerConfig {
    fn from_env() -> Self {
        Self::from_args(ServeArgs::default())
    }

    fn from_args(args: ServeArgs) -> Self {
        let host = args.host.unwrap_or_else(get_host);
        let port = args
            .port
            .unwrap_or_else(|| get_env_with_fallback_parse("APIWATCH_PORT", "PORT", 3000));
        let config_path = args.config.unwrap_or_else(get_config_path);
        Self {
            host,
            port,
            config_path,
        }
    }

    fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _log_guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Check(args)) => apiwatch::cli::check::execute(&args).await,
        Some(Commands::Serve(args)) => run_server(ServerConfig::from_args(args)).await,
        // No subcommand - default to serve
        None => run_server(ServerConfig::from_env()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let probe = ProbeConfig::from_env();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config.config_path.display(),
        probe = %probe.program,
        timeout_secs = probe.timeout.as_secs(),
        "Starting apiwatch"
    );

    let monitor = build_monitor(&config.config_path, probe);
    let shutdown = ShutdownController::default();
    let sync_loop = monitor.start(get_sync_interval(), shutdown.clone()).await;

    let state = AppState {
        monitor,
        shutdown: shutdown.clone(),
    };
    let result = server::run(state, &config.bind_addr()).await;

    // bind failures return before the controller is triggered
    shutdown.request_shutdown();
    if let Err(e) = sync_loop.await {
        tracing::warn!(error = %e, "Configuration sync loop ended abnormally");
    }
    result
}
