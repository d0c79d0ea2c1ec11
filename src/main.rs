//! scope-router server binary.

use std::path::PathBuf;

use clap::Parser;

use scope_router::config::{load_config, ServerConfig};
use scope_router::health::HealthRegistry;
use scope_router::lifecycle::{assemble, spawn_signal_handler, Shutdown};
use scope_router::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "scope-router")]
#[command(about = "Scope-aware HTTP router", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `[health] task_threshold`.
    #[arg(long)]
    task_threshold: Option<usize>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ServerConfig::default(),
    };
    if let Some(threshold) = cli.task_threshold {
        config.health.task_threshold = threshold;
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        mount_prefix = %config.routing.mount_prefix,
        scope_depth = config.routing.scope_depth,
        "scope-router starting"
    );

    let metrics_handle = if config.observability.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::error!(error = %e, "Failed to install metrics recorder");
                None
            }
        }
    } else {
        None
    };

    let health = HealthRegistry::new();
    let server = assemble(config, metrics_handle, &health).finish();

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    if let Err(e) = server.start(shutdown.subscribe().recv()).await {
        tracing::error!(error = %e, "Server terminated");
        std::process::exit(1);
    }

    tracing::info!("Shutdown complete");
}
