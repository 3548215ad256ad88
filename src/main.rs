//! `front-router`: serves the sample route set through the router.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use front_router::config::{load_config, RouterConfig};
use front_router::http::HttpServer;
use front_router::observability::{init_logging, metrics};
use front_router::routing::Router;
use front_router::demo;

/// Front controller for the sample application.
#[derive(Debug, Parser)]
#[command(name = "front-router", version, about)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Print the route table as JSON and exit.
    #[arg(long)]
    print_routes: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability.log_level, config.observability.log_format)?;
    tracing::info!("front-router v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        mount_prefix = %config.routing.mount_prefix,
        "Configuration loaded"
    );

    let table = demo::routes().finish().mount(&config.routing.mount_prefix);
    if cli.print_routes {
        println!("{}", serde_json::to_string_pretty(&table.to_json())?);
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(err) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %err,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = Arc::new(Router::new(table, demo::container()));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(router, &config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
