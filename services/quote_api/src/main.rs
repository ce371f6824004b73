//! Quote API server entry point

use anyhow::Context;
use clap::Parser;
use quote_api::{routes, QuoteDefaults};
use sluice_config::SluiceConfig;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment overlay (config/<environment>.toml)
    #[arg(short, long)]
    environment: Option<String>,

    /// Bind address, overrides the configured one
    #[arg(long)]
    bind_address: Option<String>,

    /// Port, overrides the configured one
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quote_api=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    info!("Starting Sluice quote API");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = SluiceConfig::load(args.config.as_deref(), args.environment.as_deref())?;
    if let Some(bind_address) = args.bind_address {
        config.server.bind_address = bind_address;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let ip: IpAddr = config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("invalid bind address '{}'", config.server.bind_address))?;
    let addr = SocketAddr::new(ip, config.server.port);
    let defaults = QuoteDefaults::from(&config.quote);
    info!(
        "Quote defaults: slippage {} bps, warn at {}%, block at {}%",
        defaults.slippage_bps, defaults.policy.warn_pct, defaults.policy.block_pct
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for CTRL+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    };

    let (bound, server) = warp::serve(routes(defaults))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", bound);
    server.await;

    info!("Quote API stopped");
    Ok(())
}
