use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wiretun_exporter::{service, uapi, Collector, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::parse();

    let peer_names = cfg.peer_names().context("failed to load peer names")?;

    let client = uapi::Client::new(&cfg.socket_dir);
    // Fail fast if the devices can't be queried at all.
    let devices = client
        .devices()
        .await
        .with_context(|| format!("failed to fetch WireGuard devices from {:?}", cfg.socket_dir))?;
    info!("found {} WireGuard devices", devices.len());

    let collector = Arc::new(Collector::new(client, Some(peer_names)));
    let listener = TcpListener::bind(cfg.metrics_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.metrics_addr))?;

    service::serve(listener, service::router(collector, &cfg.metrics_path)).await?;
    Ok(())
}
