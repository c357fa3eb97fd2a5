//! beacond — link-local hello beacon daemon.
//!
//! Announces this node's presence over ff02::1 multicast on a jittered
//! interval and keeps a bounded, RSSI-ranked table of the neighbors it
//! hears back.

use std::time::Duration;

use anyhow::{Context, Result};

use beacon_core::config::BeaconConfig;
use beacon_core::wire::NodeId;
use beacon_services::new_shared_table;

mod hello;
mod listener;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load config
    if let Err(e) = BeaconConfig::write_default_if_missing() {
        tracing::warn!(error = %e, "failed to write default config");
    }
    let config = BeaconConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        BeaconConfig::default()
    });

    let interface = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.network.interface.clone());
    if interface.is_empty() {
        anyhow::bail!("no network interface: pass one as the first argument or set network.interface");
    }
    tracing::info!(interface, "beacond starting");

    let interface_index = hello::if_index(&interface)?;
    let port = config.network.hello_port();

    // Node id: configured, else derived from the process id.
    let node_id = if config.network.node_id != 0 {
        NodeId::from_u16(config.network.node_id)
    } else {
        NodeId::from_u16(std::process::id() as u16)
    };
    tracing::info!(node = %node_id, "node identity");

    // A zero-capacity table is a configuration fault — refuse to start
    // rather than run a table that cannot admit anything.
    let table = new_shared_table(config.neighbors.max_neighbors)
        .context("invalid neighbors.max_neighbors")?;
    tracing::info!(capacity = config.neighbors.max_neighbors, "neighbor table ready");

    let announce_settings = hello::AnnounceSettings {
        base: Duration::from_secs(config.announce.base_secs),
        jitter: Duration::from_secs(config.announce.jitter_secs),
        message: config.announce.message.clone().into_bytes(),
        rssi: config.announce.rssi,
    };

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let announce_task = tokio::spawn(async move {
        if let Err(e) = hello::announce_loop(node_id, interface_index, port, announce_settings).await
        {
            tracing::error!(error = %e, "hello broadcast failed");
        }
    });

    let listener_task = tokio::spawn(listener::listener_loop(
        table.clone(),
        interface_index,
        port,
        node_id,
    ));

    // ── Wait for exit ────────────────────────────────────────────────────────

    let mut shutdown_rx = shutdown_tx.subscribe();

    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = announce_task      => tracing::error!("announce task exited: {:?}", r),
        r = listener_task      => tracing::error!("listener task exited: {:?}", r),
    }

    Ok(())
}
