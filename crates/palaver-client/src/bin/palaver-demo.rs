//! Headless Palaver session.
//!
//! Connects to a running service, syncs, and logs session events until
//! Ctrl+C. Useful for exercising the sync core without any rendering layer.
//!
//! Environment:
//! - `PALAVER_SERVER_URL` -- service base URL (default `http://localhost:8080`)
//! - `PALAVER_NODE_ID`    -- this client's node identity (required)
//! - `PALAVER_POLL_SECS`  -- poll interval override

use std::time::Duration;

use anyhow::Context;
use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;

use palaver_client::{Session, SessionConfig};
use palaver_shared::types::NodeId;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,palaver_client=debug")),
        )
        .init();

    info!("Starting Palaver demo session v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Build configuration from the environment
    // -----------------------------------------------------------------------
    let base_url = std::env::var("PALAVER_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let node_id = std::env::var("PALAVER_NODE_ID")
        .context("PALAVER_NODE_ID must name this client's node identity")?;

    let mut config = SessionConfig::new(base_url, NodeId::new(node_id));

    if let Ok(secs) = std::env::var("PALAVER_POLL_SECS") {
        if let Ok(secs) = secs.parse::<u64>() {
            config.poll_interval = Duration::from_secs(secs);
        }
    }

    config.snapshot_dir =
        ProjectDirs::from("com", "palaver", "palaver").map(|dirs| dirs.data_dir().join("session"));

    info!(server = %config.base_url, node = %config.node_id, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Run the session until Ctrl+C, logging events as they arrive
    // -----------------------------------------------------------------------
    let (session, mut events) = Session::connect(config);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => info!(?event, "session event"),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    session.shutdown().await;
    Ok(())
}
