//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

use palaver_shared::constants::DEFAULT_POLL_INTERVAL_SECS;
use palaver_shared::types::NodeId;

/// Configuration for one client session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the remote messaging service
    /// (e.g. `http://localhost:8080`).
    pub base_url: String,

    /// This client's node identity. Issued externally; the session only
    /// carries it.
    pub node_id: NodeId,

    /// Interval between periodic refreshes.
    pub poll_interval: Duration,

    /// Directory for the best-effort session snapshot.
    /// `None` disables warm starts.
    pub snapshot_dir: Option<PathBuf>,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            base_url: base_url.into(),
            node_id,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            snapshot_dir: None,
        }
    }
}
