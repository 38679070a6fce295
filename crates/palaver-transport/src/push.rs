//! Push-notification subscription.
//!
//! The service exposes a WebSocket endpoint identified by the local node id
//! and a per-run process id. Payload content is never interpreted: every
//! text or binary frame becomes one opaque [`PushSignal`], and the sync
//! scheduler treats each signal purely as "something changed, refresh".
//!
//! The listener runs in a background tokio task and re-dials with a fixed
//! delay after a lost connection; polling remains the safety net while the
//! channel is down.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use palaver_shared::constants::{PUSH_CHANNEL_CAPACITY, PUSH_RECONNECT_DELAY_SECS, WS_PATH};
use palaver_shared::types::NodeId;

/// An opaque "something changed" signal.
#[derive(Debug, Clone, Copy)]
pub struct PushSignal;

/// Configuration for the push listener.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Service base URL (`http://...` or `https://...`).
    pub base_url: String,
    /// Local node identity.
    pub node_id: NodeId,
    /// Process identifier for this client run.
    pub process_id: String,
}

/// Handle to the background listener task.
pub struct PushHandle {
    task: JoinHandle<()>,
}

impl PushHandle {
    /// Stop the listener. Safe to call once at session end; the signal
    /// channel closes as a consequence.
    pub fn shutdown(&self) {
        self.task.abort();
    }
}

/// Spawn the push listener in a background tokio task.
///
/// Returns the signal channel receiver and a handle used to stop the task.
pub fn spawn_push_listener(config: PushConfig) -> (mpsc::Receiver<PushSignal>, PushHandle) {
    let (signal_tx, signal_rx) = mpsc::channel::<PushSignal>(PUSH_CHANNEL_CAPACITY);

    let task = tokio::spawn(async move {
        let url = subscription_url(&config.base_url, &config.node_id, &config.process_id);
        let reconnect_delay = Duration::from_secs(PUSH_RECONNECT_DELAY_SECS);

        loop {
            match connect_async(url.as_str()).await {
                Ok((mut stream, _)) => {
                    info!(url = %url, "push channel connected");

                    while let Some(frame) = stream.next().await {
                        match frame {
                            Ok(Message::Text(_)) | Ok(Message::Binary(_)) => {
                                debug!("push signal received");
                                if signal_tx.send(PushSignal).await.is_err() {
                                    // Receiver gone: the session ended.
                                    return;
                                }
                            }
                            Ok(Message::Close(_)) => {
                                info!("push channel closed by service");
                                break;
                            }
                            Ok(_) => {} // ping/pong
                            Err(e) => {
                                warn!(error = %e, "push channel read failed");
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "push channel connect failed");
                }
            }

            if signal_tx.is_closed() {
                return;
            }
            tokio::time::sleep(reconnect_delay).await;
        }
    });

    (signal_rx, PushHandle { task })
}

/// Derive the WebSocket subscription URL from the service base URL.
fn subscription_url(base_url: &str, node_id: &NodeId, process_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let ws_base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };

    format!("{ws_base}{WS_PATH}?node={node_id}&process={process_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_url_swaps_scheme_and_appends_identity() {
        let url = subscription_url("http://localhost:8080", &NodeId::new("alice.os"), "p1");
        assert_eq!(url, "ws://localhost:8080/ws?node=alice.os&process=p1");

        let url = subscription_url("https://chat.example/", &NodeId::new("alice.os"), "p1");
        assert_eq!(url, "wss://chat.example/ws?node=alice.os&process=p1");
    }

    #[test]
    fn subscription_url_keeps_explicit_ws_schemes() {
        let url = subscription_url("ws://localhost:9000", &NodeId::new("a.os"), "p2");
        assert_eq!(url, "ws://localhost:9000/ws?node=a.os&process=p2");
    }
}
