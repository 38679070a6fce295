/// Application name
pub const APP_NAME: &str = "Palaver";

/// Request path of the remote service's call endpoint
pub const API_PATH: &str = "/api";

/// Request path of the remote service's push (WebSocket) endpoint
pub const WS_PATH: &str = "/ws";

/// Default interval between periodic refreshes, in seconds
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Delay before re-dialing a dropped push channel, in seconds
pub const PUSH_RECONNECT_DELAY_SECS: u64 = 5;

/// Capacity of the push-signal channel
pub const PUSH_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the session event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Maximum attachment upload size in bytes (50 MiB)
pub const MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;
