use thiserror::Error;

use palaver_transport::GatewayError;

/// Errors from action operations (send, create group, upload, ...).
///
/// Action failures are user-visible and leave prior state untouched; none
/// of these operations are retried automatically.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("recipient and message content cannot be empty")]
    EmptyMessage,

    #[error("group name cannot be empty")]
    EmptyGroupName,

    #[error("file too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
