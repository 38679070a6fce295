use thiserror::Error;

/// Errors produced by the snapshot layer.
///
/// Store mutations themselves cannot fail; only reading and writing the
/// session snapshot touches the filesystem.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Generic I/O error (reading or writing the snapshot file).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot file did not contain a valid state document.
    #[error("Snapshot decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
