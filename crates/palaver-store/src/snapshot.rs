//! Best-effort session snapshot.
//!
//! The store's serializable state is written to a JSON file so a restarted
//! session can warm-start with the previous view instead of an empty one.
//! This is not part of the correctness contract: the first refresh replaces
//! everything anyway, and callers are expected to log and ignore failures.

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::store::ConversationState;

const SNAPSHOT_FILE: &str = "session.json";

/// Load the snapshot from `dir`, if one exists.
pub fn load(dir: &Path) -> Result<Option<ConversationState>> {
    let path = dir.join(SNAPSHOT_FILE);

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let state = serde_json::from_slice(&bytes)?;
    debug!(path = %path.display(), "session snapshot loaded");
    Ok(Some(state))
}

/// Write the snapshot into `dir`, creating the directory if needed.
pub fn save(dir: &Path, state: &ConversationState) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(SNAPSHOT_FILE);
    std::fs::write(&path, serde_json::to_vec(state)?)?;

    debug!(path = %path.display(), "session snapshot written");
    Ok(())
}
