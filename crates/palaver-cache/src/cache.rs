//! Single-flight attachment cache.
//!
//! One entry per file id, either loading or loaded. The check-and-mark in
//! [`AttachmentCache::ensure_loaded`] happens synchronously under a mutex
//! that is never held across an await, which is the whole single-flight
//! mechanism: a second caller for the same file sees the mark and returns
//! before any network traffic.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{debug, info};

use palaver_shared::model::{AttachmentRef, ChatMessage};
use palaver_shared::types::{FileId, NodeId};
use palaver_transport::Gateway;

use crate::decode::{decode, DecodedContent};
use crate::error::CacheError;

/// A fully loaded attachment, shared with the rendering layer.
#[derive(Debug, Clone)]
pub struct LoadedAttachment {
    pub file_id: FileId,
    pub file_name: String,
    pub mime_type: String,
    /// The raw fetched bytes.
    pub bytes: Bytes,
    /// Display-ready decode of the bytes.
    pub content: DecodedContent,
}

/// What an `ensure_loaded` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// This call performed the download and stored the result.
    Fetched,
    /// The file was already loaded, or another load is in flight; no
    /// network call was made.
    AlreadyPresent,
}

enum Slot {
    Loading,
    Loaded(Arc<LoadedAttachment>),
}

/// Attachment cache keyed by file id.
pub struct AttachmentCache<G> {
    gateway: Arc<G>,
    entries: Mutex<HashMap<FileId, Slot>>,
}

impl<G: Gateway> AttachmentCache<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<FileId, Slot>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Load an attachment unless it is already loaded or loading.
    ///
    /// On failure the entry reverts to absent and the error is surfaced;
    /// a later call for the same file re-attempts the download.
    pub async fn ensure_loaded(
        &self,
        attachment: &AttachmentRef,
    ) -> Result<LoadOutcome, CacheError> {
        // Synchronous check-and-mark: this is the single-flight point.
        {
            let mut entries = self.entries();
            if entries.contains_key(&attachment.file_id) {
                debug!(file = %attachment.file_id, "attachment already loaded or in flight");
                return Ok(LoadOutcome::AlreadyPresent);
            }
            entries.insert(attachment.file_id.clone(), Slot::Loading);
        }

        debug!(
            file = %attachment.file_id,
            owner = %attachment.owner_node,
            "downloading attachment"
        );

        let bytes = match self
            .gateway
            .download_file(&attachment.file_id, &attachment.owner_node)
            .await
        {
            Ok(bytes) => bytes,
            Err(e) => {
                self.entries().remove(&attachment.file_id);
                return Err(e.into());
            }
        };

        let content = match decode(&attachment.mime_type, &bytes) {
            Ok(content) => content,
            Err(e) => {
                self.entries().remove(&attachment.file_id);
                return Err(e.into());
            }
        };

        let loaded = Arc::new(LoadedAttachment {
            file_id: attachment.file_id.clone(),
            file_name: attachment.file_name.clone(),
            mime_type: attachment.mime_type.clone(),
            bytes: Bytes::from(bytes),
            content,
        });

        info!(
            file = %attachment.file_id,
            name = %attachment.file_name,
            size = loaded.bytes.len(),
            "attachment loaded"
        );

        self.entries()
            .insert(attachment.file_id.clone(), Slot::Loaded(loaded));
        Ok(LoadOutcome::Fetched)
    }

    /// The loaded attachment, or `None` if absent or still loading.
    pub fn get(&self, file: &FileId) -> Option<Arc<LoadedAttachment>> {
        match self.entries().get(file) {
            Some(Slot::Loaded(loaded)) => Some(loaded.clone()),
            _ => None,
        }
    }
}

/// Auto-load policy: only the author's own uploads are fetched eagerly, so
/// the uploader gets an immediate preview while remote content is never
/// bulk-downloaded unsolicited.
pub fn wants_auto_load(message: &ChatMessage, identity: Option<&NodeId>) -> bool {
    match (&message.attachment, identity) {
        (Some(_), Some(own)) => &message.sender == own,
        _ => false,
    }
}
