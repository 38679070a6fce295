use serde::Serialize;
use tokio::sync::mpsc;

use palaver_shared::types::{ConversationId, FileId};

/// Notifications for the rendering layer.
///
/// Events carry enough to decide what to re-render; the data itself is read
/// back from the store and cache handles.
#[derive(Debug, Clone, Serialize)]
pub enum SessionEvent {
    /// The conversation list was replaced.
    ConversationsUpdated { count: usize },

    /// The selected conversation's message sequence was replaced.
    MessagesUpdated {
        conversation_id: ConversationId,
        count: usize,
    },

    /// An attachment finished loading into the cache.
    AttachmentLoaded { file_id: FileId },

    /// A background refresh failed; the scheduler keeps running and state
    /// fell back to an empty result.
    RefreshFailed { detail: String },
}

/// Emit without blocking the sync path; a full or closed channel is the
/// renderer's problem, not the scheduler's.
pub(crate) fn emit(events: &mpsc::Sender<SessionEvent>, event: SessionEvent) {
    if let Err(e) = events.try_send(event) {
        tracing::warn!(error = %e, "failed to emit session event");
    }
}
