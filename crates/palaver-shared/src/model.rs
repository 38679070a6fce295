//! Domain model structs exchanged with the remote messaging service.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can travel on the
//! wire and into the session snapshot unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ConversationId, FileId, MessageId, NodeId};

// ---------------------------------------------------------------------------
// Conversation summary
// ---------------------------------------------------------------------------

/// A conversation as listed in the sidebar: participants and recency, no
/// message bodies. Summaries are only ever replaced wholesale by a fetch
/// result, never patched in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    /// Unique conversation identifier.
    pub id: ConversationId,
    /// Participant addresses, at least two.
    pub participants: Vec<NodeId>,
    /// When the conversation last changed, as reported by the service.
    pub last_updated: DateTime<Utc>,
    /// Whether this is a named group rather than a direct conversation.
    pub is_group: bool,
    /// Group display name (groups only).
    pub group_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Chat message
// ---------------------------------------------------------------------------

/// A single chat message. Immutable once created: the service appends, the
/// client never edits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    /// Globally unique message identifier.
    pub id: MessageId,
    /// The conversation this message belongs to.
    pub conversation_id: ConversationId,
    /// Sender's address.
    pub sender: NodeId,
    /// Recipient address for direct messages.
    pub recipient: Option<NodeId>,
    /// Recipient addresses for group messages.
    pub recipients: Option<Vec<NodeId>>,
    /// The message text.
    pub content: String,
    /// When the message was sent, as reported by the sender.
    pub timestamp: DateTime<Utc>,
    /// Delivery flag maintained by the service; displayed as-is, never
    /// transitioned by this client.
    pub delivered: bool,
    /// Optional binary attachment reference.
    pub attachment: Option<AttachmentRef>,
    /// Context of the message this one replies to, if any.
    pub reply_to: Option<ReplyContext>,
}

/// Quoted context carried by a reply message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyContext {
    pub message_id: MessageId,
    pub sender: NodeId,
    pub content_preview: String,
}

// ---------------------------------------------------------------------------
// Attachment reference
// ---------------------------------------------------------------------------

/// Metadata for a binary attachment. The bytes themselves live on
/// `owner_node` and are fetched on demand through the attachment cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentRef {
    /// Unique file identifier assigned by the service at upload.
    pub file_id: FileId,
    /// Original file name.
    pub file_name: String,
    /// File size in bytes.
    pub file_size: u64,
    /// MIME type reported at upload.
    pub mime_type: String,
    /// Node holding the canonical bytes.
    pub owner_node: NodeId,
}
