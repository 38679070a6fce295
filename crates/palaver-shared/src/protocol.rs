//! Request and response shapes spoken to the remote messaging service.
//!
//! The service accepts a single-key JSON object per call: the key names the
//! operation, the value is its positional argument tuple. Serde's externally
//! tagged enum representation produces exactly that shape, and the exhaustive
//! enum keeps the operation set closed at compile time.

use serde::{Deserialize, Serialize};

use crate::model::AttachmentRef;
use crate::types::{ConversationId, FileId, NodeId};

/// One variant per remote operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RpcRequest {
    /// List conversation summaries. The service expects an empty string
    /// argument here, not `null`.
    GetConversations(String),

    /// Full message list for one conversation.
    GetMessages(ConversationId),

    /// Send a text message: (recipient, content). The recipient may be a
    /// node address or a group conversation id.
    SendMessage(NodeId, String),

    /// Create a named group: (name, members).
    CreateGroup(String, Vec<NodeId>),

    /// Add a member to an existing group: (group id, member).
    AddGroupMember(ConversationId, NodeId),

    /// Upload attachment bytes: (file name, mime type, bytes).
    UploadFile(String, String, Vec<u8>),

    /// Fetch attachment bytes: (file id, owner node).
    DownloadFile(FileId, NodeId),

    /// Send a message carrying an attachment: (recipient, content, attachment).
    SendFileMessage(NodeId, String, AttachmentRef),
}

impl RpcRequest {
    pub fn get_conversations() -> Self {
        Self::GetConversations(String::new())
    }

    /// Operation name, as it appears as the request object's key.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::GetConversations(_) => "GetConversations",
            Self::GetMessages(_) => "GetMessages",
            Self::SendMessage(..) => "SendMessage",
            Self::CreateGroup(..) => "CreateGroup",
            Self::AddGroupMember(..) => "AddGroupMember",
            Self::UploadFile(..) => "UploadFile",
            Self::DownloadFile(..) => "DownloadFile",
            Self::SendFileMessage(..) => "SendFileMessage",
        }
    }
}

/// Service reply envelope: `{"Ok": T}` or `{"Err": "reason"}`, never both.
/// A non-2xx HTTP status is a transport failure and never reaches this type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RpcReply<T> {
    Ok(T),
    Err(String),
}

impl<T> RpcReply<T> {
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(reason) => Err(reason),
        }
    }
}
