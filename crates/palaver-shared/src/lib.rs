//! # palaver-shared
//!
//! Domain types and wire protocol shared by every Palaver crate.
//!
//! Nothing in here performs I/O: this crate defines the identifiers, the
//! conversation/message models, the request/response shapes spoken to the
//! remote messaging service, and the constants the other crates agree on.

pub mod constants;
pub mod model;
pub mod protocol;
pub mod types;

pub use model::{AttachmentRef, ChatMessage, ConversationSummary, ReplyContext};
pub use protocol::{RpcReply, RpcRequest};
pub use types::{ConversationId, FileId, MessageId, NodeId};
