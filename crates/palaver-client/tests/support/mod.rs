//! Shared test support: a channel-gated gateway fake and model builders.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use tokio::sync::{mpsc, Notify};

use palaver_client::SessionEvent;
use palaver_shared::model::{AttachmentRef, ChatMessage, ConversationSummary};
use palaver_shared::types::{ConversationId, FileId, MessageId, NodeId};
use palaver_transport::{Gateway, GatewayError};

/// One-shot gate: the next `fetch_messages` call signals `entered`, then
/// parks until `release` is notified. Lets a test hold a fetch in flight
/// while it interleaves other work.
pub struct MessageGate {
    pub entered: Notify,
    pub release: Notify,
}

/// In-memory stand-in for the remote messaging service.
pub struct FakeGateway {
    pub conversations: Mutex<Vec<ConversationSummary>>,
    pub messages: Mutex<HashMap<ConversationId, Vec<ChatMessage>>>,
    pub files: Mutex<HashMap<FileId, Vec<u8>>>,
    pub sent: Mutex<Vec<(NodeId, String)>>,
    pub groups: Mutex<Vec<(String, Vec<NodeId>)>>,
    pub conversation_calls: AtomicUsize,
    pub message_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub fail_conversations: AtomicBool,
    pub fail_messages: AtomicBool,
    message_gate: Mutex<Option<Arc<MessageGate>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            conversations: Mutex::new(Vec::new()),
            messages: Mutex::new(HashMap::new()),
            files: Mutex::new(HashMap::new()),
            sent: Mutex::new(Vec::new()),
            groups: Mutex::new(Vec::new()),
            conversation_calls: AtomicUsize::new(0),
            message_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            fail_conversations: AtomicBool::new(false),
            fail_messages: AtomicBool::new(false),
            message_gate: Mutex::new(None),
        })
    }

    pub fn set_conversations(&self, conversations: Vec<ConversationSummary>) {
        *self.conversations.lock().unwrap() = conversations;
    }

    pub fn set_messages(&self, conversation: &str, messages: Vec<ChatMessage>) {
        self.messages
            .lock()
            .unwrap()
            .insert(ConversationId::new(conversation), messages);
    }

    pub fn put_file(&self, file: &str, bytes: Vec<u8>) {
        self.files.lock().unwrap().insert(FileId::new(file), bytes);
    }

    /// Arm the one-shot message gate and return it.
    pub fn arm_message_gate(&self) -> Arc<MessageGate> {
        let gate = Arc::new(MessageGate {
            entered: Notify::new(),
            release: Notify::new(),
        });
        *self.message_gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

impl Gateway for FakeGateway {
    async fn fetch_conversations(&self) -> Result<Vec<ConversationSummary>, GatewayError> {
        self.conversation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_conversations.load(Ordering::SeqCst) {
            return Err(GatewayError::Service("service unavailable".into()));
        }
        Ok(self.conversations.lock().unwrap().clone())
    }

    async fn fetch_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<ChatMessage>, GatewayError> {
        self.message_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.message_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if self.fail_messages.load(Ordering::SeqCst) {
            return Err(GatewayError::Service("conversation not found".into()));
        }

        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(conversation)
            .cloned()
            .unwrap_or_default())
    }

    async fn send_message(&self, recipient: &NodeId, content: &str) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), content.to_string()));
        Ok(())
    }

    async fn create_group(
        &self,
        name: &str,
        members: &[NodeId],
    ) -> Result<ConversationId, GatewayError> {
        self.groups
            .lock()
            .unwrap()
            .push((name.to_string(), members.to_vec()));
        Ok(ConversationId::new(format!("group_{name}")))
    }

    async fn add_group_member(
        &self,
        _group: &ConversationId,
        _member: &NodeId,
    ) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentRef, GatewayError> {
        let reference = AttachmentRef {
            file_id: FileId::new(format!("uploaded-{file_name}")),
            file_name: file_name.to_string(),
            file_size: bytes.len() as u64,
            mime_type: mime_type.to_string(),
            owner_node: NodeId::new("alice.os"),
        };
        self.files
            .lock()
            .unwrap()
            .insert(reference.file_id.clone(), bytes);
        Ok(reference)
    }

    async fn download_file(&self, file: &FileId, _owner: &NodeId) -> Result<Vec<u8>, GatewayError> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .get(file)
            .cloned()
            .ok_or_else(|| GatewayError::Service("file not found".into()))
    }

    async fn send_file_message(
        &self,
        recipient: &NodeId,
        content: &str,
        _attachment: &AttachmentRef,
    ) -> Result<(), GatewayError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.clone(), content.to_string()));
        Ok(())
    }
}

// -- builders ---------------------------------------------------------------

pub fn summary(id: &str) -> ConversationSummary {
    ConversationSummary {
        id: ConversationId::new(id),
        participants: vec![NodeId::new("alice.os"), NodeId::new("bob.os")],
        last_updated: Utc.timestamp_opt(1_000, 0).unwrap(),
        is_group: id.starts_with("group_"),
        group_name: None,
    }
}

pub fn message(id: &str, conversation: &str, sender: &str, secs: i64) -> ChatMessage {
    ChatMessage {
        id: MessageId::new(id),
        conversation_id: ConversationId::new(conversation),
        sender: NodeId::new(sender),
        recipient: Some(NodeId::new("bob.os")),
        recipients: None,
        content: format!("message {id}"),
        timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        delivered: false,
        attachment: None,
        reply_to: None,
    }
}

pub fn attachment(file: &str, owner: &str) -> AttachmentRef {
    AttachmentRef {
        file_id: FileId::new(file),
        file_name: format!("{file}.bin"),
        file_size: 3,
        mime_type: "application/octet-stream".to_string(),
        owner_node: NodeId::new(owner),
    }
}

pub fn with_attachment(mut message: ChatMessage, reference: AttachmentRef) -> ChatMessage {
    message.attachment = Some(reference);
    message
}

/// Receive events until one matches, with a timeout.
pub async fn wait_for<F>(events: &mut mpsc::Receiver<SessionEvent>, mut matches: F) -> SessionEvent
where
    F: FnMut(&SessionEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Some(event) if matches(&event) => return event,
                Some(_) => continue,
                None => panic!("event channel closed while waiting"),
            }
        }
    })
    .await
    .expect("timed out waiting for session event")
}
