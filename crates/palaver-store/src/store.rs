//! The conversation store: a shared handle over the client-local state.
//!
//! The handle is passed explicitly to the components that read or mutate
//! state (scheduler, session, rendering layer); there is no ambient global.
//! Every mutation goes through one of the operations below; each locks,
//! replaces whole fields, and unlocks, so no partially-applied state is ever
//! observable.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use palaver_shared::model::{ChatMessage, ConversationSummary};
use palaver_shared::types::{ConversationId, NodeId};

use crate::merge;

/// The client-local aggregate state.
///
/// Created empty at session start, replaced wholesale by fetch results, and
/// cleared when the user deselects a conversation. Serializable so it can be
/// carried through the best-effort session snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    /// Conversation summaries in the order the last fetch delivered them.
    pub conversations: Vec<ConversationSummary>,
    /// Currently selected conversation, if any. Best-effort validity: a
    /// stale id is tolerated and never forcibly cleared by a fetch.
    pub selected_conversation_id: Option<ConversationId>,
    /// Message sequence of the selected conversation, ascending by
    /// timestamp, unique by id.
    pub selected_messages: Vec<ChatMessage>,
    /// This client's node identity, set once per session.
    pub identity: Option<NodeId>,
}

/// Shared handle over [`ConversationState`].
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<Mutex<ConversationState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Every operation replaces whole fields under the lock, so even a lock
    // poisoned by a panicking reader cannot expose a half-written state.
    fn guard(&self) -> MutexGuard<'_, ConversationState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- mutations ----------------------------------------------------------

    /// Replace the conversation list with a fetch result.
    pub fn replace_conversations(&self, conversations: Vec<ConversationSummary>) {
        debug!(count = conversations.len(), "replacing conversation list");
        self.guard().conversations = conversations;
    }

    /// Select a conversation, replacing both the selection and the full
    /// message sequence.
    pub fn select_conversation(&self, id: ConversationId, messages: Vec<ChatMessage>) {
        debug!(conversation = %id, count = messages.len(), "selecting conversation");
        let mut state = self.guard();
        state.selected_conversation_id = Some(id);
        state.selected_messages = messages;
    }

    /// Clear the selection and its message sequence.
    pub fn clear_selection(&self) {
        let mut state = self.guard();
        state.selected_conversation_id = None;
        state.selected_messages.clear();
    }

    /// Append a single message to the selected sequence via the merger.
    /// Returns whether the message was actually inserted (false on a
    /// duplicate id).
    pub fn append_message(&self, message: ChatMessage) -> bool {
        merge::insert_message(&mut self.guard().selected_messages, message)
    }

    /// Set the local node identity.
    pub fn set_identity(&self, id: NodeId) {
        self.guard().identity = Some(id);
    }

    /// Replace the whole state, e.g. from a session snapshot.
    pub fn restore(&self, state: ConversationState) {
        *self.guard() = state;
    }

    // -- reads --------------------------------------------------------------

    pub fn conversations(&self) -> Vec<ConversationSummary> {
        self.guard().conversations.clone()
    }

    pub fn selection(&self) -> Option<ConversationId> {
        self.guard().selected_conversation_id.clone()
    }

    pub fn selected_messages(&self) -> Vec<ChatMessage> {
        self.guard().selected_messages.clone()
    }

    pub fn identity(&self) -> Option<NodeId> {
        self.guard().identity.clone()
    }

    /// Full copy of the current state, for snapshotting.
    pub fn snapshot(&self) -> ConversationState {
        self.guard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use palaver_shared::types::MessageId;

    fn summary(id: &str) -> ConversationSummary {
        ConversationSummary {
            id: ConversationId::new(id),
            participants: vec![NodeId::new("alice.os"), NodeId::new("bob.os")],
            last_updated: Utc.timestamp_opt(1_000, 0).unwrap(),
            is_group: false,
            group_name: None,
        }
    }

    fn message(id: &str, secs: i64) -> ChatMessage {
        ChatMessage {
            id: MessageId::new(id),
            conversation_id: ConversationId::new("c1"),
            sender: NodeId::new("alice.os"),
            recipient: Some(NodeId::new("bob.os")),
            recipients: None,
            content: String::new(),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            delivered: false,
            attachment: None,
            reply_to: None,
        }
    }

    #[test]
    fn replace_conversations_from_empty() {
        let store = ConversationStore::new();
        assert!(store.conversations().is_empty());

        store.replace_conversations(vec![summary("c1")]);

        let conversations = store.conversations();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].id.as_str(), "c1");
    }

    #[test]
    fn wholesale_replacement_never_merges() {
        let store = ConversationStore::new();
        store.select_conversation(
            ConversationId::new("c1"),
            vec![message("m1", 10), message("m2", 20)],
        );

        // The new list overlaps the old one; replacement must not produce
        // duplicates or keep stale entries.
        store.select_conversation(
            ConversationId::new("c1"),
            vec![message("m2", 20), message("m3", 30)],
        );

        let messages = store.selected_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id.as_str(), "m2");
        assert_eq!(messages[1].id.as_str(), "m3");
    }

    #[test]
    fn clear_selection_drops_messages() {
        let store = ConversationStore::new();
        store.select_conversation(ConversationId::new("c1"), vec![message("m1", 10)]);

        store.clear_selection();

        assert_eq!(store.selection(), None);
        assert!(store.selected_messages().is_empty());
    }

    #[test]
    fn append_message_delegates_to_the_merger() {
        let store = ConversationStore::new();
        store.select_conversation(ConversationId::new("c1"), vec![message("m1", 100)]);

        assert!(store.append_message(message("m2", 50)));
        assert!(!store.append_message(message("m2", 50)));

        let messages = store.selected_messages();
        assert_eq!(messages[0].id.as_str(), "m2");
        assert_eq!(messages[1].id.as_str(), "m1");
    }

    #[test]
    fn snapshot_and_restore_round_trip() {
        let store = ConversationStore::new();
        store.set_identity(NodeId::new("alice.os"));
        store.replace_conversations(vec![summary("c1")]);

        let copy = ConversationStore::new();
        copy.restore(store.snapshot());

        assert_eq!(copy.snapshot(), store.snapshot());
    }
}
