//! The sync scheduler: keeps the conversation store fresh.
//!
//! Two trigger sources drive the same refresh procedure, a periodic timer
//! and the opaque push signal channel, multiplexed in one `tokio::select!`
//! loop. Each trigger spawns the refresh, so a slow refresh never delays the
//! next one; overlapping refreshes are permitted and resolved by a
//! generation token instead of "whichever finishes last wins":
//!
//! - every refresh captures a monotonically increasing token at issue time,
//!   and a completion is applied only while its token is still the newest
//!   issued, so a stale completion is discarded rather than applied;
//! - a fetched message list is additionally applied only if the selection
//!   at completion time still names the conversation it was fetched for.
//!
//! Fetch failures never stop the scheduler: the result falls back to empty,
//! the cause is logged, and the next tick runs as scheduled.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use palaver_cache::{wants_auto_load, AttachmentCache, LoadOutcome};
use palaver_shared::model::ChatMessage;
use palaver_shared::types::ConversationId;
use palaver_store::ConversationStore;
use palaver_transport::{Gateway, PushSignal};

use crate::events::{emit, SessionEvent};

/// Drives refreshes of a [`ConversationStore`] through a [`Gateway`].
pub struct SyncScheduler<G> {
    gateway: Arc<G>,
    store: ConversationStore,
    cache: Arc<AttachmentCache<G>>,
    events: mpsc::Sender<SessionEvent>,
    generation: Arc<AtomicU64>,
}

impl<G> Clone for SyncScheduler<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
            cache: self.cache.clone(),
            events: self.events.clone(),
            generation: self.generation.clone(),
        }
    }
}

impl<G: Gateway> SyncScheduler<G> {
    pub fn new(
        gateway: Arc<G>,
        store: ConversationStore,
        cache: Arc<AttachmentCache<G>>,
        events: mpsc::Sender<SessionEvent>,
    ) -> Self {
        Self {
            gateway,
            store,
            cache,
            events,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Event loop: refresh on every timer tick and every push signal, until
    /// shutdown. The first tick fires immediately, which doubles as the
    /// session's initial fetch.
    pub async fn run(
        self,
        poll_interval: Duration,
        mut push_rx: mpsc::Receiver<PushSignal>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(poll_interval);
        let mut push_open = true;

        info!(interval = ?poll_interval, "sync scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.spawn_refresh();
                }

                signal = push_rx.recv(), if push_open => {
                    match signal {
                        Some(PushSignal) => {
                            debug!("push signal, refreshing");
                            self.spawn_refresh();
                        }
                        None => {
                            // Listener gone; polling keeps the view fresh.
                            info!("push channel closed, continuing on poll interval");
                            push_open = false;
                        }
                    }
                }

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("sync scheduler stopping");
                        break;
                    }
                }
            }
        }
    }

    fn spawn_refresh(&self) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.refresh().await;
        });
    }

    fn issue_token(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }

    /// One full refresh: conversation summaries, then the selected
    /// conversation's message list (if any), both as wholesale replacements.
    pub async fn refresh(&self) {
        let token = self.issue_token();
        debug!(token, "refresh started");

        match self.gateway.fetch_conversations().await {
            Ok(conversations) => {
                if !self.is_current(token) {
                    debug!(token, "discarding stale conversation list");
                    return;
                }

                let count = conversations.len();
                self.store.replace_conversations(conversations);
                emit(&self.events, SessionEvent::ConversationsUpdated { count });

                // Messages are only re-fetched after a successful summary
                // fetch.
                if let Some(conversation) = self.store.selection() {
                    self.refresh_messages(token, conversation).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "conversation fetch failed, falling back to empty list");
                if self.is_current(token) {
                    self.store.replace_conversations(Vec::new());
                }
                emit(
                    &self.events,
                    SessionEvent::RefreshFailed {
                        detail: e.to_string(),
                    },
                );
            }
        }
    }

    /// Select a conversation: fetch its messages and commit selection and
    /// sequence together. Runs under the same token discipline as a
    /// refresh, so a stale select (user already clicked elsewhere) is
    /// discarded on completion.
    pub async fn select(&self, conversation: ConversationId) {
        let token = self.issue_token();
        debug!(token, conversation = %conversation, "selecting conversation");

        let messages = match self.gateway.fetch_messages(&conversation).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    conversation = %conversation,
                    error = %e,
                    "message fetch failed, falling back to empty list"
                );
                emit(
                    &self.events,
                    SessionEvent::RefreshFailed {
                        detail: e.to_string(),
                    },
                );
                Vec::new()
            }
        };

        if !self.is_current(token) {
            debug!(token, "discarding stale selection");
            return;
        }

        self.apply_messages(conversation, messages);
    }

    /// Message-list half of a refresh, gated on both the token and the
    /// selection still naming the fetched conversation.
    async fn refresh_messages(&self, token: u64, conversation: ConversationId) {
        let messages = match self.gateway.fetch_messages(&conversation).await {
            Ok(messages) => messages,
            Err(e) => {
                warn!(
                    conversation = %conversation,
                    error = %e,
                    "message fetch failed, falling back to empty list"
                );
                emit(
                    &self.events,
                    SessionEvent::RefreshFailed {
                        detail: e.to_string(),
                    },
                );
                Vec::new()
            }
        };

        if !self.is_current(token) {
            debug!(token, "discarding stale message list");
            return;
        }
        if self.store.selection().as_ref() != Some(&conversation) {
            debug!(conversation = %conversation, "selection changed, discarding message list");
            return;
        }

        self.apply_messages(conversation, messages);
    }

    fn apply_messages(&self, conversation: ConversationId, messages: Vec<ChatMessage>) {
        self.auto_load(&messages);

        let count = messages.len();
        self.store.select_conversation(conversation.clone(), messages);
        emit(
            &self.events,
            SessionEvent::MessagesUpdated {
                conversation_id: conversation,
                count,
            },
        );
    }

    /// Eagerly load attachments the local identity uploaded itself, so the
    /// author sees an immediate preview. Everything else waits for an
    /// explicit request.
    fn auto_load(&self, messages: &[ChatMessage]) {
        let identity = self.store.identity();

        for message in messages {
            if !wants_auto_load(message, identity.as_ref()) {
                continue;
            }
            let attachment = match &message.attachment {
                Some(attachment) => attachment.clone(),
                None => continue,
            };

            let cache = self.cache.clone();
            let events = self.events.clone();
            tokio::spawn(async move {
                match cache.ensure_loaded(&attachment).await {
                    Ok(LoadOutcome::Fetched) => emit(
                        &events,
                        SessionEvent::AttachmentLoaded {
                            file_id: attachment.file_id.clone(),
                        },
                    ),
                    Ok(LoadOutcome::AlreadyPresent) => {}
                    Err(e) => {
                        warn!(file = %attachment.file_id, error = %e, "attachment auto-load failed");
                    }
                }
            });
        }
    }
}
