//! Session lifecycle and action operations.
//!
//! A [`Session`] owns the wiring: gateway, store, cache, push listener, and
//! the scheduler task. Action operations call the gateway directly and, on
//! success, trigger an immediate refresh so the sender sees their own
//! message without waiting for the next poll.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use palaver_cache::{AttachmentCache, CacheError, LoadOutcome};
use palaver_shared::constants::{EVENT_CHANNEL_CAPACITY, MAX_UPLOAD_SIZE};
use palaver_shared::model::AttachmentRef;
use palaver_shared::types::{ConversationId, NodeId};
use palaver_store::{snapshot, ConversationStore};
use palaver_transport::{
    spawn_push_listener, Gateway, HttpGateway, PushConfig, PushHandle, PushSignal,
};

use crate::config::SessionConfig;
use crate::error::ActionError;
use crate::events::{emit, SessionEvent};
use crate::scheduler::SyncScheduler;

/// One client session against one remote service.
pub struct Session<G = HttpGateway> {
    gateway: Arc<G>,
    store: ConversationStore,
    cache: Arc<AttachmentCache<G>>,
    scheduler: SyncScheduler<G>,
    events: mpsc::Sender<SessionEvent>,
    shutdown: watch::Sender<bool>,
    push: Option<PushHandle>,
    sync_task: JoinHandle<()>,
    snapshot_dir: Option<PathBuf>,
}

impl Session<HttpGateway> {
    /// Connect to the configured service and start syncing.
    ///
    /// Returns the session handle and the event channel for the rendering
    /// layer.
    pub fn connect(config: SessionConfig) -> (Self, mpsc::Receiver<SessionEvent>) {
        let gateway = Arc::new(HttpGateway::new(&config.base_url));

        let (push_rx, push_handle) = spawn_push_listener(PushConfig {
            base_url: config.base_url.clone(),
            node_id: config.node_id.clone(),
            process_id: Uuid::new_v4().to_string(),
        });

        Self::start(gateway, push_rx, Some(push_handle), config)
    }
}

impl<G: Gateway> Session<G> {
    /// Start a session over an existing gateway and push channel.
    ///
    /// This is the seam tests use to substitute fakes for the HTTP
    /// transport; `connect` is a thin wrapper around it.
    pub fn with_gateway(
        gateway: Arc<G>,
        push_rx: mpsc::Receiver<PushSignal>,
        config: SessionConfig,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        Self::start(gateway, push_rx, None, config)
    }

    fn start(
        gateway: Arc<G>,
        push_rx: mpsc::Receiver<PushSignal>,
        push: Option<PushHandle>,
        config: SessionConfig,
    ) -> (Self, mpsc::Receiver<SessionEvent>) {
        let store = ConversationStore::new();

        // Best-effort warm start; the first refresh replaces all of it.
        if let Some(dir) = &config.snapshot_dir {
            match snapshot::load(dir) {
                Ok(Some(state)) => {
                    info!(conversations = state.conversations.len(), "warm start from snapshot");
                    store.restore(state);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "session snapshot unreadable, starting cold"),
            }
        }

        // Identity always comes from the live config, never the snapshot.
        store.set_identity(config.node_id.clone());

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let cache = Arc::new(AttachmentCache::new(gateway.clone()));
        let scheduler = SyncScheduler::new(
            gateway.clone(),
            store.clone(),
            cache.clone(),
            events_tx.clone(),
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sync_task = tokio::spawn(scheduler.clone().run(
            config.poll_interval,
            push_rx,
            shutdown_rx,
        ));

        info!(node = %config.node_id, server = %config.base_url, "session started");

        let session = Self {
            gateway,
            store,
            cache,
            scheduler,
            events: events_tx,
            shutdown: shutdown_tx,
            push,
            sync_task,
            snapshot_dir: config.snapshot_dir,
        };
        (session, events_rx)
    }

    /// The shared state handle for the rendering layer.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// The attachment cache handle for the rendering layer.
    pub fn cache(&self) -> &Arc<AttachmentCache<G>> {
        &self.cache
    }

    /// Run one refresh immediately, outside the schedule.
    pub async fn refresh(&self) {
        self.scheduler.refresh().await;
    }

    // -- actions ------------------------------------------------------------

    /// Send a text message to a node address or group id.
    pub async fn send_message(&self, recipient: &NodeId, content: &str) -> Result<(), ActionError> {
        if recipient.as_str().trim().is_empty() || content.trim().is_empty() {
            return Err(ActionError::EmptyMessage);
        }

        self.gateway.send_message(recipient, content).await?;
        info!(recipient = %recipient, "message sent");

        self.spawn_refresh();
        Ok(())
    }

    /// Send a message carrying an already-uploaded attachment.
    pub async fn send_file_message(
        &self,
        recipient: &NodeId,
        content: &str,
        attachment: &AttachmentRef,
    ) -> Result<(), ActionError> {
        if recipient.as_str().trim().is_empty() {
            return Err(ActionError::EmptyMessage);
        }

        self.gateway
            .send_file_message(recipient, content, attachment)
            .await?;
        info!(recipient = %recipient, file = %attachment.file_id, "file message sent");

        self.spawn_refresh();
        Ok(())
    }

    /// Upload attachment bytes; returns the service-assigned reference to
    /// hand to [`Session::send_file_message`].
    pub async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentRef, ActionError> {
        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(ActionError::FileTooLarge {
                size: bytes.len(),
                max: MAX_UPLOAD_SIZE,
            });
        }

        let attachment = self.gateway.upload_file(file_name, mime_type, bytes).await?;
        info!(
            file = %attachment.file_id,
            name = %attachment.file_name,
            size = attachment.file_size,
            "file uploaded"
        );
        Ok(attachment)
    }

    /// Create a named group; returns its conversation id.
    pub async fn create_group(
        &self,
        name: &str,
        members: &[NodeId],
    ) -> Result<ConversationId, ActionError> {
        if name.trim().is_empty() {
            return Err(ActionError::EmptyGroupName);
        }

        let group = self.gateway.create_group(name, members).await?;
        info!(group = %group, name, "group created");

        self.spawn_refresh();
        Ok(group)
    }

    /// Add a member to an existing group.
    pub async fn add_group_member(
        &self,
        group: &ConversationId,
        member: &NodeId,
    ) -> Result<(), ActionError> {
        self.gateway.add_group_member(group, member).await?;
        info!(group = %group, member = %member, "group member added");

        self.spawn_refresh();
        Ok(())
    }

    /// Select a conversation: fetches its messages, commits selection and
    /// sequence together, and auto-loads the local identity's own
    /// attachments.
    pub async fn select_conversation(&self, conversation: ConversationId) {
        self.scheduler.select(conversation).await;
    }

    /// Clear the selection. No network; in-flight fetches for the old
    /// selection are not aborted, their results are discarded on arrival.
    pub fn deselect(&self) {
        self.store.clear_selection();
    }

    /// Explicitly load an attachment (the path for other senders' files,
    /// which are never auto-loaded).
    pub async fn load_attachment(&self, attachment: &AttachmentRef) -> Result<(), CacheError> {
        match self.cache.ensure_loaded(attachment).await? {
            LoadOutcome::Fetched => emit(
                &self.events,
                SessionEvent::AttachmentLoaded {
                    file_id: attachment.file_id.clone(),
                },
            ),
            LoadOutcome::AlreadyPresent => {}
        }
        Ok(())
    }

    fn spawn_refresh(&self) {
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            scheduler.refresh().await;
        });
    }

    /// Stop the scheduler and push listener and write a final snapshot.
    pub async fn shutdown(self) {
        info!("session shutting down");

        let _ = self.shutdown.send(true);
        if let Some(push) = &self.push {
            push.shutdown();
        }

        if let Some(dir) = &self.snapshot_dir {
            if let Err(e) = snapshot::save(dir, &self.store.snapshot()) {
                warn!(error = %e, "failed to write session snapshot");
            }
        }

        let _ = self.sync_task.await;
    }
}
