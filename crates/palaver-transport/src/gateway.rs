//! Request/response calls to the remote messaging service.
//!
//! [`Gateway`] is the seam the sync scheduler and attachment cache are
//! written against; [`HttpGateway`] is the production implementation, one
//! JSON POST per operation against the service's fixed `/api` endpoint.

use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::debug;

use palaver_shared::constants::API_PATH;
use palaver_shared::model::{AttachmentRef, ChatMessage, ConversationSummary};
use palaver_shared::protocol::{RpcReply, RpcRequest};
use palaver_shared::types::{ConversationId, FileId, NodeId};

use crate::error::GatewayError;

/// The call surface of the remote messaging service.
///
/// Futures are declared `Send` so implementations can be driven from spawned
/// tasks; tests substitute channel-gated fakes for the HTTP implementation.
pub trait Gateway: Send + Sync + 'static {
    /// List all conversation summaries.
    fn fetch_conversations(
        &self,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>, GatewayError>> + Send;

    /// Full message list for one conversation.
    fn fetch_messages(
        &self,
        conversation: &ConversationId,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, GatewayError>> + Send;

    /// Send a text message to a node address or group id.
    fn send_message(
        &self,
        recipient: &NodeId,
        content: &str,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Create a named group; returns the new group's conversation id.
    fn create_group(
        &self,
        name: &str,
        members: &[NodeId],
    ) -> impl Future<Output = Result<ConversationId, GatewayError>> + Send;

    /// Add a member to an existing group.
    fn add_group_member(
        &self,
        group: &ConversationId,
        member: &NodeId,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Upload attachment bytes; returns the service-assigned reference.
    fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<AttachmentRef, GatewayError>> + Send;

    /// Fetch attachment bytes from the node that owns them.
    fn download_file(
        &self,
        file: &FileId,
        owner: &NodeId,
    ) -> impl Future<Output = Result<Vec<u8>, GatewayError>> + Send;

    /// Send a message carrying an attachment.
    fn send_file_message(
        &self,
        recipient: &NodeId,
        content: &str,
        attachment: &AttachmentRef,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;
}

/// HTTP implementation of [`Gateway`].
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    /// Build a gateway for a service base URL (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), API_PATH),
        }
    }

    /// Issue one call: POST the tagged request object, check the HTTP
    /// status, then unwrap the `Ok`/`Err` reply envelope.
    async fn call<T: DeserializeOwned>(&self, request: &RpcRequest) -> Result<T, GatewayError> {
        debug!(operation = request.operation(), "gateway call");

        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status(status));
        }

        let body = response.bytes().await?;
        let reply: RpcReply<T> = serde_json::from_slice(&body)?;
        reply.into_result().map_err(GatewayError::Service)
    }
}

impl Gateway for HttpGateway {
    async fn fetch_conversations(&self) -> Result<Vec<ConversationSummary>, GatewayError> {
        self.call(&RpcRequest::get_conversations()).await
    }

    async fn fetch_messages(
        &self,
        conversation: &ConversationId,
    ) -> Result<Vec<ChatMessage>, GatewayError> {
        self.call(&RpcRequest::GetMessages(conversation.clone())).await
    }

    async fn send_message(&self, recipient: &NodeId, content: &str) -> Result<(), GatewayError> {
        // The service acknowledges with a bare `true`.
        let _: bool = self
            .call(&RpcRequest::SendMessage(recipient.clone(), content.to_string()))
            .await?;
        Ok(())
    }

    async fn create_group(
        &self,
        name: &str,
        members: &[NodeId],
    ) -> Result<ConversationId, GatewayError> {
        self.call(&RpcRequest::CreateGroup(name.to_string(), members.to_vec()))
            .await
    }

    async fn add_group_member(
        &self,
        group: &ConversationId,
        member: &NodeId,
    ) -> Result<(), GatewayError> {
        let _: bool = self
            .call(&RpcRequest::AddGroupMember(group.clone(), member.clone()))
            .await?;
        Ok(())
    }

    async fn upload_file(
        &self,
        file_name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<AttachmentRef, GatewayError> {
        self.call(&RpcRequest::UploadFile(
            file_name.to_string(),
            mime_type.to_string(),
            bytes,
        ))
        .await
    }

    async fn download_file(&self, file: &FileId, owner: &NodeId) -> Result<Vec<u8>, GatewayError> {
        self.call(&RpcRequest::DownloadFile(file.clone(), owner.clone()))
            .await
    }

    async fn send_file_message(
        &self,
        recipient: &NodeId,
        content: &str,
        attachment: &AttachmentRef,
    ) -> Result<(), GatewayError> {
        let _: bool = self
            .call(&RpcRequest::SendFileMessage(
                recipient.clone(),
                content.to_string(),
                attachment.clone(),
            ))
            .await?;
        Ok(())
    }
}
