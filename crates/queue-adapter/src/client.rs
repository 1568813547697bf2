//! The shared queue client handle and its seven operations.
//!
//! Every operation follows the same steps: validate the request, resolve the
//! queue address, call the [`QueueService`], and hand back its answer. Service
//! failures come back untouched inside [`AdapterError::Service`]; nothing is
//! retried.

use crate::address::queue_url;
use crate::error::AdapterError;
use crate::models::{
    validate_queue_name, CreateQueueOutput, DeleteMessageBatchOutput, DeleteMessageBatchRequest,
    DeleteMessageOutput, DeleteMessageRequest, DeleteQueueOutput, ReceiveMessageOutput,
    ReceiveMessageRequest, SendMessageBatchOutput, SendMessageBatchRequest, SendMessageOutput,
    SendMessageRequest,
};
use crate::service::{
    CreateQueueInput, DeleteMessageBatchInput, DeleteMessageInput, DeleteQueueInput,
    QueueService, ReceiveMessageInput, SendMessageBatchInput, SendMessageInput,
};
use std::fmt;
use std::sync::Arc;

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;

/// Handle to a configured queue service.
///
/// Usually obtained from [`crate::registry::ClientRegistry::get_or_create`]
/// and shared as `Arc<QueueClient>`. Safe for concurrent use.
#[derive(Clone)]
pub struct QueueClient {
    service: Arc<dyn QueueService>,
    tenant_id: String,
    endpoint_url: String,
}

impl QueueClient {
    pub fn new(
        service: Arc<dyn QueueService>,
        endpoint_url: impl Into<String>,
        tenant_id: impl Into<String>,
    ) -> Self {
        Self {
            service,
            tenant_id: tenant_id.into(),
            endpoint_url: endpoint_url.into(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// Address of a queue owned by this client's tenant
    pub fn queue_url(&self, queue_name: &str) -> String {
        queue_url(&self.endpoint_url, &self.tenant_id, queue_name)
    }

    /// Create a queue. The service receives the bare name, not an address.
    pub async fn create_queue(&self, queue_name: &str) -> Result<CreateQueueOutput, AdapterError> {
        validate_queue_name(queue_name)?;
        tracing::debug!(queue_name, "Creating queue");

        let output = self
            .service
            .create_queue(CreateQueueInput {
                queue_name: queue_name.to_string(),
            })
            .await?;
        Ok(output)
    }

    pub async fn delete_queue(&self, queue_name: &str) -> Result<DeleteQueueOutput, AdapterError> {
        validate_queue_name(queue_name)?;
        tracing::debug!(queue_name, "Deleting queue");

        let output = self
            .service
            .delete_queue(DeleteQueueInput {
                queue_url: self.queue_url(queue_name),
            })
            .await?;
        Ok(output)
    }

    /// Send one message. `delay_seconds` is only sent when set.
    pub async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, AdapterError> {
        request.validate()?;
        tracing::debug!(
            queue_name = %request.queue_name,
            delay_seconds = ?request.delay_seconds,
            "Sending message"
        );

        let output = self
            .service
            .send_message(SendMessageInput {
                queue_url: self.queue_url(&request.queue_name),
                message_body: request.message_body,
                delay_seconds: request.delay_seconds,
                message_attributes: request.message_attributes,
            })
            .await?;
        Ok(output)
    }

    /// Receive messages.
    ///
    /// With `wait_time_seconds` set this is a long-poll and the returned
    /// future does not resolve until messages arrive or the wait elapses.
    pub async fn receive_message(
        &self,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageOutput, AdapterError> {
        request.validate()?;
        tracing::debug!(
            queue_name = %request.queue_name,
            max_number_of_messages = ?request.max_number_of_messages,
            wait_time_seconds = ?request.wait_time_seconds,
            "Receiving messages"
        );

        let output = self
            .service
            .receive_message(ReceiveMessageInput {
                queue_url: self.queue_url(&request.queue_name),
                max_number_of_messages: request.max_number_of_messages,
                wait_time_seconds: request.wait_time_seconds,
                visibility_timeout: request.visibility_timeout,
                attribute_names: request.attribute_names,
                message_attribute_names: request.message_attribute_names,
            })
            .await?;
        Ok(output)
    }

    pub async fn delete_message(
        &self,
        request: DeleteMessageRequest,
    ) -> Result<DeleteMessageOutput, AdapterError> {
        request.validate()?;
        tracing::debug!(queue_name = %request.queue_name, "Deleting message");

        let output = self
            .service
            .delete_message(DeleteMessageInput {
                queue_url: self.queue_url(&request.queue_name),
                receipt_handle: request.receipt_handle,
            })
            .await?;
        Ok(output)
    }

    /// Send several messages in one call.
    ///
    /// Entries go out in the given order. A partially failed batch is still
    /// `Ok`; check [`SendMessageBatchOutput::failed`].
    pub async fn send_message_batch(
        &self,
        request: SendMessageBatchRequest,
    ) -> Result<SendMessageBatchOutput, AdapterError> {
        request.validate()?;
        tracing::debug!(
            queue_name = %request.queue_name,
            entries = request.entries.len(),
            "Sending message batch"
        );

        let output = self
            .service
            .send_message_batch(SendMessageBatchInput {
                queue_url: self.queue_url(&request.queue_name),
                entries: request.entries,
            })
            .await?;
        Ok(output)
    }

    /// Delete several messages in one call; see [`Self::send_message_batch`]
    pub async fn delete_message_batch(
        &self,
        request: DeleteMessageBatchRequest,
    ) -> Result<DeleteMessageBatchOutput, AdapterError> {
        request.validate()?;
        tracing::debug!(
            queue_name = %request.queue_name,
            entries = request.entries.len(),
            "Deleting message batch"
        );

        let output = self
            .service
            .delete_message_batch(DeleteMessageBatchInput {
                queue_url: self.queue_url(&request.queue_name),
                entries: request.entries,
            })
            .await?;
        Ok(output)
    }
}

impl fmt::Debug for QueueClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueClient")
            .field("endpoint_url", &self.endpoint_url)
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}
