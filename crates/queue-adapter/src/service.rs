//! Capability interface of the queue service.
//!
//! [`QueueService`] is the seam between the adapter's operations and the
//! protocol that actually reaches the service. Inputs are already
//! address-resolved: everything except queue creation targets a queue URL.
//! The production implementation is [`crate::sqs::SqsHttpService`]; tests
//! substitute recording or passthrough doubles.

use crate::error::ServiceError;
use crate::models::{
    CreateQueueOutput, DeleteMessageBatchEntry, DeleteMessageBatchOutput, DeleteMessageOutput,
    DeleteQueueOutput, MessageAttributes, ReceiveMessageOutput, SendMessageBatchEntry,
    SendMessageBatchOutput, SendMessageOutput,
};
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateQueueInput {
    pub queue_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteQueueInput {
    pub queue_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageInput {
    pub queue_url: String,
    pub message_body: String,
    pub delay_seconds: Option<i64>,
    pub message_attributes: MessageAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveMessageInput {
    pub queue_url: String,
    pub max_number_of_messages: Option<i64>,
    pub wait_time_seconds: Option<i64>,
    pub visibility_timeout: Option<i64>,
    pub attribute_names: Vec<String>,
    pub message_attribute_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteMessageInput {
    pub queue_url: String,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageBatchInput {
    pub queue_url: String,
    pub entries: Vec<SendMessageBatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteMessageBatchInput {
    pub queue_url: String,
    pub entries: Vec<DeleteMessageBatchEntry>,
}

/// Operations offered by an SQS-compatible queue service
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Create a queue by bare name
    async fn create_queue(&self, input: CreateQueueInput)
        -> Result<CreateQueueOutput, ServiceError>;

    /// Delete the queue at a URL
    async fn delete_queue(&self, input: DeleteQueueInput)
        -> Result<DeleteQueueOutput, ServiceError>;

    /// Deliver one message
    async fn send_message(&self, input: SendMessageInput)
        -> Result<SendMessageOutput, ServiceError>;

    /// Retrieve messages, optionally long-polling
    async fn receive_message(
        &self,
        input: ReceiveMessageInput,
    ) -> Result<ReceiveMessageOutput, ServiceError>;

    /// Delete one received message
    async fn delete_message(
        &self,
        input: DeleteMessageInput,
    ) -> Result<DeleteMessageOutput, ServiceError>;

    /// Deliver several messages in one call
    async fn send_message_batch(
        &self,
        input: SendMessageBatchInput,
    ) -> Result<SendMessageBatchOutput, ServiceError>;

    /// Delete several received messages in one call
    async fn delete_message_batch(
        &self,
        input: DeleteMessageBatchInput,
    ) -> Result<DeleteMessageBatchOutput, ServiceError>;
}
