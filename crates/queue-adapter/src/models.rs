//! Request and response models for queue operations.
//!
//! Request models are what callers build (or what the host deserializes from
//! script objects). Required string fields are plain `String`s where empty
//! means missing; optional knobs are `Option`s and are only sent to the
//! service when `Some`, so "unset" stays distinguishable from an explicit
//! zero.
//!
//! Response models mirror the service's result shapes. Batch outputs carry
//! the service's per-entry successes and failures untouched.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

// ============================================================================
// Shared Types
// ============================================================================

/// Typed value of a custom message attribute
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageAttributeValue {
    /// `String`, `Number`, `Binary`, or a custom `Type.Label` form
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binary_value: Option<Vec<u8>>,
}

impl MessageAttributeValue {
    /// A `String` attribute
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: Some(value.into()),
            binary_value: None,
        }
    }

    /// A `Number` attribute; the service keeps numbers as decimal text
    pub fn number(value: impl ToString) -> Self {
        Self {
            data_type: "Number".to_string(),
            string_value: Some(value.to_string()),
            binary_value: None,
        }
    }

    /// A `Binary` attribute
    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Self {
            data_type: "Binary".to_string(),
            string_value: None,
            binary_value: Some(value.into()),
        }
    }
}

/// Custom attributes keyed by name
pub type MessageAttributes = BTreeMap<String, MessageAttributeValue>;

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    Ok(())
}

/// Check a queue name supplied to create/delete queue.
pub fn validate_queue_name(queue_name: &str) -> Result<(), ValidationError> {
    require("queue_name", queue_name)
}

// ============================================================================
// Requests
// ============================================================================

/// Deliver one message to a queue
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendMessageRequest {
    pub queue_name: String,
    pub message_body: String,
    /// Per-message delay; `None` keeps the queue's default
    pub delay_seconds: Option<i64>,
    pub message_attributes: MessageAttributes,
}

impl SendMessageRequest {
    pub fn new(queue_name: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            message_body: message_body.into(),
            ..Self::default()
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: i64) -> Self {
        self.delay_seconds = Some(delay_seconds);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: MessageAttributeValue) -> Self {
        self.message_attributes.insert(name.into(), value);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("queue_name", &self.queue_name)?;
        require("message_body", &self.message_body)
    }
}

/// Fetch up to `max_number_of_messages` messages from a queue
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveMessageRequest {
    pub queue_name: String,
    pub max_number_of_messages: Option<i64>,
    /// Long-poll duration; the call waits up to this long for messages
    pub wait_time_seconds: Option<i64>,
    pub visibility_timeout: Option<i64>,
    /// System attributes to return, e.g. `ApproximateReceiveCount` or `All`
    pub attribute_names: Vec<String>,
    /// Custom attributes to return, e.g. `trace_id` or `All`
    pub message_attribute_names: Vec<String>,
}

impl ReceiveMessageRequest {
    pub fn new(queue_name: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            ..Self::default()
        }
    }

    pub fn with_max_number_of_messages(mut self, max: i64) -> Self {
        self.max_number_of_messages = Some(max);
        self
    }

    pub fn with_wait_time_seconds(mut self, seconds: i64) -> Self {
        self.wait_time_seconds = Some(seconds);
        self
    }

    pub fn with_visibility_timeout(mut self, seconds: i64) -> Self {
        self.visibility_timeout = Some(seconds);
        self
    }

    pub fn with_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.attribute_names.push(name.into());
        self
    }

    pub fn with_message_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.message_attribute_names.push(name.into());
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("queue_name", &self.queue_name)
    }
}

/// Delete one previously received message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteMessageRequest {
    pub queue_name: String,
    /// Opaque token from a prior receive
    pub receipt_handle: String,
}

impl DeleteMessageRequest {
    pub fn new(queue_name: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            queue_name: queue_name.into(),
            receipt_handle: receipt_handle.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("queue_name", &self.queue_name)?;
        require("receipt_handle", &self.receipt_handle)
    }
}

/// One message of a send batch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendMessageBatchEntry {
    /// Identifier unique within the batch; echoed back in the result
    pub id: String,
    pub message_body: String,
    pub delay_seconds: Option<i64>,
    pub message_attributes: MessageAttributes,
    /// FIFO queues only
    pub message_group_id: Option<String>,
    /// FIFO queues only
    pub message_deduplication_id: Option<String>,
}

impl SendMessageBatchEntry {
    pub fn new(id: impl Into<String>, message_body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message_body: message_body.into(),
            ..Self::default()
        }
    }

    pub fn with_delay_seconds(mut self, delay_seconds: i64) -> Self {
        self.delay_seconds = Some(delay_seconds);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: MessageAttributeValue) -> Self {
        self.message_attributes.insert(name.into(), value);
        self
    }

    pub fn with_message_group_id(mut self, group_id: impl Into<String>) -> Self {
        self.message_group_id = Some(group_id.into());
        self
    }

    pub fn with_message_deduplication_id(mut self, dedup_id: impl Into<String>) -> Self {
        self.message_deduplication_id = Some(dedup_id.into());
        self
    }
}

/// Deliver several messages to one queue in a single call.
///
/// The service accepts at most ten entries and reports each entry's outcome
/// separately; neither rule is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SendMessageBatchRequest {
    pub queue_name: String,
    pub entries: Vec<SendMessageBatchEntry>,
}

impl SendMessageBatchRequest {
    pub fn new(queue_name: impl Into<String>, entries: Vec<SendMessageBatchEntry>) -> Self {
        Self {
            queue_name: queue_name.into(),
            entries,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("queue_name", &self.queue_name)?;
        for (idx, entry) in self.entries.iter().enumerate() {
            require(&format!("entries[{}].id", idx), &entry.id)?;
            require(&format!("entries[{}].message_body", idx), &entry.message_body)?;
        }
        Ok(())
    }
}

/// One receipt of a delete batch
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteMessageBatchEntry {
    pub id: String,
    pub receipt_handle: String,
}

impl DeleteMessageBatchEntry {
    pub fn new(id: impl Into<String>, receipt_handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            receipt_handle: receipt_handle.into(),
        }
    }
}

/// Delete several received messages from one queue in a single call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteMessageBatchRequest {
    pub queue_name: String,
    pub entries: Vec<DeleteMessageBatchEntry>,
}

impl DeleteMessageBatchRequest {
    pub fn new(queue_name: impl Into<String>, entries: Vec<DeleteMessageBatchEntry>) -> Self {
        Self {
            queue_name: queue_name.into(),
            entries,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require("queue_name", &self.queue_name)?;
        for (idx, entry) in self.entries.iter().enumerate() {
            require(&format!("entries[{}].id", idx), &entry.id)?;
            require(&format!("entries[{}].receipt_handle", idx), &entry.receipt_handle)?;
        }
        Ok(())
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreateQueueOutput {
    pub queue_url: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteQueueOutput {
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendMessageOutput {
    pub message_id: String,
    pub md5_of_message_body: Option<String>,
    pub md5_of_message_attributes: Option<String>,
    /// FIFO queues only
    pub sequence_number: Option<String>,
    pub request_id: Option<String>,
}

/// A message as delivered by a receive call
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceivedMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    pub md5_of_body: Option<String>,
    pub md5_of_message_attributes: Option<String>,
    /// System attributes that were requested and returned
    pub attributes: BTreeMap<String, String>,
    pub message_attributes: MessageAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReceiveMessageOutput {
    /// Empty when the (long-)poll found nothing
    pub messages: Vec<ReceivedMessage>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteMessageOutput {
    pub request_id: Option<String>,
}

/// Failure of a single batch entry, as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchResultErrorEntry {
    pub id: String,
    pub code: String,
    pub message: Option<String>,
    /// `true` when the request entry itself was at fault
    pub sender_fault: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendMessageBatchResultEntry {
    pub id: String,
    pub message_id: String,
    pub md5_of_message_body: Option<String>,
    pub md5_of_message_attributes: Option<String>,
    pub sequence_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendMessageBatchOutput {
    pub successful: Vec<SendMessageBatchResultEntry>,
    pub failed: Vec<BatchResultErrorEntry>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteMessageBatchResultEntry {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeleteMessageBatchOutput {
    pub successful: Vec<DeleteMessageBatchResultEntry>,
    pub failed: Vec<BatchResultErrorEntry>,
    pub request_id: Option<String>,
}
