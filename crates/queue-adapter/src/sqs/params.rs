//! Query-protocol parameter encoding.
//!
//! Every request is a flat, ordered list of `name=value` pairs sent as a
//! form body. List and map members use 1-based indexed names such as
//! `AttributeName.1` or `MessageAttribute.2.Value.DataType`.

use crate::models::MessageAttributes;
use crate::service::{
    CreateQueueInput, DeleteMessageBatchInput, DeleteMessageInput, DeleteQueueInput,
    ReceiveMessageInput, SendMessageBatchInput, SendMessageInput,
};
use base64::{engine::general_purpose::STANDARD, Engine};

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

pub(crate) const API_VERSION: &str = "2012-11-05";

/// Ordered request parameters for one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FormParams {
    pairs: Vec<(String, String)>,
}

impl FormParams {
    pub(crate) fn action(action: &str) -> Self {
        let mut params = Self { pairs: Vec::new() };
        params.insert("Action", action);
        params.insert("Version", API_VERSION);
        params
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Insert only when a value is present
    pub(crate) fn insert_opt<T: ToString>(&mut self, name: impl Into<String>, value: Option<T>) {
        if let Some(value) = value {
            self.insert(name, value.to_string());
        }
    }

    /// Insert `{prefix}.1`, `{prefix}.2`, ... in list order
    pub(crate) fn insert_list(&mut self, prefix: &str, values: &[String]) {
        for (idx, value) in values.iter().enumerate() {
            self.insert(format!("{}.{}", prefix, idx + 1), value.clone());
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn action_name(&self) -> &str {
        self.get("Action").unwrap_or_default()
    }

    /// `application/x-www-form-urlencoded` body
    pub(crate) fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

fn insert_message_attributes(params: &mut FormParams, prefix: &str, attributes: &MessageAttributes) {
    for (idx, (name, value)) in attributes.iter().enumerate() {
        let base = format!("{}MessageAttribute.{}", prefix, idx + 1);
        params.insert(format!("{}.Name", base), name.clone());
        params.insert(format!("{}.Value.DataType", base), value.data_type.clone());
        params.insert_opt(format!("{}.Value.StringValue", base), value.string_value.as_ref());
        if let Some(ref binary) = value.binary_value {
            params.insert(format!("{}.Value.BinaryValue", base), STANDARD.encode(binary));
        }
    }
}

pub(crate) fn create_queue(input: &CreateQueueInput) -> FormParams {
    let mut params = FormParams::action("CreateQueue");
    params.insert("QueueName", input.queue_name.clone());
    params
}

pub(crate) fn delete_queue(input: &DeleteQueueInput) -> FormParams {
    let mut params = FormParams::action("DeleteQueue");
    params.insert("QueueUrl", input.queue_url.clone());
    params
}

pub(crate) fn send_message(input: &SendMessageInput) -> FormParams {
    let mut params = FormParams::action("SendMessage");
    params.insert("QueueUrl", input.queue_url.clone());
    params.insert("MessageBody", input.message_body.clone());
    params.insert_opt("DelaySeconds", input.delay_seconds);
    insert_message_attributes(&mut params, "", &input.message_attributes);
    params
}

pub(crate) fn receive_message(input: &ReceiveMessageInput) -> FormParams {
    let mut params = FormParams::action("ReceiveMessage");
    params.insert("QueueUrl", input.queue_url.clone());
    params.insert_opt("MaxNumberOfMessages", input.max_number_of_messages);
    params.insert_opt("WaitTimeSeconds", input.wait_time_seconds);
    params.insert_opt("VisibilityTimeout", input.visibility_timeout);
    params.insert_list("AttributeName", &input.attribute_names);
    params.insert_list("MessageAttributeName", &input.message_attribute_names);
    params
}

pub(crate) fn delete_message(input: &DeleteMessageInput) -> FormParams {
    let mut params = FormParams::action("DeleteMessage");
    params.insert("QueueUrl", input.queue_url.clone());
    params.insert("ReceiptHandle", input.receipt_handle.clone());
    params
}

pub(crate) fn send_message_batch(input: &SendMessageBatchInput) -> FormParams {
    let mut params = FormParams::action("SendMessageBatch");
    params.insert("QueueUrl", input.queue_url.clone());

    for (idx, entry) in input.entries.iter().enumerate() {
        let prefix = format!("SendMessageBatchRequestEntry.{}.", idx + 1);
        params.insert(format!("{}Id", prefix), entry.id.clone());
        params.insert(format!("{}MessageBody", prefix), entry.message_body.clone());
        params.insert_opt(format!("{}DelaySeconds", prefix), entry.delay_seconds);
        params.insert_opt(
            format!("{}MessageGroupId", prefix),
            entry.message_group_id.as_ref(),
        );
        params.insert_opt(
            format!("{}MessageDeduplicationId", prefix),
            entry.message_deduplication_id.as_ref(),
        );
        insert_message_attributes(&mut params, &prefix, &entry.message_attributes);
    }

    params
}

pub(crate) fn delete_message_batch(input: &DeleteMessageBatchInput) -> FormParams {
    let mut params = FormParams::action("DeleteMessageBatch");
    params.insert("QueueUrl", input.queue_url.clone());

    for (idx, entry) in input.entries.iter().enumerate() {
        let prefix = format!("DeleteMessageBatchRequestEntry.{}.", idx + 1);
        params.insert(format!("{}Id", prefix), entry.id.clone());
        params.insert(format!("{}ReceiptHandle", prefix), entry.receipt_handle.clone());
    }

    params
}
