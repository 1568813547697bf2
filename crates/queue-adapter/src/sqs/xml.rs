//! Query-protocol XML response decoding.
//!
//! Success bodies are decoded through serde into private wire shapes and then
//! converted into the public output models. Receive responses carry caller
//! text and are walked with the event reader instead, as are error bodies so
//! that partially well-formed documents still yield a code.

use crate::error::ServiceError;
use crate::models::{
    BatchResultErrorEntry, CreateQueueOutput, DeleteMessageBatchOutput,
    DeleteMessageBatchResultEntry, DeleteMessageOutput, DeleteQueueOutput, MessageAttributeValue,
    MessageAttributes, ReceiveMessageOutput, ReceivedMessage, SendMessageBatchOutput,
    SendMessageBatchResultEntry, SendMessageOutput,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;

#[cfg(test)]
#[path = "xml_tests.rs"]
mod tests;

// ============================================================================
// Wire Shapes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ResponseMetadata {
    request_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct MetadataOnlyResponse {
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CreateQueueResponse {
    create_queue_result: CreateQueueResult,
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct CreateQueueResult {
    queue_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendMessageResponse {
    send_message_result: SendMessageResult,
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendMessageResult {
    message_id: Option<String>,
    #[serde(rename = "MD5OfMessageBody")]
    md5_of_message_body: Option<String>,
    #[serde(rename = "MD5OfMessageAttributes")]
    md5_of_message_attributes: Option<String>,
    sequence_number: Option<String>,
}

// Receive responses are walked with the event reader, so these carry no
// serde derives.

#[derive(Debug, Default)]
struct MessageDto {
    message_id: String,
    receipt_handle: String,
    body: String,
    md5_of_body: Option<String>,
    md5_of_message_attributes: Option<String>,
    attributes: Vec<AttributeDto>,
    message_attributes: Vec<MessageAttributeDto>,
}

#[derive(Debug, Default)]
struct AttributeDto {
    name: String,
    value: String,
}

#[derive(Debug, Default)]
struct MessageAttributeDto {
    name: String,
    value: MessageAttributeValueDto,
}

#[derive(Debug, Default)]
struct MessageAttributeValueDto {
    data_type: String,
    string_value: Option<String>,
    binary_value: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendMessageBatchResponse {
    send_message_batch_result: SendMessageBatchResult,
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SendMessageBatchResult {
    #[serde(rename = "SendMessageBatchResultEntry")]
    successful: Vec<SendMessageBatchResultEntryDto>,
    #[serde(rename = "BatchResultErrorEntry")]
    failed: Vec<BatchResultErrorEntryDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct SendMessageBatchResultEntryDto {
    id: String,
    message_id: String,
    #[serde(rename = "MD5OfMessageBody")]
    md5_of_message_body: Option<String>,
    #[serde(rename = "MD5OfMessageAttributes")]
    md5_of_message_attributes: Option<String>,
    sequence_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct BatchResultErrorEntryDto {
    id: String,
    code: String,
    message: Option<String>,
    sender_fault: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct DeleteMessageBatchResponse {
    delete_message_batch_result: DeleteMessageBatchResult,
    response_metadata: ResponseMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeleteMessageBatchResult {
    #[serde(rename = "DeleteMessageBatchResultEntry")]
    successful: Vec<DeleteMessageBatchResultEntryDto>,
    #[serde(rename = "BatchResultErrorEntry")]
    failed: Vec<BatchResultErrorEntryDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct DeleteMessageBatchResultEntryDto {
    id: String,
}

// ============================================================================
// Conversions
// ============================================================================

fn malformed(message: impl Into<String>) -> ServiceError {
    ServiceError::MalformedResponse {
        message: message.into(),
    }
}

fn decode<T: DeserializeOwned>(xml: &str) -> Result<T, ServiceError> {
    quick_xml::de::from_str(xml).map_err(|e| malformed(format!("XML parsing error: {}", e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl From<BatchResultErrorEntryDto> for BatchResultErrorEntry {
    fn from(dto: BatchResultErrorEntryDto) -> Self {
        Self {
            id: dto.id,
            code: dto.code,
            message: non_empty(dto.message),
            sender_fault: dto.sender_fault,
        }
    }
}

fn convert_message_attributes(
    dtos: Vec<MessageAttributeDto>,
) -> Result<MessageAttributes, ServiceError> {
    let mut attributes = BTreeMap::new();
    for dto in dtos {
        let binary_value = match non_empty(dto.value.binary_value) {
            Some(encoded) => Some(STANDARD.decode(encoded.trim()).map_err(|e| {
                malformed(format!(
                    "Base64 decode failed for attribute {}: {}",
                    dto.name, e
                ))
            })?),
            None => None,
        };

        attributes.insert(
            dto.name,
            MessageAttributeValue {
                data_type: dto.value.data_type,
                string_value: dto.value.string_value,
                binary_value,
            },
        );
    }
    Ok(attributes)
}

impl TryFrom<MessageDto> for ReceivedMessage {
    type Error = ServiceError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        let attributes = dto
            .attributes
            .into_iter()
            .map(|a| (a.name, a.value))
            .collect();

        Ok(Self {
            message_id: dto.message_id,
            receipt_handle: dto.receipt_handle,
            body: dto.body,
            md5_of_body: non_empty(dto.md5_of_body),
            md5_of_message_attributes: non_empty(dto.md5_of_message_attributes),
            attributes,
            message_attributes: convert_message_attributes(dto.message_attributes)?,
        })
    }
}

// ============================================================================
// Response Parsers
// ============================================================================

/// Request id of a response whose result carries nothing else.
///
/// Some SQS-compatible services answer deletes with an empty body.
fn parse_metadata_only(xml: &str) -> Result<Option<String>, ServiceError> {
    if xml.trim().is_empty() {
        return Ok(None);
    }
    let response: MetadataOnlyResponse = decode(xml)?;
    Ok(non_empty(response.response_metadata.request_id))
}

pub(crate) fn parse_create_queue(xml: &str) -> Result<CreateQueueOutput, ServiceError> {
    let response: CreateQueueResponse = decode(xml)?;

    let queue_url = non_empty(response.create_queue_result.queue_url)
        .ok_or_else(|| malformed("QueueUrl not found in response"))?;

    Ok(CreateQueueOutput {
        queue_url,
        request_id: non_empty(response.response_metadata.request_id),
    })
}

pub(crate) fn parse_delete_queue(xml: &str) -> Result<DeleteQueueOutput, ServiceError> {
    Ok(DeleteQueueOutput {
        request_id: parse_metadata_only(xml)?,
    })
}

pub(crate) fn parse_send_message(xml: &str) -> Result<SendMessageOutput, ServiceError> {
    let response: SendMessageResponse = decode(xml)?;
    let result = response.send_message_result;

    let message_id = non_empty(result.message_id)
        .ok_or_else(|| malformed("MessageId not found in response"))?;

    Ok(SendMessageOutput {
        message_id,
        md5_of_message_body: non_empty(result.md5_of_message_body),
        md5_of_message_attributes: non_empty(result.md5_of_message_attributes),
        sequence_number: non_empty(result.sequence_number),
        request_id: non_empty(response.response_metadata.request_id),
    })
}

/// Decode a `ReceiveMessageResponse`.
///
/// Walked with the event reader and no text trimming: message bodies and
/// attribute values come back exactly as the service sent them.
pub(crate) fn parse_receive_message(xml: &str) -> Result<ReceiveMessageOutput, ServiceError> {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.expand_empty_elements(true);

    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut messages: Vec<MessageDto> = Vec::new();
    let mut request_id = None;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                open_receive_element(path.last().map(String::as_str), &name, &mut messages);
                saw_root = true;
                path.push(name);
                text.clear();
            }
            Ok(Event::Text(e)) => {
                let unescaped = e
                    .unescape()
                    .map_err(|e| malformed(format!("XML parsing error: {}", e)))?;
                text.push_str(&unescaped);
            }
            Ok(Event::CData(e)) => text.push_str(&String::from_utf8_lossy(&e)),
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                let value = std::mem::take(&mut text);
                close_receive_element(&path, &name, value, &mut messages, &mut request_id);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(format!("XML parsing error: {}", e))),
            _ => {}
        }
    }

    if !saw_root || !path.is_empty() {
        return Err(malformed("XML parsing error: incomplete document"));
    }

    let messages = messages
        .into_iter()
        .map(ReceivedMessage::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ReceiveMessageOutput {
        messages,
        request_id: non_empty(request_id),
    })
}

fn open_receive_element(parent: Option<&str>, name: &str, messages: &mut Vec<MessageDto>) {
    match (parent, name) {
        (Some("ReceiveMessageResult"), "Message") => messages.push(MessageDto::default()),
        (Some("Message"), "Attribute") => {
            if let Some(message) = messages.last_mut() {
                message.attributes.push(AttributeDto::default());
            }
        }
        (Some("Message"), "MessageAttribute") => {
            if let Some(message) = messages.last_mut() {
                message
                    .message_attributes
                    .push(MessageAttributeDto::default());
            }
        }
        _ => {}
    }
}

/// Store the text of a closed leaf element. `path` holds its ancestors.
fn close_receive_element(
    path: &[String],
    name: &str,
    value: String,
    messages: &mut [MessageDto],
    request_id: &mut Option<String>,
) {
    let parent = path.last().map(String::as_str);
    if parent == Some("ResponseMetadata") && name == "RequestId" {
        *request_id = Some(value);
        return;
    }

    let Some(message) = messages.last_mut() else {
        return;
    };

    match (parent, name) {
        (Some("Message"), "MessageId") => message.message_id = value,
        (Some("Message"), "ReceiptHandle") => message.receipt_handle = value,
        (Some("Message"), "Body") => message.body = value,
        (Some("Message"), "MD5OfBody") => message.md5_of_body = Some(value),
        (Some("Message"), "MD5OfMessageAttributes") => {
            message.md5_of_message_attributes = Some(value)
        }
        (Some("Attribute"), "Name") => {
            if let Some(attribute) = message.attributes.last_mut() {
                attribute.name = value;
            }
        }
        (Some("Attribute"), "Value") => {
            if let Some(attribute) = message.attributes.last_mut() {
                attribute.value = value;
            }
        }
        (Some("MessageAttribute"), "Name") => {
            if let Some(attribute) = message.message_attributes.last_mut() {
                attribute.name = value;
            }
        }
        (Some("Value"), field)
            if path.iter().rev().nth(1).map(String::as_str) == Some("MessageAttribute") =>
        {
            if let Some(attribute) = message.message_attributes.last_mut() {
                match field {
                    "DataType" => attribute.value.data_type = value,
                    "StringValue" => attribute.value.string_value = Some(value),
                    "BinaryValue" => attribute.value.binary_value = Some(value),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn parse_delete_message(xml: &str) -> Result<DeleteMessageOutput, ServiceError> {
    Ok(DeleteMessageOutput {
        request_id: parse_metadata_only(xml)?,
    })
}

pub(crate) fn parse_send_message_batch(xml: &str) -> Result<SendMessageBatchOutput, ServiceError> {
    let response: SendMessageBatchResponse = decode(xml)?;
    let result = response.send_message_batch_result;

    Ok(SendMessageBatchOutput {
        successful: result
            .successful
            .into_iter()
            .map(|e| SendMessageBatchResultEntry {
                id: e.id,
                message_id: e.message_id,
                md5_of_message_body: non_empty(e.md5_of_message_body),
                md5_of_message_attributes: non_empty(e.md5_of_message_attributes),
                sequence_number: non_empty(e.sequence_number),
            })
            .collect(),
        failed: result.failed.into_iter().map(Into::into).collect(),
        request_id: non_empty(response.response_metadata.request_id),
    })
}

pub(crate) fn parse_delete_message_batch(
    xml: &str,
) -> Result<DeleteMessageBatchOutput, ServiceError> {
    let response: DeleteMessageBatchResponse = decode(xml)?;
    let result = response.delete_message_batch_result;

    Ok(DeleteMessageBatchOutput {
        successful: result
            .successful
            .into_iter()
            .map(|e| DeleteMessageBatchResultEntry { id: e.id })
            .collect(),
        failed: result.failed.into_iter().map(Into::into).collect(),
        request_id: non_empty(response.response_metadata.request_id),
    })
}

/// Parse an `ErrorResponse` document into an API error.
///
/// Never fails: unreadable bodies yield code `Unknown` with the body text as
/// the message.
pub(crate) fn parse_error_response(xml: &str, status: u16) -> ServiceError {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut error_type = None;
    let mut error_code = None;
    let mut error_message = None;
    let mut request_id = None;
    let mut current: Option<&'static str> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                current = match e.name().as_ref() {
                    b"Type" => Some("Type"),
                    b"Code" => Some("Code"),
                    b"Message" => Some("Message"),
                    b"RequestId" => Some("RequestId"),
                    _ => None,
                };
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().ok().map(|s| s.into_owned());
                match current.take() {
                    Some("Type") => error_type = text,
                    Some("Code") => error_code = text,
                    Some("Message") => error_message = text,
                    Some("RequestId") => request_id = text,
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let body = xml.trim();
    let message = match (&error_code, error_message) {
        (_, Some(message)) => message,
        (None, None) if !body.is_empty() => body.to_string(),
        _ => "Unknown error".to_string(),
    };

    ServiceError::Api {
        status,
        code: error_code.unwrap_or_else(|| "Unknown".to_string()),
        message,
        request_id,
        sender_fault: error_type.as_deref() == Some("Sender"),
    }
}
