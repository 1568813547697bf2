//! Tests for query-protocol parameter encoding.

use super::*;
use crate::models::{DeleteMessageBatchEntry, MessageAttributeValue, SendMessageBatchEntry};
use std::collections::BTreeMap;

const QUEUE_URL: &str = "http://localhost:8081/api/1234567890/test";

fn send_input(delay_seconds: Option<i64>) -> SendMessageInput {
    SendMessageInput {
        queue_url: QUEUE_URL.to_string(),
        message_body: "This is a test message".to_string(),
        delay_seconds,
        message_attributes: BTreeMap::new(),
    }
}

// ============================================================================
// Optional Field Tests
// ============================================================================

mod optional_field_tests {
    use super::*;

    #[test]
    fn test_unset_delay_is_absent() {
        let params = send_message(&send_input(None));

        assert!(!params.contains("DelaySeconds"));
        assert!(!params.encode().contains("DelaySeconds"));
    }

    #[test]
    fn test_explicit_zero_delay_is_sent() {
        let params = send_message(&send_input(Some(0)));

        assert_eq!(params.get("DelaySeconds"), Some("0"));
        assert!(params.encode().contains("DelaySeconds=0"));
    }

    #[test]
    fn test_receive_optional_fields_set_iff_present() {
        let input = ReceiveMessageInput {
            queue_url: QUEUE_URL.to_string(),
            max_number_of_messages: Some(10),
            wait_time_seconds: None,
            visibility_timeout: Some(0),
            attribute_names: vec![],
            message_attribute_names: vec![],
        };

        let params = receive_message(&input);

        assert_eq!(params.get("MaxNumberOfMessages"), Some("10"));
        assert!(!params.contains("WaitTimeSeconds"));
        assert_eq!(params.get("VisibilityTimeout"), Some("0"));
        assert!(!params.contains("AttributeName.1"));
    }

    #[test]
    fn test_receive_attribute_names_keep_order() {
        let input = ReceiveMessageInput {
            queue_url: QUEUE_URL.to_string(),
            max_number_of_messages: None,
            wait_time_seconds: Some(20),
            visibility_timeout: None,
            attribute_names: vec![
                "SentTimestamp".to_string(),
                "ApproximateReceiveCount".to_string(),
            ],
            message_attribute_names: vec!["trace_id".to_string()],
        };

        let params = receive_message(&input);

        assert_eq!(params.get("AttributeName.1"), Some("SentTimestamp"));
        assert_eq!(params.get("AttributeName.2"), Some("ApproximateReceiveCount"));
        assert_eq!(params.get("MessageAttributeName.1"), Some("trace_id"));
        assert_eq!(params.get("WaitTimeSeconds"), Some("20"));
    }
}

// ============================================================================
// Encoding Tests
// ============================================================================

mod encoding_tests {
    use super::*;

    #[test]
    fn test_action_and_version_lead() {
        let params = create_queue(&CreateQueueInput {
            queue_name: "test".to_string(),
        });

        assert_eq!(
            params.encode(),
            "Action=CreateQueue&Version=2012-11-05&QueueName=test"
        );
        assert_eq!(params.action_name(), "CreateQueue");
    }

    #[test]
    fn test_values_are_form_encoded() {
        let params = delete_queue(&DeleteQueueInput {
            queue_url: "http://h/t/q".to_string(),
        });

        assert_eq!(
            params.encode(),
            "Action=DeleteQueue&Version=2012-11-05&QueueUrl=http%3A%2F%2Fh%2Ft%2Fq"
        );
    }

    #[test]
    fn test_message_attributes() {
        let mut input = send_input(None);
        input
            .message_attributes
            .insert("b_blob".to_string(), MessageAttributeValue::binary(b"hi".to_vec()));
        input
            .message_attributes
            .insert("a_trace".to_string(), MessageAttributeValue::string("abc"));

        let params = send_message(&input);

        assert_eq!(params.get("MessageAttribute.1.Name"), Some("a_trace"));
        assert_eq!(params.get("MessageAttribute.1.Value.DataType"), Some("String"));
        assert_eq!(params.get("MessageAttribute.1.Value.StringValue"), Some("abc"));
        assert_eq!(params.get("MessageAttribute.2.Name"), Some("b_blob"));
        assert_eq!(params.get("MessageAttribute.2.Value.BinaryValue"), Some("aGk="));
        assert!(!params.contains("MessageAttribute.2.Value.StringValue"));
    }

    #[test]
    fn test_delete_message() {
        let params = delete_message(&DeleteMessageInput {
            queue_url: QUEUE_URL.to_string(),
            receipt_handle: "AQEB+handle==".to_string(),
        });

        assert_eq!(params.get("ReceiptHandle"), Some("AQEB+handle=="));
        assert!(params.encode().contains("ReceiptHandle=AQEB%2Bhandle%3D%3D"));
    }
}

// ============================================================================
// Batch Tests
// ============================================================================

mod batch_tests {
    use super::*;

    #[test]
    fn test_send_batch_entries_in_order() {
        let input = SendMessageBatchInput {
            queue_url: QUEUE_URL.to_string(),
            entries: vec![
                SendMessageBatchEntry::new("z", "last-id-first"),
                SendMessageBatchEntry::new("a", "second")
                    .with_delay_seconds(0)
                    .with_message_group_id("g1")
                    .with_attribute("k", MessageAttributeValue::number(1)),
            ],
        };

        let params = send_message_batch(&input);

        assert_eq!(params.get("SendMessageBatchRequestEntry.1.Id"), Some("z"));
        assert_eq!(
            params.get("SendMessageBatchRequestEntry.1.MessageBody"),
            Some("last-id-first")
        );
        assert!(!params.contains("SendMessageBatchRequestEntry.1.DelaySeconds"));
        assert_eq!(params.get("SendMessageBatchRequestEntry.2.Id"), Some("a"));
        assert_eq!(params.get("SendMessageBatchRequestEntry.2.DelaySeconds"), Some("0"));
        assert_eq!(
            params.get("SendMessageBatchRequestEntry.2.MessageGroupId"),
            Some("g1")
        );
        assert!(!params.contains("SendMessageBatchRequestEntry.2.MessageDeduplicationId"));
        assert_eq!(
            params.get("SendMessageBatchRequestEntry.2.MessageAttribute.1.Value.StringValue"),
            Some("1")
        );
    }

    #[test]
    fn test_delete_batch_entries_in_order() {
        let input = DeleteMessageBatchInput {
            queue_url: QUEUE_URL.to_string(),
            entries: vec![
                DeleteMessageBatchEntry::new("second", "rh-2"),
                DeleteMessageBatchEntry::new("first", "rh-1"),
            ],
        };

        let params = delete_message_batch(&input);

        assert_eq!(params.get("DeleteMessageBatchRequestEntry.1.Id"), Some("second"));
        assert_eq!(
            params.get("DeleteMessageBatchRequestEntry.1.ReceiptHandle"),
            Some("rh-2")
        );
        assert_eq!(params.get("DeleteMessageBatchRequestEntry.2.Id"), Some("first"));
    }

    #[test]
    fn test_empty_batch_has_no_entries() {
        let params = delete_message_batch(&DeleteMessageBatchInput {
            queue_url: QUEUE_URL.to_string(),
            entries: vec![],
        });

        assert!(!params.contains("DeleteMessageBatchRequestEntry.1.Id"));
        assert_eq!(params.get("QueueUrl"), Some(QUEUE_URL));
    }
}
