//! Tests for the SQS HTTP service against a mock server.

use super::*;
use crate::config::Credentials;
use crate::models::{DeleteMessageBatchEntry, SendMessageBatchEntry};
use crate::transport::TransportSettings;
use std::collections::BTreeMap;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn resolved(endpoint_url: &str) -> ResolvedConfig {
    ResolvedConfig {
        credentials: Credentials::new("AKIDEXAMPLE", "secret"),
        region: "us-east-1".to_string(),
        tenant_id: "000000000000".to_string(),
        endpoint_url: endpoint_url.to_string(),
    }
}

fn service_for(server: &MockServer) -> SqsHttpService {
    let transport = Transport::build(TransportSettings::recommended()).unwrap();
    SqsHttpService::new(&resolved(&server.uri()), transport).unwrap()
}

async fn last_body(server: &MockServer) -> String {
    let requests = server.received_requests().await.unwrap();
    let request = requests.last().expect("no request received");
    String::from_utf8(request.body.clone()).unwrap()
}

// ============================================================================
// Construction Tests
// ============================================================================

mod construction_tests {
    use super::*;

    #[test]
    fn test_rejects_unparseable_endpoint() {
        let transport = Transport::build(TransportSettings::default()).unwrap();

        let result = SqsHttpService::new(&resolved("not a url"), transport);

        assert!(matches!(result, Err(ConfigurationError::Invalid { .. })));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let transport = Transport::build(TransportSettings::default()).unwrap();

        let result = SqsHttpService::new(&resolved("ftp://queues.local"), transport);

        assert!(matches!(result, Err(ConfigurationError::Invalid { .. })));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let transport = Transport::build(TransportSettings::default()).unwrap();
        let service = SqsHttpService::new(&resolved("http://localhost:9324"), transport).unwrap();

        let debug = format!("{:?}", service);

        assert!(debug.contains("localhost:9324"));
        assert!(!debug.contains("secret"));
    }
}

// ============================================================================
// Request Tests
// ============================================================================

mod request_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_queue_is_signed_form_post() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", FORM_CONTENT_TYPE))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(body_string_contains("Action=CreateQueue"))
            .and(body_string_contains("QueueName=orders"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<CreateQueueResponse><CreateQueueResult><QueueUrl>http://q/000000000000/orders</QueueUrl></CreateQueueResult><ResponseMetadata><RequestId>r1</RequestId></ResponseMetadata></CreateQueueResponse>",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let output = service_for(&server)
            .create_queue(CreateQueueInput {
                queue_name: "orders".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.queue_url, "http://q/000000000000/orders");
        assert_eq!(output.request_id.as_deref(), Some("r1"));

        let requests = server.received_requests().await.unwrap();
        let authorization = requests[0]
            .headers
            .get("authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(authorization.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
        assert!(authorization.contains("/us-east-1/sqs/aws4_request"));
    }

    #[tokio::test]
    async fn test_send_message_without_delay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=SendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<SendMessageResponse><SendMessageResult><MessageId>m-1</MessageId></SendMessageResult></SendMessageResponse>",
            ))
            .mount(&server)
            .await;

        let output = service_for(&server)
            .send_message(SendMessageInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                message_body: "hello".to_string(),
                delay_seconds: None,
                message_attributes: BTreeMap::new(),
            })
            .await
            .unwrap();

        assert_eq!(output.message_id, "m-1");
        let body = last_body(&server).await;
        assert!(body.contains("MessageBody=hello"));
        assert!(!body.contains("DelaySeconds"));
    }

    #[tokio::test]
    async fn test_send_message_with_zero_delay() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<SendMessageResponse><SendMessageResult><MessageId>m-1</MessageId></SendMessageResult></SendMessageResponse>",
            ))
            .mount(&server)
            .await;

        service_for(&server)
            .send_message(SendMessageInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                message_body: "hello".to_string(),
                delay_seconds: Some(0),
                message_attributes: BTreeMap::new(),
            })
            .await
            .unwrap();

        assert!(last_body(&server).await.contains("DelaySeconds=0"));
    }

    #[tokio::test]
    async fn test_receive_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=ReceiveMessage"))
            .and(body_string_contains("MaxNumberOfMessages=5"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<ReceiveMessageResponse><ReceiveMessageResult><Message><MessageId>m</MessageId><ReceiptHandle>rh</ReceiptHandle><Body>b</Body></Message></ReceiveMessageResult></ReceiveMessageResponse>",
            ))
            .mount(&server)
            .await;

        let output = service_for(&server)
            .receive_message(ReceiveMessageInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                max_number_of_messages: Some(5),
                wait_time_seconds: None,
                visibility_timeout: None,
                attribute_names: vec![],
                message_attribute_names: vec![],
            })
            .await
            .unwrap();

        assert_eq!(output.messages.len(), 1);
        assert_eq!(output.messages[0].receipt_handle, "rh");
        assert!(!last_body(&server).await.contains("WaitTimeSeconds"));
    }

    #[tokio::test]
    async fn test_delete_calls_accept_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let service = service_for(&server);

        let deleted = service
            .delete_message(DeleteMessageInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                receipt_handle: "rh".to_string(),
            })
            .await
            .unwrap();
        let queue_deleted = service
            .delete_queue(DeleteQueueInput {
                queue_url: "http://q/000000000000/orders".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(deleted.request_id, None);
        assert_eq!(queue_deleted.request_id, None);
    }

    #[tokio::test]
    async fn test_batches_keep_entry_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=SendMessageBatch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<SendMessageBatchResponse><SendMessageBatchResult><SendMessageBatchResultEntry><Id>second</Id><MessageId>m2</MessageId></SendMessageBatchResultEntry><SendMessageBatchResultEntry><Id>first</Id><MessageId>m1</MessageId></SendMessageBatchResultEntry></SendMessageBatchResult></SendMessageBatchResponse>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=DeleteMessageBatch"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<DeleteMessageBatchResponse><DeleteMessageBatchResult><DeleteMessageBatchResultEntry><Id>x</Id></DeleteMessageBatchResultEntry></DeleteMessageBatchResult></DeleteMessageBatchResponse>",
            ))
            .mount(&server)
            .await;
        let service = service_for(&server);

        let sent = service
            .send_message_batch(SendMessageBatchInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                entries: vec![
                    SendMessageBatchEntry::new("second", "b"),
                    SendMessageBatchEntry::new("first", "a"),
                ],
            })
            .await
            .unwrap();
        let sent_body = last_body(&server).await;

        let deleted = service
            .delete_message_batch(DeleteMessageBatchInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                entries: vec![DeleteMessageBatchEntry::new("x", "rh-x")],
            })
            .await
            .unwrap();

        assert_eq!(sent.successful[0].id, "second");
        assert_eq!(sent.successful[1].id, "first");
        assert!(sent_body.contains("SendMessageBatchRequestEntry.1.Id=second"));
        assert!(sent_body.contains("SendMessageBatchRequestEntry.2.Id=first"));
        assert_eq!(deleted.successful[0].id, "x");
    }
}

// ============================================================================
// Error Tests
// ============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_api_error_is_propagated_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                "<ErrorResponse><Error><Type>Sender</Type><Code>AWS.SimpleQueueService.NonExistentQueue</Code><Message>The specified queue does not exist.</Message></Error><RequestId>e1</RequestId></ErrorResponse>",
            ))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .delete_queue(DeleteQueueInput {
                queue_url: "http://q/000000000000/missing".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.code(), Some("AWS.SimpleQueueService.NonExistentQueue"));
        assert!(err.to_string().contains("The specified queue does not exist."));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<SendMessageResponse>"))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .send_message(SendMessageInput {
                queue_url: "http://q/000000000000/orders".to_string(),
                message_body: "hello".to_string(),
                delay_seconds: None,
                message_attributes: BTreeMap::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Bind then drop to get a port with nothing listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let transport = Transport::build(TransportSettings::recommended()).unwrap();
        let service =
            SqsHttpService::new(&resolved(&format!("http://127.0.0.1:{}", port)), transport)
                .unwrap();

        let err = service
            .create_queue(CreateQueueInput {
                queue_name: "orders".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::ConnectionFailed { .. } | ServiceError::Transport { .. }
        ));
    }
}
