//! Common test utilities for queue-adapter integration tests
//!
//! This module provides:
//! - Test tracing setup
//! - A mock SQS endpoint answering each action with a canned XML body
//! - Client configuration and registry builders pointing at the mock

use queue_adapter::{ClientConfig, ClientRegistry, EnvironmentSource};
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, header_exists, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "1234567890";

/// Install a test subscriber once; later calls are no-ops
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("queue_adapter=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Client options pointing at the mock server with explicit credentials
#[allow(dead_code)]
pub fn client_config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(server.uri(), TENANT)
        .with_credentials("AKIDEXAMPLE", "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY")
        .with_region("us-east-1")
}

/// A registry that never reads the process environment
#[allow(dead_code)]
pub fn isolated_registry() -> Arc<ClientRegistry> {
    Arc::new(ClientRegistry::new().with_environment(EnvironmentSource::empty()))
}

/// Mount a signed-request expectation answering `action` with `status` and `body`
#[allow(dead_code)]
pub async fn mount_action(server: &MockServer, action: &str, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .and(body_string_contains(format!("Action={}&", action)))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// Start a mock SQS endpoint answering all seven actions successfully
#[allow(dead_code)]
pub async fn mock_sqs() -> MockServer {
    let server = MockServer::start().await;
    let queue_url = format!("{}/{}/orders", server.uri(), TENANT);

    mount_action(
        &server,
        "CreateQueue",
        200,
        &format!(
            "<CreateQueueResponse><CreateQueueResult><QueueUrl>{}</QueueUrl></CreateQueueResult><ResponseMetadata><RequestId>req-create</RequestId></ResponseMetadata></CreateQueueResponse>",
            queue_url
        ),
    )
    .await;
    mount_action(
        &server,
        "DeleteQueue",
        200,
        "<DeleteQueueResponse><ResponseMetadata><RequestId>req-delete-queue</RequestId></ResponseMetadata></DeleteQueueResponse>",
    )
    .await;
    mount_action(
        &server,
        "SendMessageBatch",
        200,
        "<SendMessageBatchResponse><SendMessageBatchResult><SendMessageBatchResultEntry><Id>first</Id><MessageId>m-first</MessageId></SendMessageBatchResultEntry><BatchResultErrorEntry><Id>second</Id><Code>InvalidParameterValue</Code><Message>bad entry</Message><SenderFault>true</SenderFault></BatchResultErrorEntry></SendMessageBatchResult></SendMessageBatchResponse>",
    )
    .await;
    mount_action(
        &server,
        "SendMessage",
        200,
        "<SendMessageResponse><SendMessageResult><MD5OfMessageBody>fafb00f5732ab283681e124bf8747ed1</MD5OfMessageBody><MessageId>5fea7756-0ea4-451a-a703-a558b933e274</MessageId></SendMessageResult><ResponseMetadata><RequestId>req-send</RequestId></ResponseMetadata></SendMessageResponse>",
    )
    .await;
    mount_action(
        &server,
        "ReceiveMessage",
        200,
        "<ReceiveMessageResponse><ReceiveMessageResult><Message><MessageId>5fea7756-0ea4-451a-a703-a558b933e274</MessageId><ReceiptHandle>MbZj6wDWli+JvwwJaBV+3dcjk2YW2vA3+STFFljTM8tJJg6HRG6PYSasuWXPJB+Cw</ReceiptHandle><MD5OfBody>fafb00f5732ab283681e124bf8747ed1</MD5OfBody><Body>This is a test message</Body><Attribute><Name>ApproximateReceiveCount</Name><Value>1</Value></Attribute></Message></ReceiveMessageResult><ResponseMetadata><RequestId>req-receive</RequestId></ResponseMetadata></ReceiveMessageResponse>",
    )
    .await;
    mount_action(
        &server,
        "DeleteMessageBatch",
        200,
        "<DeleteMessageBatchResponse><DeleteMessageBatchResult><DeleteMessageBatchResultEntry><Id>first</Id></DeleteMessageBatchResultEntry><DeleteMessageBatchResultEntry><Id>second</Id></DeleteMessageBatchResultEntry></DeleteMessageBatchResult></DeleteMessageBatchResponse>",
    )
    .await;
    mount_action(
        &server,
        "DeleteMessage",
        200,
        "<DeleteMessageResponse><ResponseMetadata><RequestId>req-delete</RequestId></ResponseMetadata></DeleteMessageResponse>",
    )
    .await;

    server
}

/// Form bodies of every request the mock received, in order
#[allow(dead_code)]
pub async fn received_bodies(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}
