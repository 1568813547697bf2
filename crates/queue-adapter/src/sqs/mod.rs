//! SQS query-protocol implementation of [`QueueService`].
//!
//! Requests are `POST`ed as form bodies to the configured endpoint and signed
//! with Signature V4; responses are XML. Non-2xx responses are turned into
//! [`ServiceError::Api`] with the service's own code and message.
//!
//! ## Example
//!
//! ```no_run
//! use queue_adapter::config::{ClientConfig, EnvironmentSource};
//! use queue_adapter::service::{CreateQueueInput, QueueService};
//! use queue_adapter::sqs::SqsHttpService;
//! use queue_adapter::transport::{Transport, TransportSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolved = ClientConfig::new("http://localhost:9324", "000000000000")
//!     .with_credentials("x", "x")
//!     .with_region("elasticmq")
//!     .resolve(&EnvironmentSource::empty())?;
//! let transport = Transport::build(TransportSettings::recommended())?;
//!
//! let service = SqsHttpService::new(&resolved, transport)?;
//! let created = service
//!     .create_queue(CreateQueueInput { queue_name: "orders".to_string() })
//!     .await?;
//! println!("{}", created.queue_url);
//! # Ok(())
//! # }
//! ```

use crate::config::ResolvedConfig;
use crate::error::{ConfigurationError, ServiceError};
use crate::models::{
    CreateQueueOutput, DeleteMessageBatchOutput, DeleteMessageOutput, DeleteQueueOutput,
    ReceiveMessageOutput, SendMessageBatchOutput, SendMessageOutput,
};
use crate::service::{
    CreateQueueInput, DeleteMessageBatchInput, DeleteMessageInput, DeleteQueueInput,
    QueueService, ReceiveMessageInput, SendMessageBatchInput, SendMessageInput,
};
use crate::transport::Transport;
use async_trait::async_trait;
use chrono::Utc;
use std::fmt;
use url::{Position, Url};

mod params;
mod signer;
mod xml;

use params::FormParams;
use signer::SigV4Signer;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// SQS client speaking the query protocol over a shared [`Transport`]
pub struct SqsHttpService {
    transport: Transport,
    signer: SigV4Signer,
    endpoint: Url,
}

impl SqsHttpService {
    /// Create a service bound to the resolved endpoint and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Invalid`] if the endpoint is not an
    /// absolute `http`/`https` URL with a host.
    pub fn new(config: &ResolvedConfig, transport: Transport) -> Result<Self, ConfigurationError> {
        let endpoint = Url::parse(&config.endpoint_url).map_err(|e| ConfigurationError::Invalid {
            message: format!("endpoint url '{}': {}", config.endpoint_url, e),
        })?;

        if !matches!(endpoint.scheme(), "http" | "https") || endpoint.host_str().is_none() {
            return Err(ConfigurationError::Invalid {
                message: format!(
                    "endpoint url '{}' must be an http(s) URL with a host",
                    config.endpoint_url
                ),
            });
        }

        Ok(Self {
            transport,
            signer: SigV4Signer::new(config.credentials.clone(), config.region.clone()),
            endpoint,
        })
    }

    /// Endpoint every request is sent to
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sign and send one action, returning the raw success body
    async fn dispatch(&self, params: FormParams) -> Result<String, ServiceError> {
        let body = params.encode();
        let host = &self.endpoint[Position::BeforeHost..Position::AfterPort];
        let headers = self
            .signer
            .sign("POST", host, self.endpoint.path(), &body, &Utc::now());

        tracing::debug!(
            action = params.action_name(),
            endpoint = %self.endpoint,
            "Sending queue service request"
        );

        let mut request = self
            .transport
            .http_client()
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.body(body).send().await?;

        let status = response.status();
        let response_body = response.text().await?;

        if !status.is_success() {
            let error = xml::parse_error_response(&response_body, status.as_u16());
            tracing::warn!(
                action = params.action_name(),
                status = status.as_u16(),
                error = %error,
                "Queue service returned an error"
            );
            return Err(error);
        }

        Ok(response_body)
    }
}

impl fmt::Debug for SqsHttpService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqsHttpService")
            .field("endpoint", &self.endpoint.as_str())
            .field("signer", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl QueueService for SqsHttpService {
    async fn create_queue(
        &self,
        input: CreateQueueInput,
    ) -> Result<CreateQueueOutput, ServiceError> {
        let body = self.dispatch(params::create_queue(&input)).await?;
        xml::parse_create_queue(&body)
    }

    async fn delete_queue(
        &self,
        input: DeleteQueueInput,
    ) -> Result<DeleteQueueOutput, ServiceError> {
        let body = self.dispatch(params::delete_queue(&input)).await?;
        xml::parse_delete_queue(&body)
    }

    async fn send_message(
        &self,
        input: SendMessageInput,
    ) -> Result<SendMessageOutput, ServiceError> {
        let body = self.dispatch(params::send_message(&input)).await?;
        xml::parse_send_message(&body)
    }

    async fn receive_message(
        &self,
        input: ReceiveMessageInput,
    ) -> Result<ReceiveMessageOutput, ServiceError> {
        let body = self.dispatch(params::receive_message(&input)).await?;
        xml::parse_receive_message(&body)
    }

    async fn delete_message(
        &self,
        input: DeleteMessageInput,
    ) -> Result<DeleteMessageOutput, ServiceError> {
        let body = self.dispatch(params::delete_message(&input)).await?;
        xml::parse_delete_message(&body)
    }

    async fn send_message_batch(
        &self,
        input: SendMessageBatchInput,
    ) -> Result<SendMessageBatchOutput, ServiceError> {
        let body = self.dispatch(params::send_message_batch(&input)).await?;
        xml::parse_send_message_batch(&body)
    }

    async fn delete_message_batch(
        &self,
        input: DeleteMessageBatchInput,
    ) -> Result<DeleteMessageBatchOutput, ServiceError> {
        let body = self.dispatch(params::delete_message_batch(&input)).await?;
        xml::parse_delete_message_batch(&body)
    }
}
