//! # Queue Adapter
//!
//! SQS-compatible queue client for scripted load-generation hosts.
//!
//! This library provides:
//! - A process-wide client created once from the first `new(options)` call
//! - A pooled HTTP transport shared by every caller
//! - Queue address resolution (`{endpoint}/{tenant}/{queue}`)
//! - Seven queue operations: create/delete queue, send/receive/delete
//!   message, and batched send/delete
//! - Registration under the `k6/x/sqs` import path with a JSON call surface
//!
//! ## Module Organization
//!
//! - [`error`] - Error types for construction and operations
//! - [`config`] - Client options and environment fallback
//! - [`transport`] - Pooled HTTP transport settings
//! - [`address`] - Queue address composition
//! - [`models`] - Request and response models
//! - [`service`] - Queue service capability trait
//! - [`sqs`] - SQS query-protocol implementation of the service
//! - [`client`] - The shared client handle and its operations
//! - [`registry`] - Singleton client holder
//! - [`host`] - Scripting host registration
//!
//! ## Example
//!
//! ```no_run
//! use queue_adapter::{ClientConfig, ClientRegistry, SendMessageRequest};
//!
//! # async fn example() -> Result<(), queue_adapter::AdapterError> {
//! let config = ClientConfig::new("http://localhost:9324", "000000000000");
//! let client = ClientRegistry::global().get_or_create(&config).await?;
//!
//! client.create_queue("orders").await?;
//! client
//!     .send_message(SendMessageRequest::new("orders", "hello").with_delay_seconds(0))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod client;
pub mod config;
pub mod error;
pub mod host;
pub mod models;
pub mod registry;
pub mod service;
pub mod sqs;
pub mod transport;

pub use address::queue_url;
pub use client::QueueClient;
pub use config::{ClientConfig, EnvironmentSource};
pub use error::{
    AdapterError, ConfigurationError, FatalConfigError, ServiceError, ValidationError,
};
pub use host::{ModuleRegistry, SqsClientModule, SqsModule, MODULE_PATH};
pub use models::{
    BatchResultErrorEntry, CreateQueueOutput, DeleteMessageBatchEntry, DeleteMessageBatchOutput,
    DeleteMessageBatchRequest, DeleteMessageOutput, DeleteMessageRequest, DeleteQueueOutput,
    MessageAttributeValue, MessageAttributes, ReceiveMessageOutput, ReceiveMessageRequest,
    ReceivedMessage, SendMessageBatchEntry, SendMessageBatchOutput, SendMessageBatchRequest,
    SendMessageOutput, SendMessageRequest,
};
pub use registry::{ClientRegistry, SessionFactory};
pub use service::QueueService;
pub use transport::{Transport, TransportSettings};
