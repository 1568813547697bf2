//! Registration with a scripting host.
//!
//! The host looks modules up by import path in a [`ModuleRegistry`]. This
//! crate contributes one module, [`SqsModule`], under [`MODULE_PATH`].
//! Scripts call `new(options)` once per virtual user; every instance shares
//! the process-wide [`QueueClient`] and exposes the operations through a
//! dynamic, JSON-valued call surface:
//!
//! | Method               | Argument                          |
//! |----------------------|-----------------------------------|
//! | `createQueue`        | queue name (string)               |
//! | `deleteQueue`        | queue name (string)               |
//! | `queueUrl`           | queue name (string)               |
//! | `sendMessage`        | [`SendMessageRequest`] object     |
//! | `receiveMessage`     | [`ReceiveMessageRequest`] object  |
//! | `deleteMessage`      | [`DeleteMessageRequest`] object   |
//! | `sendMessageBatch`   | [`SendMessageBatchRequest`] object|
//! | `deleteMessageBatch` | [`DeleteMessageBatchRequest`] object |

use crate::client::QueueClient;
use crate::config::ClientConfig;
use crate::error::{AdapterError, ConfigurationError, ValidationError};
use crate::models::{
    DeleteMessageBatchRequest, DeleteMessageRequest, ReceiveMessageRequest,
    SendMessageBatchRequest, SendMessageRequest,
};
use crate::registry::ClientRegistry;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;

/// Import path scripts use for this module
pub const MODULE_PATH: &str = "k6/x/sqs";

// ============================================================================
// Host Traits
// ============================================================================

/// A module the host can instantiate from script options
#[async_trait]
pub trait HostModule: Send + Sync {
    async fn new_instance(&self, options: Value)
        -> Result<Arc<dyn ModuleInstance>, AdapterError>;
}

/// A module instance exposing named methods
#[async_trait]
pub trait ModuleInstance: Send + Sync {
    async fn call(&self, method: &str, args: Value) -> Result<Value, AdapterError>;
}

// ============================================================================
// ModuleRegistry
// ============================================================================

/// Modules keyed by import path
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, Arc<dyn HostModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under an import path, replacing any previous one.
    pub fn register(&mut self, path: impl Into<String>, module: Arc<dyn HostModule>) -> &mut Self {
        self.modules.insert(path.into(), module);
        self
    }

    pub fn get(&self, path: &str) -> Option<Arc<dyn HostModule>> {
        self.modules.get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("paths", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

static GLOBAL_MODULES: OnceLock<ModuleRegistry> = OnceLock::new();

/// Register the queue module, backed by the process-wide client registry
pub fn register(modules: &mut ModuleRegistry) -> &mut ModuleRegistry {
    modules.register(MODULE_PATH, Arc::new(SqsModule::global()))
}

/// The process-wide module registry with this crate's module registered.
///
/// Built on first access and never torn down.
pub fn global_modules() -> &'static ModuleRegistry {
    GLOBAL_MODULES.get_or_init(|| {
        let mut modules = ModuleRegistry::new();
        register(&mut modules);
        modules
    })
}

// ============================================================================
// SqsModule
// ============================================================================

/// Module entry point; `new(options)` returns a client instance
#[derive(Debug, Clone)]
pub struct SqsModule {
    clients: Arc<ClientRegistry>,
}

impl SqsModule {
    /// Module backed by its own client registry
    pub fn new(clients: Arc<ClientRegistry>) -> Self {
        Self { clients }
    }

    /// Module backed by [`ClientRegistry::global`]
    pub fn global() -> Self {
        Self::new(ClientRegistry::global())
    }

    /// Create (or reuse) the shared client from script options.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::Configuration`] if `options` is not a client config
    ///   object or lacks `url` / `user_id`
    /// - [`AdapterError::Fatal`] if credentials or region cannot be resolved
    pub async fn new_client(&self, options: Value) -> Result<SqsClientModule, AdapterError> {
        let config: ClientConfig =
            serde_json::from_value(options).map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })?;
        let client = self.clients.get_or_create(&config).await?;
        Ok(SqsClientModule { client })
    }
}

#[async_trait]
impl HostModule for SqsModule {
    async fn new_instance(
        &self,
        options: Value,
    ) -> Result<Arc<dyn ModuleInstance>, AdapterError> {
        Ok(Arc::new(self.new_client(options).await?))
    }
}

// ============================================================================
// SqsClientModule
// ============================================================================

/// Script-facing wrapper of the shared [`QueueClient`]
#[derive(Debug, Clone)]
pub struct SqsClientModule {
    client: Arc<QueueClient>,
}

impl SqsClientModule {
    pub fn client(&self) -> &Arc<QueueClient> {
        &self.client
    }

    /// Invoke an operation by its script-side name.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::UnknownOperation`] for an unrecognised method
    /// - [`ValidationError::InvalidFormat`] if `args` has the wrong shape
    /// - whatever the operation itself returns
    pub async fn call(&self, method: &str, args: Value) -> Result<Value, AdapterError> {
        match method {
            "createQueue" => to_value(self.client.create_queue(&queue_name(args)?).await?),
            "deleteQueue" => to_value(self.client.delete_queue(&queue_name(args)?).await?),
            "queueUrl" => Ok(Value::String(self.client.queue_url(&queue_name(args)?))),
            "sendMessage" => {
                let request: SendMessageRequest = arguments(args)?;
                to_value(self.client.send_message(request).await?)
            }
            "receiveMessage" => {
                let request: ReceiveMessageRequest = arguments(args)?;
                to_value(self.client.receive_message(request).await?)
            }
            "deleteMessage" => {
                let request: DeleteMessageRequest = arguments(args)?;
                to_value(self.client.delete_message(request).await?)
            }
            "sendMessageBatch" => {
                let request: SendMessageBatchRequest = arguments(args)?;
                to_value(self.client.send_message_batch(request).await?)
            }
            "deleteMessageBatch" => {
                let request: DeleteMessageBatchRequest = arguments(args)?;
                to_value(self.client.delete_message_batch(request).await?)
            }
            other => Err(ValidationError::UnknownOperation {
                name: other.to_string(),
            }
            .into()),
        }
    }
}

#[async_trait]
impl ModuleInstance for SqsClientModule {
    async fn call(&self, method: &str, args: Value) -> Result<Value, AdapterError> {
        SqsClientModule::call(self, method, args).await
    }
}

fn invalid_arguments(message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "arguments".to_string(),
        message: message.into(),
    }
}

fn queue_name(args: Value) -> Result<String, ValidationError> {
    match args {
        Value::String(name) => Ok(name),
        other => Err(invalid_arguments(format!(
            "expected a queue name string, got {}",
            other
        ))),
    }
}

fn arguments<T: DeserializeOwned>(args: Value) -> Result<T, ValidationError> {
    serde_json::from_value(args).map_err(|e| invalid_arguments(e.to_string()))
}

fn to_value<T: Serialize>(output: T) -> Result<Value, AdapterError> {
    Ok(serde_json::to_value(output)?)
}
