//! Process-wide holder of the single [`QueueClient`].
//!
//! The first successful [`ClientRegistry::get_or_create`] call builds the
//! client; every later call returns that same handle and ignores whatever
//! configuration it was given. Concurrent first calls are serialized so only
//! one session is ever constructed. A failed construction stores nothing, so
//! a later call may try again.

use crate::client::QueueClient;
use crate::config::{ClientConfig, EnvironmentSource, ResolvedConfig};
use crate::error::{AdapterError, ConfigurationError};
use crate::service::QueueService;
use crate::sqs::SqsHttpService;
use crate::transport::{Transport, TransportSettings};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::sync::OnceCell;

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

/// Builds the service session behind a new client
pub trait SessionFactory: Send + Sync {
    fn create_session(
        &self,
        config: &ResolvedConfig,
        transport: Transport,
    ) -> Result<Arc<dyn QueueService>, AdapterError>;
}

/// Default factory producing [`SqsHttpService`] sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct SqsSessionFactory;

impl SessionFactory for SqsSessionFactory {
    fn create_session(
        &self,
        config: &ResolvedConfig,
        transport: Transport,
    ) -> Result<Arc<dyn QueueService>, AdapterError> {
        let service = SqsHttpService::new(config, transport)?;
        Ok(Arc::new(service))
    }
}

/// Lazily-initialized, at-most-once client holder
pub struct ClientRegistry {
    client: OnceCell<Arc<QueueClient>>,
    session_factory: Arc<dyn SessionFactory>,
    environment: EnvironmentSource,
}

static GLOBAL_REGISTRY: OnceLock<Arc<ClientRegistry>> = OnceLock::new();

impl ClientRegistry {
    /// Registry reading the process environment and creating SQS sessions
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
            session_factory: Arc::new(SqsSessionFactory),
            environment: EnvironmentSource::Process,
        }
    }

    pub fn with_session_factory(mut self, factory: Arc<dyn SessionFactory>) -> Self {
        self.session_factory = factory;
        self
    }

    /// Replace where credential and region fallbacks are read from
    pub fn with_environment(mut self, environment: EnvironmentSource) -> Self {
        self.environment = environment;
        self
    }

    /// The process-wide registry. Created on first access, never torn down.
    pub fn global() -> Arc<ClientRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(ClientRegistry::new()))
            .clone()
    }

    /// The client, if one has been created
    pub fn get(&self) -> Option<Arc<QueueClient>> {
        self.client.get().cloned()
    }

    /// Return the shared client, creating it from `config` on first use.
    ///
    /// Once a client exists `config` is not looked at, not even validated.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::Configuration`] if `url` or `user_id` is missing;
    ///   checked before the environment is read or a session is built
    /// - [`AdapterError::Fatal`] if credentials or region cannot be resolved
    pub async fn get_or_create(
        &self,
        config: &ClientConfig,
    ) -> Result<Arc<QueueClient>, AdapterError> {
        if let Some(client) = self.client.get() {
            tracing::debug!(
                endpoint_url = ?config.endpoint_url,
                "Queue client already exists; ignoring supplied configuration"
            );
            return Ok(client.clone());
        }

        let client = self
            .client
            .get_or_try_init(|| async { self.create_client(config).map(Arc::new) })
            .await?;
        Ok(client.clone())
    }

    fn create_client(&self, config: &ClientConfig) -> Result<QueueClient, AdapterError> {
        let resolved = config.resolve(&self.environment)?;

        let transport = Transport::build(TransportSettings::recommended())
            .map_err(ConfigurationError::from)?;
        let session = self.session_factory.create_session(&resolved, transport)?;

        tracing::info!(
            endpoint_url = %resolved.endpoint_url,
            tenant_id = %resolved.tenant_id,
            region = %resolved.region,
            "Created queue client"
        );

        Ok(QueueClient::new(
            session,
            resolved.endpoint_url.clone(),
            resolved.tenant_id.clone(),
        ))
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("client", &self.client.get())
            .finish_non_exhaustive()
    }
}
