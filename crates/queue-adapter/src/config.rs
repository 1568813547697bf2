//! Client configuration and environment fallback.
//!
//! [`ClientConfig`] is what the host passes to `new`. Two fields are
//! mandatory (`url` and `user_id`); the credentials and the region fall back
//! to the conventional AWS environment variables:
//!
//! | Field               | Environment variable    |
//! |---------------------|-------------------------|
//! | `access_key_id`     | `AWS_ACCESS_KEY_ID`     |
//! | `secret_access_key` | `AWS_SECRET_ACCESS_KEY` |
//! | `region`            | `AWS_DEFAULT_REGION`    |
//!
//! Empty strings count as absent, both in the config and in the environment.

use crate::error::{AdapterError, ConfigurationError, FatalConfigError};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Prefix of the environment variables consulted for fallback values
pub const ENV_PREFIX: &str = "AWS";

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Options accepted when constructing a client.
///
/// Field names follow the host's object keys; the Rust-side names are
/// accepted as aliases.
///
/// # Examples
///
/// ```
/// use queue_adapter::ClientConfig;
///
/// let config = ClientConfig::new("http://localhost:9324", "000000000000")
///     .with_credentials("AKIDEXAMPLE", "secret")
///     .with_region("us-east-1");
/// assert_eq!(config.tenant_id.as_deref(), Some("000000000000"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
    #[serde(rename = "user_id", alias = "tenant_id")]
    pub tenant_id: Option<String>,
    #[serde(rename = "url", alias = "endpoint_url")]
    pub endpoint_url: Option<String>,
}

impl ClientConfig {
    /// Create a config with the two mandatory fields set.
    pub fn new(endpoint_url: impl Into<String>, tenant_id: impl Into<String>) -> Self {
        Self {
            endpoint_url: Some(endpoint_url.into()),
            tenant_id: Some(tenant_id.into()),
            ..Self::default()
        }
    }

    /// Set explicit static credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set the signing region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Check the mandatory fields and return `(endpoint_url, tenant_id)`.
    ///
    /// Does not look at the environment.
    pub fn validate(&self) -> Result<(&str, &str), ConfigurationError> {
        let endpoint_url = present(&self.endpoint_url).ok_or_else(|| ConfigurationError::Missing {
            key: "url".to_string(),
        })?;
        let tenant_id = present(&self.tenant_id).ok_or_else(|| ConfigurationError::Missing {
            key: "user_id".to_string(),
        })?;
        Ok((endpoint_url, tenant_id))
    }

    /// Produce a fully resolved configuration.
    ///
    /// Mandatory fields are checked first; the environment is only read when
    /// they are present. Explicit values win over environment values.
    ///
    /// # Errors
    ///
    /// - [`AdapterError::Configuration`] if `url` or `user_id` is missing, or
    ///   the environment cannot be read
    /// - [`AdapterError::Fatal`] if credentials or region remain unresolved
    pub fn resolve(&self, environment: &EnvironmentSource) -> Result<ResolvedConfig, AdapterError> {
        let (endpoint_url, tenant_id) = self.validate()?;
        let defaults = EnvironmentDefaults::load(environment)?;

        let access_key_id = present(&self.access_key_id).or(present(&defaults.access_key_id));
        let secret_access_key =
            present(&self.secret_access_key).or(present(&defaults.secret_access_key));
        let region = present(&self.region).or(present(&defaults.default_region));

        match (access_key_id, secret_access_key, region) {
            (Some(access_key_id), Some(secret_access_key), Some(region)) => Ok(ResolvedConfig {
                credentials: Credentials::new(access_key_id, secret_access_key),
                region: region.to_string(),
                tenant_id: tenant_id.to_string(),
                endpoint_url: endpoint_url.to_string(),
            }),
            (access_key_id, secret_access_key, region) => {
                let missing = [
                    (access_key_id.is_none(), ENV_ACCESS_KEY_ID),
                    (secret_access_key.is_none(), ENV_SECRET_ACCESS_KEY),
                    (region.is_none(), ENV_DEFAULT_REGION),
                ]
                .into_iter()
                .filter_map(|(is_missing, name)| is_missing.then_some(name))
                .collect();
                Err(FatalConfigError { missing }.into())
            }
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("region", &self.region)
            .field("tenant_id", &self.tenant_id)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

/// Where fallback values are read from
#[derive(Debug, Clone, Default)]
pub enum EnvironmentSource {
    /// The process environment
    #[default]
    Process,
    /// A fixed set of variables, keyed by full variable name
    Fixed(HashMap<String, String>),
}

impl EnvironmentSource {
    /// A source with no variables at all
    pub fn empty() -> Self {
        Self::Fixed(HashMap::new())
    }
}

/// Fallback values found in the environment
#[derive(Debug, Default, Deserialize)]
struct EnvironmentDefaults {
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    default_region: Option<String>,
}

impl EnvironmentDefaults {
    fn load(source: &EnvironmentSource) -> Result<Self, ConfigurationError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX);
        let environment = match source {
            EnvironmentSource::Process => environment,
            EnvironmentSource::Fixed(vars) => environment.source(Some(
                vars.iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<config::Map<String, String>>(),
            )),
        };

        config::Config::builder()
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigurationError::Parsing {
                message: e.to_string(),
            })
    }
}

/// Static credentials used for request signing.
///
/// The secret is wiped from memory on drop and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Configuration with every value resolved
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub region: String,
    pub tenant_id: String,
    pub endpoint_url: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
