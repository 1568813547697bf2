//! Pooled HTTP transport construction.
//!
//! A [`Transport`] is a passive, connection-pooled HTTP client shaped by a
//! [`TransportSettings`] value. Building one performs no network I/O; sockets
//! are opened lazily by the first request and then reused by every caller
//! sharing the transport.
//!
//! A zero value for any knob means "disabled" (timeouts, keep-alive) or
//! "unbounded" (pool limits). No other validation is performed.

use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;

/// Error raised when the HTTP backend cannot be initialised
#[derive(Debug, Error)]
#[error("Failed to create HTTP client: {message}")]
pub struct TransportError {
    pub message: String,
}

/// Connection and timeout shape of a [`Transport`].
///
/// # Examples
///
/// ```
/// use queue_adapter::transport::TransportSettings;
/// use std::time::Duration;
///
/// let settings = TransportSettings::recommended()
///     .with_connect_timeout(Duration::from_secs(2))
///     .with_max_idle_conns_per_host(50);
/// assert_eq!(settings.max_idle_conns_total, 200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransportSettings {
    /// Maximum time to establish a TCP (and TLS) connection
    pub connect_timeout: Duration,
    /// Maximum wait for a `100 Continue` before sending a body
    pub expect_continue_timeout: Duration,
    /// How long an idle pooled connection is kept before eviction
    pub idle_conn_timeout: Duration,
    /// TCP keep-alive probe interval
    pub keep_alive_interval: Duration,
    /// Idle connections kept across all hosts
    pub max_idle_conns_total: usize,
    /// Idle connections kept for any single host
    pub max_idle_conns_per_host: usize,
    /// Maximum wait for response data once the request has been written
    pub response_header_timeout: Duration,
}

impl TransportSettings {
    /// Settings used for every client the registry creates.
    ///
    /// Tuned for many short requests against a single endpoint: aggressive
    /// connect/response timeouts and a large warm pool.
    pub fn recommended() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            expect_continue_timeout: Duration::from_secs(1),
            idle_conn_timeout: Duration::from_secs(90),
            keep_alive_interval: Duration::ZERO,
            max_idle_conns_total: 200,
            max_idle_conns_per_host: 20,
            response_header_timeout: Duration::from_secs(5),
        }
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the expect-continue timeout.
    pub fn with_expect_continue_timeout(mut self, timeout: Duration) -> Self {
        self.expect_continue_timeout = timeout;
        self
    }

    /// Set the idle connection timeout.
    pub fn with_idle_conn_timeout(mut self, timeout: Duration) -> Self {
        self.idle_conn_timeout = timeout;
        self
    }

    /// Set the TCP keep-alive interval.
    pub fn with_keep_alive_interval(mut self, interval: Duration) -> Self {
        self.keep_alive_interval = interval;
        self
    }

    /// Set the total idle connection limit.
    pub fn with_max_idle_conns_total(mut self, max: usize) -> Self {
        self.max_idle_conns_total = max;
        self
    }

    /// Set the per-host idle connection limit.
    pub fn with_max_idle_conns_per_host(mut self, max: usize) -> Self {
        self.max_idle_conns_per_host = max;
        self
    }

    /// Set the response header timeout.
    pub fn with_response_header_timeout(mut self, timeout: Duration) -> Self {
        self.response_header_timeout = timeout;
        self
    }

    /// Per-host idle pool size actually handed to the HTTP backend.
    ///
    /// The backend only bounds idle connections per host, so the total limit
    /// caps the per-host value.
    pub fn effective_idle_per_host(&self) -> usize {
        let per_host = non_zero_count(self.max_idle_conns_per_host);
        let total = non_zero_count(self.max_idle_conns_total);
        per_host.min(total)
    }
}

/// Connection-pooled HTTP client plus the settings it was built from.
///
/// Cloning is cheap and clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    http_client: reqwest::Client,
    settings: TransportSettings,
}

impl Transport {
    /// Build a transport from settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only if the HTTP backend itself fails to
    /// initialise (for example, the TLS backend cannot load).
    pub fn build(settings: TransportSettings) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("queue-adapter/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(non_zero(settings.idle_conn_timeout))
            .pool_max_idle_per_host(settings.effective_idle_per_host())
            .tcp_keepalive(non_zero(settings.keep_alive_interval));

        if let Some(timeout) = non_zero(settings.connect_timeout) {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = non_zero(settings.response_header_timeout) {
            builder = builder.read_timeout(timeout);
        }
        // reqwest never sends `Expect: 100-continue`, so the expect-continue
        // timeout has nothing to bound and is only recorded.

        let http_client = builder.build().map_err(|e| TransportError {
            message: e.to_string(),
        })?;

        tracing::debug!(
            connect_timeout = ?settings.connect_timeout,
            idle_conn_timeout = ?settings.idle_conn_timeout,
            max_idle_per_host = settings.effective_idle_per_host(),
            "Built pooled HTTP transport"
        );

        Ok(Self {
            http_client,
            settings,
        })
    }

    /// Settings this transport was built from
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// The pooled HTTP client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }
}

fn non_zero(duration: Duration) -> Option<Duration> {
    if duration.is_zero() {
        None
    } else {
        Some(duration)
    }
}

fn non_zero_count(count: usize) -> usize {
    if count == 0 {
        usize::MAX
    } else {
        count
    }
}
