// Shared transport configuration for building reqwest::Client instances.
//
// One client serves every registered source; per-request timeouts
// distinguish the short reachability probe from a full data fetch.

use std::time::Duration;

use crate::error::Error;

/// Default timeout for a data request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for a reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Upper bound on a single fetch (summary, series, addresses, transactions).
    pub timeout: Duration,
    /// Upper bound on a reachability probe.
    pub probe_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            user_agent: format!("OdinSight/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The client-level timeout is the larger of the two so that neither
    /// per-request bound is cut short.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout.max(self.probe_timeout))
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| Error::HttpClient(e.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, probe_timeout: Duration) -> Self {
        self.probe_timeout = probe_timeout;
        self
    }
}
