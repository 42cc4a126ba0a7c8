// ── Runtime dashboard configuration ──
//
// Describes which sources to use and how to time requests and reconnects.
// Never touches disk: the CLI builds a `DashboardConfig` and hands it in.

use std::time::Duration;

use odinsight_api::SourceDescriptor;
use odinsight_api::transport::{DEFAULT_PROBE_TIMEOUT, DEFAULT_TIMEOUT};

use crate::connectivity::ConnectivityConfig;
use crate::model::{ChartRange, Language};
use crate::synthetic::DEFAULT_TRANSACTION_COUNT;

/// Configuration for one [`Dashboard`](crate::Dashboard).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Candidate sources in priority order.
    pub sources: Vec<SourceDescriptor>,
    /// Per-request fetch timeout.
    pub timeout: Duration,
    /// Reachability probe timeout.
    pub probe_timeout: Duration,
    /// Range used by the periodic refresh.
    pub default_range: ChartRange,
    /// Language of notes in the periodic refresh and transaction fetches.
    pub language: Language,
    pub connectivity: ConnectivityConfig,
    /// How often to run `refresh_all` in the background (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Transactions requested per fetch.
    pub transaction_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            default_range: ChartRange::default(),
            language: Language::default(),
            connectivity: ConnectivityConfig::default(),
            refresh_interval_secs: 0,
            transaction_count: DEFAULT_TRANSACTION_COUNT,
        }
    }
}

impl DashboardConfig {
    /// Defaults with the built-in ICP dashboard and mempool.space sources.
    pub fn with_builtin_sources() -> Result<Self, crate::CoreError> {
        Ok(Self {
            sources: vec![
                SourceDescriptor::icp_dashboard()?,
                SourceDescriptor::mempool_space()?,
            ],
            ..Self::default()
        })
    }
}
