// ── Dashboard facade ──
//
// Ties the orchestrator, synthetic generator, data store and connectivity
// monitor together. Every fetch either stores live data and reports online,
// or stores synthetic data and reports offline. Fetch operations never fail.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use odinsight_api::{SourceClient, TransportConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::connectivity::{ApiStatus, ConnectivityMonitor, HealthProbe};
use crate::error::CoreError;
use crate::model::{
    AddressRow, ChartRange, Language, Series, SeriesKind, Summary, TransactionRow,
};
use crate::orchestrator::{FetchOrchestrator, FetchOutcome};
use crate::registry::SourceRegistry;
use crate::store::{DashboardSnapshot, DataOrigin, DataOrigins, DataStore};
use crate::stream::ValueStream;
use crate::synthetic::SyntheticGenerator;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. One instance owns exactly
/// one connectivity state and one data store.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    orchestrator: FetchOrchestrator,
    generator: SyntheticGenerator,
    store: DataStore,
    monitor: ConnectivityMonitor,
    refreshing: AtomicUsize,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

/// How one fetch resolved, for callers that want to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Resolution {
    Live,
    /// Sources were tried and all failed.
    Exhausted,
    /// Nothing serves the query. Treated like exhaustion, logged apart.
    Unsupported,
}

impl<T> From<&FetchOutcome<T>> for Resolution {
    fn from(outcome: &FetchOutcome<T>) -> Self {
        match outcome {
            FetchOutcome::Live { .. } => Self::Live,
            FetchOutcome::Exhausted => Self::Exhausted,
            FetchOutcome::Unsupported => Self::Unsupported,
        }
    }
}

impl Dashboard {
    /// Create a dashboard from configuration. Does not touch the network;
    /// call [`start()`](Self::start) for the initial health check and
    /// background tasks.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_probe_timeout(config.probe_timeout);
        let client = SourceClient::new(&transport)?;
        let registry = SourceRegistry::new(config.sources.clone());
        Ok(Self::from_parts(config, client, registry, Arc::new(SystemClock)))
    }

    /// Create a dashboard around explicit collaborators.
    pub fn from_parts(
        config: DashboardConfig,
        client: SourceClient,
        registry: SourceRegistry,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let generator = SyntheticGenerator::new(Arc::clone(&clock));
        let orchestrator = FetchOrchestrator::new(client, Arc::new(registry), clock);

        let probe_orchestrator = orchestrator.clone();
        let probe: HealthProbe = Arc::new(move || {
            let orchestrator = probe_orchestrator.clone();
            async move { orchestrator.find_working_source().await }.boxed()
        });
        let monitor = ConnectivityMonitor::new(config.connectivity, probe);

        let store = DataStore::new(
            generator.demo_summary(),
            generator.series(SeriesKind::Netflow, ChartRange::Week),
            generator.series(SeriesKind::Total, ChartRange::Week),
        );

        Self {
            inner: Arc::new(DashboardInner {
                config,
                orchestrator,
                generator,
                store,
                monitor,
                refreshing: AtomicUsize::new(0),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.inner.monitor
    }

    pub fn registry(&self) -> &SourceRegistry {
        self.inner.orchestrator.registry()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Run the initial health check, then spawn the periodic health task
    /// and, if configured, the periodic refresh.
    pub async fn start(&self) -> ApiStatus {
        let status = self.inner.monitor.start().await;

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let dashboard = self.clone();
            let cancel = self.inner.cancel.child_token();
            self.inner
                .task_handles
                .lock()
                .await
                .push(tokio::spawn(refresh_task(dashboard, interval_secs, cancel)));
        }

        info!(%status, sources = self.registry().len(), "dashboard started");
        status
    }

    /// Cancel background tasks and every timer.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        self.inner.monitor.shutdown().await;
        debug!("dashboard shut down");
    }

    /// One-shot: build, run closure, shut down.
    ///
    /// Optimized for CLI: no periodic refresh or health task.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Dashboard) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;
        cfg.connectivity.health_interval = Duration::ZERO;

        let dashboard = Dashboard::new(cfg)?;
        let result = f(dashboard.clone()).await;
        dashboard.shutdown().await;
        result
    }

    // ── Fetch operations ─────────────────────────────────────────────

    /// Refresh the headline summary.
    pub async fn fetch_summary(&self) -> DataOrigin {
        let outcome = self.inner.orchestrator.fetch_summary().await;
        let resolution = Resolution::from(&outcome);
        let now = self.inner.generator.now();

        let origin = match outcome {
            FetchOutcome::Live { source, value } => {
                self.inner.store.set_summary(value, DataOrigin::live(&source), now);
                DataOrigin::live(source)
            }
            FetchOutcome::Exhausted | FetchOutcome::Unsupported => {
                self.inner
                    .store
                    .set_summary(self.inner.generator.summary(), DataOrigin::Synthetic, now);
                DataOrigin::Synthetic
            }
        };
        self.settle(resolution, "summary");
        origin
    }

    /// Refresh both chart series for `range`, concurrently.
    ///
    /// Each series that comes back live is stored. A series that does not is
    /// synthesized when the stored one belongs to another range. When
    /// neither is live both are synthesized.
    pub async fn fetch_series(&self, range: ChartRange) -> (DataOrigin, DataOrigin) {
        let orchestrator = &self.inner.orchestrator;
        let (net, total) = tokio::join!(
            orchestrator.fetch_series(SeriesKind::Netflow, range),
            orchestrator.fetch_series(SeriesKind::Total, range),
        );

        let resolution = match (Resolution::from(&net), Resolution::from(&total)) {
            (Resolution::Live, _) | (_, Resolution::Live) => Resolution::Live,
            (Resolution::Unsupported, Resolution::Unsupported) => Resolution::Unsupported,
            _ => Resolution::Exhausted,
        };
        let any_live = resolution == Resolution::Live;

        let net_origin = self.store_series(net, SeriesKind::Netflow, range, any_live);
        let total_origin = self.store_series(total, SeriesKind::Total, range, any_live);
        self.settle(resolution, "series");
        (net_origin, total_origin)
    }

    fn store_series(
        &self,
        outcome: FetchOutcome<Series>,
        kind: SeriesKind,
        range: ChartRange,
        other_live: bool,
    ) -> DataOrigin {
        let store = &self.inner.store;
        let (current, current_origin) = match kind {
            SeriesKind::Netflow => (store.series_net(), store.origins().series_net),
            SeriesKind::Total => (store.series_total(), store.origins().series_total),
        };

        let (series, origin) = match outcome {
            FetchOutcome::Live { source, value } => (value, DataOrigin::live(source)),
            _ if other_live && current.range == range => {
                return current_origin;
            }
            _ => (self.inner.generator.series(kind, range), DataOrigin::Synthetic),
        };

        match kind {
            SeriesKind::Netflow => store.set_series_net(series, origin.clone()),
            SeriesKind::Total => store.set_series_total(series, origin.clone()),
        }
        origin
    }

    /// Refresh address clusters with notes in `language`.
    pub async fn fetch_addresses(&self, language: Language) -> DataOrigin {
        let outcome = self.inner.orchestrator.fetch_addresses().await;
        let resolution = Resolution::from(&outcome);

        let origin = match outcome {
            FetchOutcome::Live { source, value } => {
                let rows: Vec<AddressRow> = value
                    .into_iter()
                    .map(|cluster| cluster.localize(language))
                    .collect();
                self.inner.store.set_addresses(rows, DataOrigin::live(&source));
                DataOrigin::live(source)
            }
            FetchOutcome::Exhausted | FetchOutcome::Unsupported => {
                self.inner
                    .store
                    .set_addresses(self.inner.generator.addresses(language), DataOrigin::Synthetic);
                DataOrigin::Synthetic
            }
        };
        self.settle(resolution, "addresses");
        origin
    }

    /// Refresh the transaction list (configured count and language).
    pub async fn fetch_transactions(&self) -> DataOrigin {
        let count = self.inner.config.transaction_count;
        let language = self.inner.config.language;
        let outcome = self
            .inner
            .orchestrator
            .fetch_transactions(count, language)
            .await;
        let resolution = Resolution::from(&outcome);

        let origin = match outcome {
            FetchOutcome::Live { source, value } => {
                self.inner
                    .store
                    .set_transactions(value, DataOrigin::live(&source));
                DataOrigin::live(source)
            }
            FetchOutcome::Exhausted | FetchOutcome::Unsupported => {
                self.inner.store.set_transactions(
                    self.inner.generator.transactions(count, language),
                    DataOrigin::Synthetic,
                );
                DataOrigin::Synthetic
            }
        };
        self.settle(resolution, "transactions");
        origin
    }

    /// Refresh every domain concurrently.
    ///
    /// Each domain runs as its own task; one failing never blocks or
    /// corrupts the others. `loading` is true for the duration.
    pub async fn refresh_all(&self, range: ChartRange, language: Language) -> DataOrigins {
        self.begin_loading();
        self.inner.store.clear_error();

        let summary = tokio::spawn({
            let d = self.clone();
            async move { d.fetch_summary().await }
        });
        let series = tokio::spawn({
            let d = self.clone();
            async move { d.fetch_series(range).await }
        });
        let addresses = tokio::spawn({
            let d = self.clone();
            async move { d.fetch_addresses(language).await }
        });
        let transactions = tokio::spawn({
            let d = self.clone();
            async move { d.fetch_transactions().await }
        });

        let (summary, series, addresses, transactions) =
            tokio::join!(summary, series, addresses, transactions);

        let failures: Vec<String> = [
            ("summary", summary.as_ref().err()),
            ("series", series.as_ref().err()),
            ("addresses", addresses.as_ref().err()),
            ("transactions", transactions.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(domain, err)| err.map(|e| format!("{domain} refresh failed: {e}")))
        .collect();

        if !failures.is_empty() {
            for failure in &failures {
                warn!(error = %failure, "refresh task aborted");
            }
            self.inner.store.set_error(failures.join("; "));
        }

        self.end_loading();
        debug!(?range, %language, "refresh complete");
        self.inner.store.origins()
    }

    /// Force a connectivity probe now.
    pub async fn check_health(&self) -> ApiStatus {
        self.inner.monitor.check_health().await
    }

    // ── Read surface ─────────────────────────────────────────────────

    pub fn summary(&self) -> Arc<Summary> {
        self.inner.store.summary()
    }

    pub fn series_net(&self) -> Arc<Series> {
        self.inner.store.series_net()
    }

    pub fn series_total(&self) -> Arc<Series> {
        self.inner.store.series_total()
    }

    pub fn addresses(&self) -> Arc<Vec<AddressRow>> {
        self.inner.store.addresses()
    }

    pub fn transactions(&self) -> Arc<Vec<TransactionRow>> {
        self.inner.store.transactions()
    }

    pub fn loading(&self) -> bool {
        self.inner.store.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.store.error()
    }

    pub fn api_status(&self) -> ApiStatus {
        self.inner.monitor.status()
    }

    pub fn reconnect_countdown(&self) -> u32 {
        self.inner.monitor.countdown()
    }

    pub fn last_updated(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.inner.store.last_updated()
    }

    /// Copy of the whole read surface.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let store = &self.inner.store;
        DashboardSnapshot {
            summary: store.summary(),
            series_net: store.series_net(),
            series_total: store.series_total(),
            addresses: store.addresses(),
            transactions: store.transactions(),
            loading: store.loading(),
            error: store.error(),
            api_status: self.inner.monitor.status(),
            reconnect_countdown: self.inner.monitor.countdown(),
            last_updated: store.last_updated(),
            origins: store.origins(),
        }
    }

    pub fn subscribe_status(&self) -> ValueStream<ApiStatus> {
        ValueStream::new(self.inner.monitor.subscribe_status())
    }

    pub fn subscribe_countdown(&self) -> ValueStream<u32> {
        ValueStream::new(self.inner.monitor.subscribe_countdown())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Apply a fetch's effect on connectivity and the error flag.
    fn settle(&self, resolution: Resolution, domain: &str) {
        match resolution {
            Resolution::Live => {
                self.inner.store.clear_error();
                self.inner.monitor.report_online();
            }
            Resolution::Exhausted | Resolution::Unsupported => {
                if resolution == Resolution::Unsupported {
                    debug!(domain, "query not served by any source, serving synthetic");
                } else {
                    debug!(domain, "no live data, serving synthetic");
                }
                self.inner.store.clear_error();
                self.inner.monitor.report_offline();
            }
        }
    }

    fn begin_loading(&self) {
        self.inner.refreshing.fetch_add(1, Ordering::AcqRel);
        self.inner.store.set_loading(true);
    }

    fn end_loading(&self) {
        if self.inner.refreshing.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.store.set_loading(false);
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodically refresh every domain.
async fn refresh_task(dashboard: Dashboard, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    let range = dashboard.inner.config.default_range;
    let language = dashboard.inner.config.language;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                dashboard.refresh_all(range, language).await;
            }
        }
    }
}
