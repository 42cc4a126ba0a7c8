// ── Central reactive data store ──
//
// One `watch` channel per domain value. Every write replaces the whole
// value behind an `Arc`, so a reader holds either the previous or the new
// value and never a mix of the two.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::connectivity::ApiStatus;
use crate::model::{AddressRow, Series, Summary, TransactionRow};
use crate::stream::ValueStream;

/// Where a stored value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DataOrigin {
    /// Fetched from the named source.
    Live { source: String },
    /// Produced by the synthetic generator.
    Synthetic,
}

impl DataOrigin {
    pub fn live(source: impl Into<String>) -> Self {
        Self::Live {
            source: source.into(),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Live { source } => write!(f, "live ({source})"),
            Self::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// Origin of each domain value currently held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataOrigins {
    pub summary: DataOrigin,
    pub series_net: DataOrigin,
    pub series_total: DataOrigin,
    pub addresses: DataOrigin,
    pub transactions: DataOrigin,
}

impl Default for DataOrigins {
    fn default() -> Self {
        Self {
            summary: DataOrigin::Synthetic,
            series_net: DataOrigin::Synthetic,
            series_total: DataOrigin::Synthetic,
            addresses: DataOrigin::Synthetic,
            transactions: DataOrigin::Synthetic,
        }
    }
}

/// The whole read surface at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub summary: Arc<Summary>,
    pub series_net: Arc<Series>,
    pub series_total: Arc<Series>,
    pub addresses: Arc<Vec<AddressRow>>,
    pub transactions: Arc<Vec<TransactionRow>>,
    pub loading: bool,
    pub error: Option<String>,
    pub api_status: ApiStatus,
    pub reconnect_countdown: u32,
    pub last_updated: Option<DateTime<Utc>>,
    pub origins: DataOrigins,
}

/// Central reactive store for the dashboard's domain values.
pub struct DataStore {
    summary: watch::Sender<Arc<Summary>>,
    series_net: watch::Sender<Arc<Series>>,
    series_total: watch::Sender<Arc<Series>>,
    addresses: watch::Sender<Arc<Vec<AddressRow>>>,
    transactions: watch::Sender<Arc<Vec<TransactionRow>>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    last_updated: watch::Sender<Option<DateTime<Utc>>>,
    origins: watch::Sender<DataOrigins>,
}

impl DataStore {
    /// A store holding the pre-fetch placeholders.
    pub fn new(summary: Summary, series_net: Series, series_total: Series) -> Self {
        Self {
            summary: watch::Sender::new(Arc::new(summary)),
            series_net: watch::Sender::new(Arc::new(series_net)),
            series_total: watch::Sender::new(Arc::new(series_total)),
            addresses: watch::Sender::new(Arc::new(Vec::new())),
            transactions: watch::Sender::new(Arc::new(Vec::new())),
            loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
            last_updated: watch::Sender::new(None),
            origins: watch::Sender::new(DataOrigins::default()),
        }
    }

    // ── Writers ──────────────────────────────────────────────────────

    pub(crate) fn set_summary(&self, summary: Summary, origin: DataOrigin, at: DateTime<Utc>) {
        self.summary.send_replace(Arc::new(summary));
        self.origins.send_modify(|o| o.summary = origin);
        self.last_updated.send_replace(Some(at));
    }

    pub(crate) fn set_series_net(&self, series: Series, origin: DataOrigin) {
        self.series_net.send_replace(Arc::new(series));
        self.origins.send_modify(|o| o.series_net = origin);
    }

    pub(crate) fn set_series_total(&self, series: Series, origin: DataOrigin) {
        self.series_total.send_replace(Arc::new(series));
        self.origins.send_modify(|o| o.series_total = origin);
    }

    pub(crate) fn set_addresses(&self, rows: Vec<AddressRow>, origin: DataOrigin) {
        self.addresses.send_replace(Arc::new(rows));
        self.origins.send_modify(|o| o.addresses = origin);
    }

    pub(crate) fn set_transactions(&self, rows: Vec<TransactionRow>, origin: DataOrigin) {
        self.transactions.send_replace(Arc::new(rows));
        self.origins.send_modify(|o| o.transactions = origin);
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.loading.send_if_modified(|current| {
            let changed = *current != loading;
            *current = loading;
            changed
        });
    }

    pub(crate) fn set_error(&self, message: impl Into<String>) {
        self.error.send_replace(Some(message.into()));
    }

    pub(crate) fn clear_error(&self) {
        self.error.send_if_modified(|current| current.take().is_some());
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn summary(&self) -> Arc<Summary> {
        self.summary.borrow().clone()
    }

    pub fn series_net(&self) -> Arc<Series> {
        self.series_net.borrow().clone()
    }

    pub fn series_total(&self) -> Arc<Series> {
        self.series_total.borrow().clone()
    }

    pub fn addresses(&self) -> Arc<Vec<AddressRow>> {
        self.addresses.borrow().clone()
    }

    pub fn transactions(&self) -> Arc<Vec<TransactionRow>> {
        self.transactions.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.last_updated.borrow()
    }

    pub fn origins(&self) -> DataOrigins {
        self.origins.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_summary(&self) -> ValueStream<Arc<Summary>> {
        ValueStream::new(self.summary.subscribe())
    }

    pub fn subscribe_series_net(&self) -> ValueStream<Arc<Series>> {
        ValueStream::new(self.series_net.subscribe())
    }

    pub fn subscribe_series_total(&self) -> ValueStream<Arc<Series>> {
        ValueStream::new(self.series_total.subscribe())
    }

    pub fn subscribe_addresses(&self) -> ValueStream<Arc<Vec<AddressRow>>> {
        ValueStream::new(self.addresses.subscribe())
    }

    pub fn subscribe_transactions(&self) -> ValueStream<Arc<Vec<TransactionRow>>> {
        ValueStream::new(self.transactions.subscribe())
    }

    pub fn subscribe_loading(&self) -> ValueStream<bool> {
        ValueStream::new(self.loading.subscribe())
    }

    pub fn subscribe_error(&self) -> ValueStream<Option<String>> {
        ValueStream::new(self.error.subscribe())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::*;
    use crate::model::{ChartRange, SeriesKind};

    fn empty_series(kind: SeriesKind) -> Series {
        Series {
            kind,
            range: ChartRange::Week,
            points: Vec::new(),
        }
    }

    fn store() -> DataStore {
        DataStore::new(
            Summary::demo("05/01 00:00".into()),
            empty_series(SeriesKind::Netflow),
            empty_series(SeriesKind::Total),
        )
    }

    #[test]
    fn starts_with_placeholders() {
        let store = store();
        assert!((store.summary().total_btc - 1247.8932).abs() < f64::EPSILON);
        assert!(store.addresses().is_empty());
        assert!(store.transactions().is_empty());
        assert!(!store.loading());
        assert_eq!(store.error(), None);
        assert_eq!(store.last_updated(), None);
        assert_eq!(store.origins(), DataOrigins::default());
    }

    #[test]
    fn readers_keep_their_snapshot() {
        let store = store();
        let before = store.summary();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        store.set_summary(
            Summary::new(1.0, 61_500.0, 0.0, 0.0, 90.0, "05/01 00:00".into()),
            DataOrigin::live("icp"),
            at,
        );

        assert!((before.total_btc - 1247.8932).abs() < f64::EPSILON);
        assert!((store.summary().total_btc - 1.0).abs() < f64::EPSILON);
        assert_eq!(store.origins().summary, DataOrigin::live("icp"));
        assert_eq!(store.last_updated(), Some(at));
    }

    #[tokio::test]
    async fn subscribers_see_replacements() {
        let store = store();
        let mut errors = store.subscribe_error();
        store.set_error("boom");
        assert_eq!(errors.changed().await, Some(Some("boom".to_owned())));
        store.clear_error();
        assert_eq!(errors.changed().await, Some(None));
    }
}
