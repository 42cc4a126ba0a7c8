// odinsight-core: Data layer between odinsight-api and consumers (CLI).
//
// Resolves every dashboard query against a prioritized list of sources,
// falls back to deterministic synthetic data, and tracks connectivity.

pub mod clock;
pub mod config;
pub mod connectivity;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod orchestrator;
pub mod registry;
pub mod store;
pub mod stream;
pub mod synthetic;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::DashboardConfig;
pub use connectivity::{ApiStatus, ConnectivityConfig, ConnectivityMonitor, HealthProbe};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use orchestrator::{FetchOrchestrator, FetchOutcome};
pub use registry::SourceRegistry;
pub use store::{DashboardSnapshot, DataOrigin, DataOrigins, DataStore};
pub use stream::{ValueStream, ValueWatchStream};
pub use synthetic::SyntheticGenerator;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AddressCluster, AddressRow, ChartRange, Direction, Language, LocalizedNote, ProofLink,
    ProofLinks, Series, SeriesKind, SeriesPoint, Summary, TransactionRow, TxStatus,
};
