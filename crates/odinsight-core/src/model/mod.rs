// ── Domain model ──
//
// Canonical types every consumer reads. Live payloads and synthetic data
// both end up as these; nothing here knows where a value came from.

mod address;
mod series;
mod summary;
mod transaction;

pub use address::{AddressCluster, AddressRow, Language, LocalizedNote, ProofLink};
pub use series::{ChartRange, LabelFormat, Series, SeriesKind, SeriesPoint};
pub use summary::{ADDRESS_CLUSTERS_ANCHOR, BTC_BROWSER_URL, CKBTC_EXPLORER_URL, ProofLinks, Summary};
pub use transaction::{Direction, TransactionRow, TxStatus};
pub(crate) use transaction::sort_newest_first;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// Fixed USD price used where a provider reports BTC without a valuation.
pub const BTC_PRICE_USD: f64 = 61_500.0;

/// Coverage assumed when a provider omits it.
pub const DEFAULT_COVERAGE_PCT: f64 = 85.0;

/// Convert satoshis to BTC.
pub fn sats_to_btc(sats: f64) -> f64 {
    sats / SATS_PER_BTC
}
