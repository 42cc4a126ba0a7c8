use serde::{Deserialize, Serialize};

/// ckBTC explorer linked from every summary.
pub const CKBTC_EXPLORER_URL: &str = "https://dashboard.internetcomputer.org/bitcoin";
/// Bitcoin block explorer linked from every summary.
pub const BTC_BROWSER_URL: &str = "https://mempool.space/";
/// In-app anchor of the address cluster table.
pub const ADDRESS_CLUSTERS_ANCHOR: &str = "#addresses";

/// Headline reserve metrics. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_btc: f64,
    pub total_usd: f64,
    pub netflow_24h_btc: f64,
    pub netflow_7d_btc: f64,
    /// Share of reserves attributed to identified clusters, 0..=100.
    pub coverage_pct: f64,
    /// Always `100 - coverage_pct`.
    pub unknown_pct: f64,
    /// Display timestamp (`MM/DD HH:MM`).
    pub updated_at: String,
    pub proof: ProofLinks,
}

/// Verification links attached to a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofLinks {
    pub ckbtc_explorer: String,
    pub btc_browser: String,
    pub address_clusters: String,
}

impl Default for ProofLinks {
    fn default() -> Self {
        Self {
            ckbtc_explorer: CKBTC_EXPLORER_URL.into(),
            btc_browser: BTC_BROWSER_URL.into(),
            address_clusters: ADDRESS_CLUSTERS_ANCHOR.into(),
        }
    }
}

impl Summary {
    /// Format used for `updated_at`.
    pub const UPDATED_AT_FORMAT: &'static str = "%m/%d %H:%M";

    /// Build a summary, deriving `unknown_pct` from `coverage_pct`.
    ///
    /// Coverage is clamped to `0..=100` so the pair always sums to 100.
    pub fn new(
        total_btc: f64,
        total_usd: f64,
        netflow_24h_btc: f64,
        netflow_7d_btc: f64,
        coverage_pct: f64,
        updated_at: String,
    ) -> Self {
        let coverage_pct = coverage_pct.clamp(0.0, 100.0);
        Self {
            total_btc,
            total_usd,
            netflow_24h_btc,
            netflow_7d_btc,
            coverage_pct,
            unknown_pct: 100.0 - coverage_pct,
            updated_at,
            proof: ProofLinks::default(),
        }
    }

    /// The static demo summary shown before the first fetch completes.
    pub fn demo(updated_at: String) -> Self {
        Self::new(1247.8932, 76_543_210.88, 8.7654, -23.4567, 82.0, updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_complement_of_coverage() {
        let s = Summary::new(1.0, 61_500.0, 0.0, 0.0, 90.0, String::new());
        assert!((s.coverage_pct + s.unknown_pct - 100.0).abs() < f64::EPSILON);
        assert!((s.unknown_pct - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn coverage_is_clamped() {
        let s = Summary::new(0.0, 0.0, 0.0, 0.0, 140.0, String::new());
        assert!((s.coverage_pct - 100.0).abs() < f64::EPSILON);
        assert!(s.unknown_pct.abs() < f64::EPSILON);
    }
}
