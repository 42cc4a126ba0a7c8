// ── Wire models ──
//
// Raw upstream payload shapes. Every field is optional: providers omit
// values freely and the conversion layer in `odinsight-core` applies the
// defaults. A payload that fails to decode at all is a malformed response.

use serde::{Deserialize, Serialize};

/// A timestamp as providers send it: epoch milliseconds or an ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireTimestamp {
    Millis(i64),
    Text(String),
}

/// A `{type, url}` proof link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireProof {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

// ── ICP dashboard contract ──────────────────────────────────────────

/// `GET {summary}`. Amounts are in satoshis except `total_supply_usd`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpSummary {
    pub total_supply: Option<f64>,
    pub total_supply_usd: Option<f64>,
    pub net_flow_24h: Option<f64>,
    pub net_flow_7d: Option<f64>,
    pub coverage_percentage: Option<f64>,
    pub last_updated: Option<WireTimestamp>,
}

/// `GET {series}?range=..&type=..`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpSeries {
    pub time_series: Option<Vec<IcpSeriesPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpSeriesPoint {
    pub timestamp: Option<WireTimestamp>,
    /// Satoshis.
    pub value: Option<f64>,
    pub coverage: Option<f64>,
}

/// `GET {addresses}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpHolders {
    pub holders: Option<Vec<IcpHolder>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IcpHolder {
    pub label: Option<String>,
    pub chain: Option<String>,
    pub principal: Option<String>,
    pub address: Option<String>,
    pub last_transaction: Option<String>,
    /// Satoshis received.
    pub received: Option<f64>,
    /// Satoshis sent.
    pub sent: Option<f64>,
    pub note_zh: Option<String>,
    pub note_en: Option<String>,
    pub proofs: Option<Vec<WireProof>>,
}

/// `GET {transactions}?limit=..`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireTransactions {
    pub transactions: Option<Vec<WireTransaction>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireTransaction {
    pub tx_hash: Option<String>,
    pub timestamp: Option<WireTimestamp>,
    /// `deposit` or `withdrawal`.
    pub direction: Option<String>,
    pub user_id: Option<String>,
    /// Satoshis.
    pub amount: Option<f64>,
    pub amount_usd: Option<f64>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    /// `pending`, `confirmed` or `failed`.
    pub status: Option<String>,
    pub confirmations: Option<u32>,
    /// Satoshis.
    pub fee: Option<f64>,
    pub note: Option<String>,
    pub proofs: Option<Vec<WireProof>>,
}

// ── mempool.space contract ──────────────────────────────────────────

/// `GET /v1/statistics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolStatistics {
    /// Whole BTC.
    pub total_bitcoins: Option<f64>,
    /// Satoshis waiting in the mempool.
    pub mempool_size: Option<f64>,
}

/// One element of `GET /v1/statistics/24h`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolStatPoint {
    /// Epoch seconds.
    #[serde(alias = "timestamp")]
    pub added: Option<i64>,
    /// Satoshis.
    #[serde(alias = "tx_count")]
    pub total_fee: Option<f64>,
}

// ── Per-kind payloads ───────────────────────────────────────────────

/// A decoded summary response, tagged by the contract that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryPayload {
    Icp(IcpSummary),
    Mempool(MempoolStatistics),
}

/// A decoded series response, tagged by the contract that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesPayload {
    Icp(IcpSeries),
    Mempool(Vec<MempoolStatPoint>),
}
