use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::ProofLink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TxStatus {
    Pending,
    Confirmed,
    Failed,
}

/// One platform transaction. Identity is `tx_hash`; lists are newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub tx_hash: String,
    pub timestamp: DateTime<Utc>,
    pub direction: Direction,
    pub user_id: String,
    pub amount_btc: f64,
    pub amount_usd: f64,
    pub from_address: String,
    pub to_address: String,
    pub status: TxStatus,
    /// Zero unless `status` is `Confirmed`.
    pub confirmations: u32,
    pub fee_btc: f64,
    pub note: String,
    pub proofs: Vec<ProofLink>,
}

/// Sort newest first.
pub(crate) fn sort_newest_first(rows: &mut [TransactionRow]) {
    rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
