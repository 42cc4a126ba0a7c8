// ── Payload → domain conversion ──
//
// One transform per `SourceKind` and query. Missing fields take documented
// defaults; a payload that cannot be made sense of is a `CoreError::Transform`
// and counts as that source's failure.

use chrono::{DateTime, NaiveDate, Utc};
use odinsight_api::models::{
    IcpHolder, IcpHolders, IcpSeries, IcpSummary, MempoolStatPoint, MempoolStatistics,
    SeriesPayload, SummaryPayload, WireProof, WireTimestamp, WireTransaction, WireTransactions,
};

use crate::error::CoreError;
use crate::model::{
    AddressCluster, BTC_PRICE_USD, CKBTC_EXPLORER_URL, BTC_BROWSER_URL, ChartRange,
    DEFAULT_COVERAGE_PCT, Direction, Language, LocalizedNote, ProofLink, Series, SeriesKind,
    SeriesPoint, Summary, TransactionRow, TxStatus, sats_to_btc, sort_newest_first,
};

/// Coverage reported for mempool.space data, which carries no attribution.
pub const MEMPOOL_COVERAGE_PCT: f64 = 82.0;

// ── Summary ──────────────────────────────────────────────────────────

pub fn summary(
    source_name: &str,
    payload: SummaryPayload,
    now: DateTime<Utc>,
) -> Result<Summary, CoreError> {
    match payload {
        SummaryPayload::Icp(data) => icp_summary(source_name, data, now),
        SummaryPayload::Mempool(data) => Ok(mempool_summary(&data, now)),
    }
}

fn icp_summary(source_name: &str, data: IcpSummary, now: DateTime<Utc>) -> Result<Summary, CoreError> {
    let updated = match data.last_updated {
        Some(ts) => parse_timestamp(source_name, &ts)?,
        None => now,
    };
    Ok(Summary::new(
        sats_to_btc(data.total_supply.unwrap_or_default()),
        data.total_supply_usd.unwrap_or_default(),
        sats_to_btc(data.net_flow_24h.unwrap_or_default()),
        sats_to_btc(data.net_flow_7d.unwrap_or_default()),
        coverage_or_default(data.coverage_percentage),
        updated.format(Summary::UPDATED_AT_FORMAT).to_string(),
    ))
}

fn mempool_summary(data: &MempoolStatistics, now: DateTime<Utc>) -> Summary {
    let total_btc = data.total_bitcoins.unwrap_or_default();
    let mempool = data.mempool_size.unwrap_or_default();
    Summary::new(
        total_btc,
        total_btc * BTC_PRICE_USD,
        sats_to_btc(mempool),
        sats_to_btc(mempool * 7.0),
        MEMPOOL_COVERAGE_PCT,
        now.format(Summary::UPDATED_AT_FORMAT).to_string(),
    )
}

// ── Series ───────────────────────────────────────────────────────────

/// Convert and normalise a series to `range`.
///
/// Labels are re-rendered in the range's format. A longer series keeps its
/// newest `range.points()` entries; a shorter non-empty one is rejected.
/// An empty result is returned as-is for the caller to treat as "not found".
pub fn series(
    source_name: &str,
    payload: SeriesPayload,
    kind: SeriesKind,
    range: ChartRange,
) -> Result<Series, CoreError> {
    let mut raw = match payload {
        SeriesPayload::Icp(data) => icp_series(source_name, data)?,
        SeriesPayload::Mempool(data) => mempool_series(source_name, &data)?,
    };
    raw.sort_by_key(|(at, _, _)| *at);

    let wanted = range.points();
    if !raw.is_empty() && raw.len() < wanted {
        return Err(CoreError::transform(
            source_name,
            format!("series has {} points, range {range} needs {wanted}", raw.len()),
        ));
    }

    let format = range.label_format();
    let skip = raw.len().saturating_sub(wanted);
    let points = raw
        .into_iter()
        .skip(skip)
        .map(|(at, value, coverage_pct)| SeriesPoint {
            ts: format.render(&at),
            value,
            coverage_pct,
        })
        .collect();

    Ok(Series {
        kind,
        range,
        points,
    })
}

type RawPoint = (DateTime<Utc>, f64, f64);

fn icp_series(source_name: &str, data: IcpSeries) -> Result<Vec<RawPoint>, CoreError> {
    data.time_series
        .unwrap_or_default()
        .into_iter()
        .map(|point| {
            let ts = point
                .timestamp
                .ok_or_else(|| CoreError::transform(source_name, "series point without timestamp"))?;
            Ok((
                parse_timestamp(source_name, &ts)?,
                sats_to_btc(point.value.unwrap_or_default()),
                coverage_or_default(point.coverage),
            ))
        })
        .collect()
}

fn mempool_series(source_name: &str, data: &[MempoolStatPoint]) -> Result<Vec<RawPoint>, CoreError> {
    data.iter()
        .map(|point| {
            let at = point
                .added
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| CoreError::transform(source_name, "statistics entry without valid `added`"))?;
            Ok((
                at,
                sats_to_btc(point.total_fee.unwrap_or_default()),
                MEMPOOL_COVERAGE_PCT,
            ))
        })
        .collect()
}

// ── Addresses ────────────────────────────────────────────────────────

/// Holders without an address or principal cannot be identified and are dropped.
pub fn addresses(data: IcpHolders, now: DateTime<Utc>) -> Vec<AddressCluster> {
    let today = now.format("%Y-%m-%d").to_string();
    data.holders
        .unwrap_or_default()
        .into_iter()
        .filter_map(|holder| address_cluster(holder, &today))
        .collect()
}

fn address_cluster(holder: IcpHolder, today: &str) -> Option<AddressCluster> {
    let address = holder
        .principal
        .filter(|p| !p.is_empty())
        .or(holder.address.filter(|a| !a.is_empty()))?;

    let proofs = match holder.proofs {
        Some(proofs) if !proofs.is_empty() => proofs.into_iter().map(proof_link).collect(),
        _ => vec![ProofLink::new("ckbtc", CKBTC_EXPLORER_URL)],
    };

    Some(AddressCluster {
        label: non_empty_or(holder.label, "Unknown"),
        chain: non_empty_or(holder.chain, "ICP"),
        address,
        last_active: non_empty_or(holder.last_transaction, today),
        in_sum_btc: sats_to_btc(holder.received.unwrap_or_default()),
        out_sum_btc: sats_to_btc(holder.sent.unwrap_or_default()),
        note: LocalizedNote::new(
            non_empty_or(holder.note_zh, "未知地址"),
            non_empty_or(holder.note_en, "Unknown address"),
        ),
        proofs,
    })
}

// ── Transactions ─────────────────────────────────────────────────────

/// Convert a transaction list, newest first.
pub fn transactions(
    source_name: &str,
    data: WireTransactions,
    language: Language,
) -> Result<Vec<TransactionRow>, CoreError> {
    let mut rows = data
        .transactions
        .unwrap_or_default()
        .into_iter()
        .map(|tx| transaction(source_name, tx, language))
        .collect::<Result<Vec<_>, _>>()?;
    sort_newest_first(&mut rows);
    Ok(rows)
}

fn transaction(
    source_name: &str,
    tx: WireTransaction,
    language: Language,
) -> Result<TransactionRow, CoreError> {
    let tx_hash = tx
        .tx_hash
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CoreError::transform(source_name, "transaction without tx_hash"))?;
    let timestamp = tx
        .timestamp
        .as_ref()
        .ok_or_else(|| CoreError::transform(source_name, format!("transaction {tx_hash} without timestamp")))
        .and_then(|ts| parse_timestamp(source_name, ts))?;
    let direction: Direction = tx
        .direction
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| CoreError::transform(source_name, format!("transaction {tx_hash}: bad direction")))?;
    let status: TxStatus = match tx.status.as_deref() {
        None => TxStatus::Pending,
        Some(s) => s
            .parse()
            .map_err(|_| CoreError::transform(source_name, format!("transaction {tx_hash}: bad status {s:?}")))?,
    };

    let amount_btc = sats_to_btc(tx.amount.unwrap_or_default());
    let note = tx.note.filter(|n| !n.is_empty()).unwrap_or_else(|| {
        let pair = match direction {
            Direction::Deposit => LocalizedNote::new("用户存入BTC", "User deposited BTC"),
            Direction::Withdrawal => LocalizedNote::new("用户提取BTC", "User withdrew BTC"),
        };
        pair.pick(language).to_owned()
    });
    let proofs = match tx.proofs {
        Some(proofs) if !proofs.is_empty() => proofs.into_iter().map(proof_link).collect(),
        _ => vec![ProofLink::new("btc", BTC_BROWSER_URL)],
    };

    Ok(TransactionRow {
        tx_hash,
        timestamp,
        direction,
        user_id: tx.user_id.unwrap_or_default(),
        amount_btc,
        amount_usd: tx.amount_usd.unwrap_or(amount_btc * BTC_PRICE_USD),
        from_address: tx.from_address.unwrap_or_default(),
        to_address: tx.to_address.unwrap_or_default(),
        status,
        confirmations: if status == TxStatus::Confirmed {
            tx.confirmations.unwrap_or_default()
        } else {
            0
        },
        fee_btc: sats_to_btc(tx.fee.unwrap_or_default()),
        note,
        proofs,
    })
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Coverage as reported, or the default when absent or zero.
fn coverage_or_default(coverage: Option<f64>) -> f64 {
    coverage
        .filter(|c| *c > 0.0)
        .unwrap_or(DEFAULT_COVERAGE_PCT)
        .clamp(0.0, 100.0)
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_owned())
}

fn proof_link(proof: WireProof) -> ProofLink {
    ProofLink::new(proof.kind, proof.url)
}

/// Epoch milliseconds, RFC 3339, or a bare `YYYY-MM-DD` date.
fn parse_timestamp(source_name: &str, ts: &WireTimestamp) -> Result<DateTime<Utc>, CoreError> {
    let parsed = match ts {
        WireTimestamp::Millis(ms) => DateTime::from_timestamp_millis(*ms),
        WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|naive| naive.and_utc())
            }),
    };
    parsed.ok_or_else(|| CoreError::transform(source_name, format!("unparseable timestamp {ts:?}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{TimeDelta, TimeZone};
    use odinsight_api::models::IcpSeriesPoint;
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn icp_summary_converts_satoshis() {
        let payload = SummaryPayload::Icp(IcpSummary {
            total_supply: Some(150_000_000_000.0),
            total_supply_usd: Some(92_250_000.0),
            net_flow_24h: Some(250_000_000.0),
            net_flow_7d: Some(-1_000_000_000.0),
            coverage_percentage: Some(91.5),
            last_updated: Some(WireTimestamp::Millis(1_714_521_600_000)),
        });
        let s = summary("icp", payload, now()).unwrap();
        assert!((s.total_btc - 1500.0).abs() < 1e-9);
        assert!((s.netflow_24h_btc - 2.5).abs() < 1e-9);
        assert!((s.netflow_7d_btc + 10.0).abs() < 1e-9);
        assert!((s.unknown_pct - 8.5).abs() < 1e-9);
        assert_eq!(s.updated_at, "05/01 00:00");
    }

    #[test]
    fn icp_summary_defaults() {
        let s = summary("icp", SummaryPayload::Icp(IcpSummary::default()), now()).unwrap();
        assert!(s.total_btc.abs() < f64::EPSILON);
        assert!((s.coverage_pct - 85.0).abs() < f64::EPSILON);
        assert!((s.unknown_pct - 15.0).abs() < f64::EPSILON);
        assert_eq!(s.updated_at, "05/01 12:00");
    }

    #[test]
    fn icp_summary_rejects_garbage_timestamp() {
        let payload = SummaryPayload::Icp(IcpSummary {
            last_updated: Some(WireTimestamp::Text("yesterday-ish".into())),
            ..IcpSummary::default()
        });
        assert!(matches!(
            summary("icp", payload, now()),
            Err(CoreError::Transform { .. })
        ));
    }

    #[test]
    fn mempool_summary_uses_fixed_price() {
        let payload = SummaryPayload::Mempool(MempoolStatistics {
            total_bitcoins: Some(2.0),
            mempool_size: Some(300_000_000.0),
        });
        let s = summary("mempool", payload, now()).unwrap();
        assert!((s.total_usd - 123_000.0).abs() < 1e-9);
        assert!((s.netflow_24h_btc - 3.0).abs() < 1e-9);
        assert!((s.netflow_7d_btc - 21.0).abs() < 1e-9);
        assert!((s.coverage_pct - MEMPOOL_COVERAGE_PCT).abs() < f64::EPSILON);
    }

    fn icp_points(n: i64) -> SeriesPayload {
        let start = now() - TimeDelta::days(n);
        SeriesPayload::Icp(IcpSeries {
            time_series: Some(
                (0..n)
                    .map(|i| IcpSeriesPoint {
                        timestamp: Some(WireTimestamp::Text(
                            (start + TimeDelta::days(i + 1)).to_rfc3339(),
                        )),
                        value: Some(100_000_000.0),
                        coverage: None,
                    })
                    .collect(),
            ),
        })
    }

    #[test]
    fn longer_series_keeps_newest_points() {
        let s = series("icp", icp_points(10), SeriesKind::Netflow, ChartRange::Week).unwrap();
        assert_eq!(s.len(), 7);
        assert_eq!(s.points[0].ts, "2024-04-25");
        assert_eq!(s.latest().unwrap().ts, "2024-05-01");
        assert!((s.points[0].value - 1.0).abs() < f64::EPSILON);
        assert!((s.points[0].coverage_pct - 85.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shorter_series_is_a_transform_failure() {
        let err = series("icp", icp_points(3), SeriesKind::Total, ChartRange::Week).unwrap_err();
        assert!(matches!(err, CoreError::Transform { .. }));
    }

    #[test]
    fn empty_series_passes_through_empty() {
        let s = series(
            "icp",
            SeriesPayload::Icp(IcpSeries::default()),
            SeriesKind::Total,
            ChartRange::Week,
        )
        .unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn mempool_series_is_sorted_and_relabelled() {
        let base = now().timestamp();
        let data = (0..12)
            .rev()
            .map(|i| MempoolStatPoint {
                added: Some(base - i * 300),
                total_fee: Some(50_000_000.0),
            })
            .rev()
            .collect();
        let s = series("mempool", SeriesPayload::Mempool(data), SeriesKind::Netflow, ChartRange::Hour)
            .unwrap();
        assert_eq!(s.len(), 12);
        assert_eq!(s.points[0].ts, "11:05");
        assert_eq!(s.latest().unwrap().ts, "12:00");
        assert!((s.points[0].value - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn holders_take_defaults() {
        let holders = IcpHolders {
            holders: Some(vec![
                IcpHolder {
                    principal: Some("abcde-cai".into()),
                    received: Some(500_000_000.0),
                    ..IcpHolder::default()
                },
                IcpHolder::default(),
            ]),
        };
        let rows = addresses(holders, now());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.label, "Unknown");
        assert_eq!(row.chain, "ICP");
        assert_eq!(row.last_active, "2024-05-01");
        assert!((row.in_sum_btc - 5.0).abs() < f64::EPSILON);
        assert_eq!(row.note, LocalizedNote::new("未知地址", "Unknown address"));
        assert_eq!(row.proofs, vec![ProofLink::new("ckbtc", CKBTC_EXPLORER_URL)]);
    }

    #[test]
    fn transactions_validate_and_sort() {
        let tx = |hash: &str, ms: i64, status: &str| WireTransaction {
            tx_hash: Some(hash.into()),
            timestamp: Some(WireTimestamp::Millis(ms)),
            direction: Some("deposit".into()),
            amount: Some(200_000_000.0),
            status: Some(status.into()),
            confirmations: Some(3),
            ..WireTransaction::default()
        };
        let data = WireTransactions {
            transactions: Some(vec![
                tx("0xold", 1_700_000_000_000, "pending"),
                tx("0xnew", 1_710_000_000_000, "confirmed"),
            ]),
        };
        let rows = transactions("custom", data, Language::En).unwrap();
        assert_eq!(rows[0].tx_hash, "0xnew");
        assert_eq!(rows[0].confirmations, 3);
        assert_eq!(rows[1].confirmations, 0);
        assert!((rows[0].amount_usd - 123_000.0).abs() < 1e-9);
        assert_eq!(rows[0].note, "User deposited BTC");

        let bad = WireTransactions {
            transactions: Some(vec![WireTransaction {
                direction: Some("sideways".into()),
                ..tx("0xbad", 1_700_000_000_000, "pending")
            }]),
        };
        assert!(transactions("custom", bad, Language::En).is_err());
    }
}
