// ── Synthetic data generator ──
//
// Placeholder values served whenever no live source answers. Every output
// is a pure function of the injected clock: the same instant yields the
// same summary, series and transactions.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::clock::Clock;
use crate::model::{
    AddressCluster, AddressRow, BTC_BROWSER_URL, BTC_PRICE_USD, CKBTC_EXPLORER_URL, ChartRange,
    Direction, Language, LocalizedNote, ProofLink, Series, SeriesKind, SeriesPoint, Summary,
    TransactionRow, TxStatus, sort_newest_first,
};

/// Transactions generated when the caller does not ask for a count.
pub const DEFAULT_TRANSACTION_COUNT: usize = 100;

const DEMO_TOTAL_BTC: f64 = 1247.8932;
const DEMO_NETFLOW_24H: f64 = 8.7654;
const DEMO_NETFLOW_7D: f64 = -23.4567;
const DEMO_COVERAGE: f64 = 82.0;

const HOT_WALLET: &str = "platform_hot_wallet";
const USER_IDS: [&str; 8] = [
    "user_001", "user_002", "user_003", "user_004", "user_005", "user_006", "user_007", "user_008",
];
const STATUS_WEIGHTS: [TxStatus; 6] = [
    TxStatus::Confirmed,
    TxStatus::Confirmed,
    TxStatus::Confirmed,
    TxStatus::Confirmed,
    TxStatus::Pending,
    TxStatus::Failed,
];

/// Produces placeholder domain values.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    clock: Arc<dyn Clock>,
}

impl SyntheticGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // ── Summary ──────────────────────────────────────────────────────

    /// Demo reserve with a slow sinusoidal drift.
    pub fn summary(&self) -> Summary {
        let now = self.clock.now();
        let t = millis_f64(&now);
        let drift = (t / 100_000.0).sin() * 0.1;
        let total_btc = DEMO_TOTAL_BTC + drift * 10.0;

        Summary::new(
            total_btc,
            total_btc * BTC_PRICE_USD,
            DEMO_NETFLOW_24H + (t / 50_000.0).sin() * 5.0,
            DEMO_NETFLOW_7D + (t / 80_000.0).cos() * 8.0,
            DEMO_COVERAGE,
            now.format(Summary::UPDATED_AT_FORMAT).to_string(),
        )
    }

    /// The static demo summary, stamped with the current time.
    pub fn demo_summary(&self) -> Summary {
        Summary::demo(self.clock.now().format(Summary::UPDATED_AT_FORMAT).to_string())
    }

    // ── Series ───────────────────────────────────────────────────────

    /// Exactly `range.points()` points ending at "now", oldest first.
    pub fn series(&self, kind: SeriesKind, range: ChartRange) -> Series {
        let now = self.clock.now();
        let salt = match kind {
            SeriesKind::Netflow => 0x6e65_7466,
            SeriesKind::Total => 0x746f_7461,
        };
        let mut rng = self.rng(salt ^ u64::try_from(range.points()).unwrap_or_default());
        let format = range.label_format();
        let interval = range.interval();
        let t = millis_f64(&now);

        let points = (0..range.points())
            .rev()
            .map(|i| {
                let step = f64::from(u32::try_from(i).unwrap_or(u32::MAX));
                let at = now - interval * i32::try_from(i).unwrap_or(i32::MAX);
                let (base, noise_span) = match kind {
                    SeriesKind::Netflow => ((step / 3.0).sin() * 8.0 - 1.0, 2.0),
                    SeriesKind::Total => (
                        1200.0 + (step / 3.0).sin() * 80.0 + 250.0 + (t / 100_000.0).sin() * 5.0,
                        1.0,
                    ),
                };
                let noise = (rng.r#gen::<f64>() - 0.5) * noise_span;
                SeriesPoint {
                    ts: format.render(&at),
                    value: round_to(base + noise, 4),
                    coverage_pct: DEMO_COVERAGE - f64::from(rng.gen_range(0..4_u8)),
                }
            })
            .collect();

        Series {
            kind,
            range,
            points,
        }
    }

    // ── Addresses ────────────────────────────────────────────────────

    /// The three demo clusters, before localization.
    pub fn address_clusters(&self) -> Vec<AddressCluster> {
        let today = self.clock.now();
        let yesterday = today - TimeDelta::days(1);
        let date = |at: DateTime<Utc>| at.format("%Y-%m-%d").to_string();

        vec![
            AddressCluster {
                label: "Treasury".into(),
                chain: "BTC".into(),
                address: "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".into(),
                last_active: date(today),
                in_sum_btc: 856.7234,
                out_sum_btc: 123.4567,
                note: LocalizedNote::new("官方多签（示例）", "Official multisig (demo)"),
                proofs: vec![ProofLink::new("tx", BTC_BROWSER_URL)],
            },
            AddressCluster {
                label: "Pool".into(),
                chain: "ICP".into(),
                address: "principal-abcde-odin-pool-01".into(),
                last_active: date(today),
                in_sum_btc: 234.5678,
                out_sum_btc: 89.1234,
                note: LocalizedNote::new("合约池（示例）", "Contract pool (demo)"),
                proofs: vec![ProofLink::new("ckbtc", CKBTC_EXPLORER_URL)],
            },
            AddressCluster {
                label: "External".into(),
                chain: "BTC".into(),
                address: "bc1qexampleexternaladdr0000000009xk".into(),
                last_active: date(yesterday),
                in_sum_btc: 156.7890,
                out_sum_btc: 67.8901,
                note: LocalizedNote::new("外部地址（示例）", "External address (demo)"),
                proofs: vec![ProofLink::new("tx", BTC_BROWSER_URL)],
            },
        ]
    }

    pub fn addresses(&self, language: Language) -> Vec<AddressRow> {
        self.address_clusters()
            .into_iter()
            .map(|cluster| cluster.localize(language))
            .collect()
    }

    // ── Transactions ─────────────────────────────────────────────────

    /// `count` random deposits and withdrawals from the last 30 days,
    /// newest first.
    pub fn transactions(&self, count: usize, language: Language) -> Vec<TransactionRow> {
        let now = self.clock.now();
        let mut rng = self.rng(0x7478_6e73);
        let window_ms = TimeDelta::days(30).num_milliseconds();

        let mut rows: Vec<TransactionRow> = (0..count)
            .map(|_| {
                let direction = if rng.gen_bool(0.6) {
                    Direction::Deposit
                } else {
                    Direction::Withdrawal
                };
                let amount_btc = round_to(rng.r#gen::<f64>() * 5.0 + 0.001, 8);
                let status = *STATUS_WEIGHTS
                    .choose(&mut rng)
                    .unwrap_or(&TxStatus::Confirmed);
                let age = TimeDelta::milliseconds(rng.gen_range(0..window_ms));
                let external = format!("bc1q{}", random_chars(&mut rng, BECH32_ALPHABET, 39));
                let (from_address, to_address) = match direction {
                    Direction::Deposit => (external, HOT_WALLET.to_owned()),
                    Direction::Withdrawal => (HOT_WALLET.to_owned(), external),
                };
                let note = transaction_note(direction).pick(language).to_owned();

                TransactionRow {
                    tx_hash: format!("0x{}", random_chars(&mut rng, HEX_ALPHABET, 64)),
                    timestamp: now - age,
                    direction,
                    user_id: (*USER_IDS.choose(&mut rng).unwrap_or(&USER_IDS[0])).to_owned(),
                    amount_btc,
                    amount_usd: round_to(amount_btc * BTC_PRICE_USD, 2),
                    from_address,
                    to_address,
                    status,
                    confirmations: if status == TxStatus::Confirmed {
                        rng.gen_range(1..=6)
                    } else {
                        0
                    },
                    fee_btc: round_to(rng.r#gen::<f64>() * 0.001 + 0.000_01, 8),
                    note,
                    proofs: vec![
                        ProofLink::new("btc", BTC_BROWSER_URL),
                        ProofLink::new("platform", "#transaction-details"),
                    ],
                }
            })
            .collect();

        sort_newest_first(&mut rows);
        rows
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// A generator seeded from the clock and a per-domain salt.
    fn rng(&self, salt: u64) -> StdRng {
        let millis = self.clock.now().timestamp_millis().unsigned_abs();
        StdRng::seed_from_u64(millis ^ salt)
    }
}

const HEX_ALPHABET: &[u8] = b"0123456789abcdef";
const BECH32_ALPHABET: &[u8] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

fn random_chars(rng: &mut StdRng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .filter_map(|_| alphabet.choose(rng).copied().map(char::from))
        .collect()
}

fn transaction_note(direction: Direction) -> LocalizedNote {
    match direction {
        Direction::Deposit => LocalizedNote::new("用户存入BTC", "User deposited BTC"),
        Direction::Withdrawal => LocalizedNote::new("用户提取BTC", "User withdrew BTC"),
    }
}

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn millis_f64(at: &DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::clock::FixedClock;

    fn generator() -> SyntheticGenerator {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        SyntheticGenerator::new(Arc::new(FixedClock::new(at)))
    }

    #[test]
    fn summary_keeps_coverage_invariant() {
        let s = generator().summary();
        assert!((s.coverage_pct - 82.0).abs() < f64::EPSILON);
        assert!((s.unknown_pct - 18.0).abs() < f64::EPSILON);
        assert!((s.total_btc - DEMO_TOTAL_BTC).abs() <= 1.0);
        assert!((s.total_usd - s.total_btc * BTC_PRICE_USD).abs() < 1e-6);
        assert_eq!(s.updated_at, "05/01 12:30");
    }

    #[test]
    fn series_length_and_labels_match_range() {
        let g = generator();
        for range in ChartRange::iter() {
            for kind in SeriesKind::iter() {
                let series = g.series(kind, range);
                assert_eq!(series.len(), range.points(), "{range} {kind}");
                let format = range.label_format();
                assert!(series.points.iter().all(|p| format.matches(&p.ts)));
            }
        }
    }

    #[test]
    fn series_ends_at_now() {
        let series = generator().series(SeriesKind::Netflow, ChartRange::Month);
        assert_eq!(series.points.first().unwrap().ts, "2024-04-02");
        assert_eq!(series.latest().unwrap().ts, "2024-05-01");

        let hourly = generator().series(SeriesKind::Total, ChartRange::Hour);
        assert_eq!(hourly.points.first().unwrap().ts, "11:35");
        assert_eq!(hourly.latest().unwrap().ts, "12:30");
    }

    #[test]
    fn series_values_stay_in_band() {
        let g = generator();
        let net = g.series(SeriesKind::Netflow, ChartRange::Year);
        assert!(net.points.iter().all(|p| (-10.0..=8.0).contains(&p.value)));
        assert!(net.points.iter().all(|p| (79.0..=82.0).contains(&p.coverage_pct)));

        let total = g.series(SeriesKind::Total, ChartRange::Year);
        assert!(total.points.iter().all(|p| (1360.0..=1540.0).contains(&p.value)));
    }

    #[test]
    fn same_instant_same_output() {
        let a = generator().transactions(20, Language::En);
        let b = generator().transactions(20, Language::En);
        assert_eq!(a, b);
    }

    #[test]
    fn addresses_are_localized() {
        let zh = generator().addresses(Language::Zh);
        let en = generator().addresses(Language::En);
        assert_eq!(zh.len(), 3);
        assert_eq!(zh[0].note, "官方多签（示例）");
        assert_eq!(en[0].note, "Official multisig (demo)");
        assert_eq!(en[2].last_active, "2024-04-30");
    }

    #[test]
    fn transactions_are_newest_first_and_well_formed() {
        let g = generator();
        let now = g.now();
        let rows = g.transactions(DEFAULT_TRANSACTION_COUNT, Language::Zh);
        assert_eq!(rows.len(), DEFAULT_TRANSACTION_COUNT);
        assert!(rows.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));

        for row in &rows {
            assert!(row.timestamp <= now && row.timestamp > now - TimeDelta::days(30));
            assert!(row.amount_btc >= 0.001 && row.amount_btc <= 5.001);
            assert_eq!(row.tx_hash.len(), 66);
            match row.status {
                TxStatus::Confirmed => assert!((1..=6).contains(&row.confirmations)),
                _ => assert_eq!(row.confirmations, 0),
            }
            match row.direction {
                Direction::Deposit => {
                    assert_eq!(row.to_address, HOT_WALLET);
                    assert_eq!(row.note, "用户存入BTC");
                }
                Direction::Withdrawal => {
                    assert_eq!(row.from_address, HOT_WALLET);
                    assert_eq!(row.note, "用户提取BTC");
                }
            }
        }
    }
}
