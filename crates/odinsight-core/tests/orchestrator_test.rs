#![allow(clippy::unwrap_used)]
// Priority walk tests for `FetchOrchestrator` against mock sources.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use odinsight_api::{Endpoints, SourceClient, SourceDescriptor, SourceKind, TransportConfig};
use odinsight_core::{
    ChartRange, FetchOrchestrator, FetchOutcome, FixedClock, Language, SeriesKind,
    SourceRegistry,
};

// ── Helpers ─────────────────────────────────────────────────────────

const SUMMARY: &str = "/summary";
const SERIES: &str = "/series";
const HOLDERS: &str = "/holders";
const TXS: &str = "/transactions";

fn client() -> SourceClient {
    let transport = TransportConfig::default()
        .with_timeout(Duration::from_secs(2))
        .with_probe_timeout(Duration::from_millis(300));
    SourceClient::new(&transport).unwrap()
}

fn icp(name: &str, server: &MockServer) -> SourceDescriptor {
    SourceDescriptor::new(
        name,
        SourceKind::IcpDashboard,
        Url::parse(&server.uri()).unwrap(),
        Endpoints {
            summary: SUMMARY.into(),
            series: SERIES.into(),
            addresses: Some(HOLDERS.into()),
            transactions: Some(TXS.into()),
        },
    )
}

fn orchestrator(sources: Vec<SourceDescriptor>) -> FetchOrchestrator {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    FetchOrchestrator::new(
        client(),
        Arc::new(SourceRegistry::new(sources)),
        Arc::new(clock),
    )
}

fn summary_body(total_sats: f64) -> serde_json::Value {
    json!({
        "total_supply": total_sats,
        "total_supply_usd": 61_500.0,
        "net_flow_24h": 100_000_000.0,
        "net_flow_7d": -50_000_000.0,
        "coverage_percentage": 90.0,
        "last_updated": "2024-05-01T10:30:00Z",
    })
}

async fn mount_summary(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SUMMARY))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

// ── Priority walk ───────────────────────────────────────────────────

#[tokio::test]
async fn test_second_source_answers_and_third_is_never_contacted() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    let c = MockServer::start().await;

    mount_summary(&a, 503, json!({})).await;
    mount_summary(&b, 200, summary_body(200_000_000.0)).await;
    Mock::given(method("GET"))
        .and(path(SUMMARY))
        .respond_with(ResponseTemplate::new(200).set_body_json(summary_body(1.0)))
        .expect(0)
        .mount(&c)
        .await;

    let orch = orchestrator(vec![icp("A", &a), icp("B", &b), icp("C", &c)]);
    let outcome = orch.fetch_summary().await;

    assert_eq!(outcome.source(), Some("B"));
    let summary = outcome.into_option().unwrap();
    assert!((summary.total_btc - 2.0).abs() < 1e-9);
    assert!((summary.netflow_7d_btc + 0.5).abs() < 1e-9);
    assert_eq!(summary.updated_at, "05/01 10:30");
    assert!((summary.coverage_pct + summary.unknown_pct - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_transform_failure_falls_through_to_next_source() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;

    // Decodes, but the timestamp is meaningless.
    mount_summary(&a, 200, json!({ "last_updated": "yesterday-ish" })).await;
    mount_summary(&b, 200, summary_body(100_000_000.0)).await;

    let orch = orchestrator(vec![icp("A", &a), icp("B", &b)]);
    let outcome = orch.fetch_summary().await;

    assert_eq!(outcome.source(), Some("B"));
}

#[tokio::test]
async fn test_all_sources_failing_is_exhausted() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    mount_summary(&a, 500, json!({})).await;
    mount_summary(&b, 404, json!({})).await;

    let orch = orchestrator(vec![icp("A", &a), icp("B", &b)]);
    assert_eq!(orch.fetch_summary().await, FetchOutcome::Exhausted);
}

#[tokio::test]
async fn test_empty_registry_is_exhausted() {
    let orch = orchestrator(Vec::new());
    assert_eq!(orch.fetch_summary().await, FetchOutcome::Exhausted);
    assert!(!orch.fetch_addresses().await.is_live());
}

#[tokio::test]
async fn test_undeclared_query_is_unsupported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut source = icp("A", &server);
    source.endpoints.addresses = None;
    source.endpoints.transactions = None;

    let orch = orchestrator(vec![source]);
    assert_eq!(orch.fetch_addresses().await, FetchOutcome::Unsupported);
    assert_eq!(
        orch.fetch_transactions(10, Language::En).await,
        FetchOutcome::Unsupported
    );
}

// ── Series ──────────────────────────────────────────────────────────

fn daily_points(n: i64) -> serde_json::Value {
    let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    let points: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "timestamp": (start + chrono::TimeDelta::days(i)).timestamp_millis(),
                "value": i,
                "coverage": 88.0,
            })
        })
        .collect();
    json!({ "time_series": points })
}

#[tokio::test]
async fn test_series_sends_range_and_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SERIES))
        .and(query_param("range", "7d"))
        .and(query_param("type", "total"))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_points(10)))
        .expect(1)
        .mount(&server)
        .await;

    let orch = orchestrator(vec![icp("A", &server)]);
    let series = orch
        .fetch_series(SeriesKind::Total, ChartRange::Week)
        .await
        .into_option()
        .unwrap();

    assert_eq!(series.len(), 7);
    assert_eq!(series.kind, SeriesKind::Total);
    // Newest seven of ten daily points.
    assert_eq!(series.points[0].ts, "2024-04-04");
    assert_eq!(series.latest().unwrap().ts, "2024-04-10");
    assert!(series.points.iter().all(|p| (p.coverage_pct - 88.0).abs() < 1e-9));
}

#[tokio::test]
async fn test_short_or_empty_series_moves_on() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    let c = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SERIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "time_series": [] })))
        .mount(&a)
        .await;
    Mock::given(method("GET"))
        .and(path(SERIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_points(3)))
        .mount(&b)
        .await;
    Mock::given(method("GET"))
        .and(path(SERIES))
        .respond_with(ResponseTemplate::new(200).set_body_json(daily_points(7)))
        .mount(&c)
        .await;

    let orch = orchestrator(vec![icp("A", &a), icp("B", &b), icp("C", &c)]);
    let outcome = orch.fetch_series(SeriesKind::Netflow, ChartRange::Week).await;

    assert_eq!(outcome.source(), Some("C"));
    assert_eq!(outcome.into_option().unwrap().len(), 7);
}

// ── Addresses & transactions ────────────────────────────────────────

#[tokio::test]
async fn test_addresses_drop_holders_without_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(HOLDERS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "holders": [
                { "label": "Treasury", "principal": "abcde-cai", "received": 300_000_000.0, "sent": 100_000_000.0 },
                { "label": "Ghost" },
            ]
        })))
        .mount(&server)
        .await;

    let orch = orchestrator(vec![icp("A", &server)]);
    let clusters = orch.fetch_addresses().await.into_option().unwrap();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].label, "Treasury");
    assert_eq!(clusters[0].address, "abcde-cai");
    assert!((clusters[0].in_sum_btc - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_transactions_are_truncated_and_sorted() {
    let server = MockServer::start().await;
    let txs: Vec<_> = (0..5)
        .map(|i| {
            json!({
                "tx_hash": format!("0x{i:064x}"),
                "timestamp": 1_714_000_000_000_i64 + i * 60_000,
                "direction": if i % 2 == 0 { "deposit" } else { "withdrawal" },
                "amount": 0.5,
                "status": "confirmed",
                "confirmations": 3,
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(TXS))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transactions": txs })))
        .mount(&server)
        .await;

    let orch = orchestrator(vec![icp("A", &server)]);
    let rows = orch
        .fetch_transactions(3, Language::En)
        .await
        .into_option()
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    assert_eq!(rows[0].tx_hash, format!("0x{:064x}", 4));
}

// ── Health probe ────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_working_source_returns_first_reachable() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    mount_summary(&a, 500, json!({})).await;
    mount_summary(&b, 200, summary_body(1.0)).await;

    let orch = orchestrator(vec![icp("A", &a), icp("B", &b)]);
    assert_eq!(orch.find_working_source().await.as_deref(), Some("B"));

    let orch = orchestrator(vec![icp("A", &a)]);
    assert_eq!(orch.find_working_source().await, None);
}
