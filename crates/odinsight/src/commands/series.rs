//! Series command handler.

use odinsight_core::{Dashboard, DataOrigin, Series, SeriesKind};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{SeriesArgs, SeriesSelect};
use crate::error::CliError;
use crate::output::Printer;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PointRow {
    #[tabled(rename = "Series")]
    kind: String,
    #[tabled(rename = "Time")]
    ts: String,
    #[tabled(rename = "Value (BTC)")]
    value: String,
    #[tabled(rename = "Coverage")]
    coverage: String,
}

/// One point flattened with its series, for list rendering.
#[derive(Serialize)]
struct FlatPoint<'a> {
    kind: SeriesKind,
    ts: &'a str,
    value: f64,
    coverage_pct: f64,
    #[serde(skip)]
    origin: &'a DataOrigin,
}

impl From<&FlatPoint<'_>> for PointRow {
    fn from(p: &FlatPoint<'_>) -> Self {
        Self {
            kind: format!("{} ({})", p.kind, p.origin),
            ts: p.ts.to_owned(),
            value: format!("{:.4}", p.value),
            coverage: format!("{:.0}%", p.coverage_pct),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: &SeriesArgs,
    printer: Printer,
) -> Result<(), CliError> {
    let range = args.range.unwrap_or(dashboard.config().default_range);
    let (net_origin, total_origin) = dashboard.fetch_series(range).await;
    let net = dashboard.series_net();
    let total = dashboard.series_total();

    let selected: Vec<(&Series, &DataOrigin)> = match args.kind {
        SeriesSelect::Net => vec![(&*net, &net_origin)],
        SeriesSelect::Total => vec![(&*total, &total_origin)],
        SeriesSelect::Both => vec![(&*net, &net_origin), (&*total, &total_origin)],
    };

    let points: Vec<FlatPoint<'_>> = selected
        .iter()
        .flat_map(|&(series, origin)| {
            series.points.iter().map(move |p| FlatPoint {
                kind: series.kind,
                ts: &p.ts,
                value: p.value,
                coverage_pct: p.coverage_pct,
                origin,
            })
        })
        .collect();

    let out = printer.render_list(&points, |p| PointRow::from(p), |p| {
        format!("{}\t{}\t{:.4}", p.kind, p.ts, p.value)
    })?;
    printer.print(&out);
    Ok(())
}
