//! Summary command handler.

use odinsight_core::{Dashboard, DataOrigin, Summary};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{Printer, render_detail};

#[derive(Serialize)]
struct SummaryReport<'a> {
    #[serde(flatten)]
    summary: &'a Summary,
    origin: &'a DataOrigin,
}

pub async fn handle(dashboard: &Dashboard, printer: Printer) -> Result<(), CliError> {
    let origin = dashboard.fetch_summary().await;
    let summary = dashboard.summary();
    let report = SummaryReport {
        summary: &summary,
        origin: &origin,
    };

    let out = printer.render_single(
        &report,
        |r| detail(r, printer),
        |r| format!("{:.8}", r.summary.total_btc),
    )?;
    printer.print(&out);
    Ok(())
}

fn detail(report: &SummaryReport<'_>, printer: Printer) -> String {
    let s = report.summary;
    render_detail(&[
        ("Total reserve", format!("{:.4} BTC", s.total_btc)),
        ("Total value", format!("${:.2}", s.total_usd)),
        ("Net flow 24h", printer.flow(s.netflow_24h_btc)),
        ("Net flow 7d", printer.flow(s.netflow_7d_btc)),
        (
            "Coverage",
            format!("{:.1}% identified, {:.1}% unknown", s.coverage_pct, s.unknown_pct),
        ),
        ("Updated", s.updated_at.clone()),
        ("Source", printer.origin(report.origin)),
        ("ckBTC explorer", s.proof.ckbtc_explorer.clone()),
        ("BTC explorer", s.proof.btc_browser.clone()),
    ])
}
