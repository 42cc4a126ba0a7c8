//! Refresh command handler: every panel at once.

use odinsight_core::{ChartRange, Dashboard, DataOrigin, Language};

use crate::error::CliError;
use crate::output::{Printer, render_detail};

pub async fn handle(
    dashboard: &Dashboard,
    range: ChartRange,
    language: Language,
    printer: Printer,
) -> Result<(), CliError> {
    dashboard.refresh_all(range, language).await;
    let snapshot = dashboard.snapshot();

    let out = printer.render_single(
        &snapshot,
        |snap| {
            let origins = &snap.origins;
            let panel = |origin: &DataOrigin, what: String| {
                format!("{what}  [{}]", printer.origin(origin))
            };
            let mut pairs = vec![
                ("Status", printer.status(snap.api_status)),
                (
                    "Summary",
                    panel(
                        &origins.summary,
                        format!("{:.4} BTC, {:.1}% coverage", snap.summary.total_btc, snap.summary.coverage_pct),
                    ),
                ),
                (
                    "Net flow",
                    panel(&origins.series_net, format!("{} points ({range})", snap.series_net.len())),
                ),
                (
                    "Total reserve",
                    panel(&origins.series_total, format!("{} points ({range})", snap.series_total.len())),
                ),
                (
                    "Addresses",
                    panel(&origins.addresses, format!("{} clusters", snap.addresses.len())),
                ),
                (
                    "Transactions",
                    panel(&origins.transactions, format!("{} rows", snap.transactions.len())),
                ),
            ];
            if snap.reconnect_countdown > 0 {
                pairs.push(("Reconnect in", format!("{}s", snap.reconnect_countdown)));
            }
            if let Some(error) = &snap.error {
                pairs.push(("Error", error.clone()));
            }
            render_detail(&pairs)
        },
        |snap| snap.api_status.to_string(),
    )?;
    printer.print(&out);
    Ok(())
}
