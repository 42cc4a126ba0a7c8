//! Watch command handler: run the connectivity state machine and the
//! periodic refresh, printing each change until Ctrl-C.

use odinsight_config::Config;
use odinsight_core::{ApiStatus, ChartRange, Dashboard, DataOrigin, Language, Summary};
use serde::Serialize;

use crate::cli::{OutputFormat, WatchArgs};
use crate::config;
use crate::error::CliError;
use crate::output::Printer;

/// Refresh interval when neither `--interval` nor the config sets one.
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent<'a> {
    Status { status: ApiStatus },
    Countdown { seconds: u32 },
    Summary {
        summary: &'a Summary,
        origin: &'a DataOrigin,
    },
}

impl WatchEvent<'_> {
    fn render(&self, printer: Printer) -> Result<String, CliError> {
        Ok(match printer.format {
            OutputFormat::Table | OutputFormat::Plain => match self {
                Self::Status { status } => format!("status: {}", printer.status(*status)),
                Self::Countdown { seconds } => format!("reconnecting in {seconds}s"),
                Self::Summary { summary, origin } => format!(
                    "[{}] {:.4} BTC  24h {}  7d {}  coverage {:.1}%  {}",
                    summary.updated_at,
                    summary.total_btc,
                    printer.flow(summary.netflow_24h_btc),
                    printer.flow(summary.netflow_7d_btc),
                    summary.coverage_pct,
                    printer.origin(origin),
                ),
            },
            // One JSON object per line.
            _ => serde_json::to_string(self)?,
        })
    }
}

/// Countdown values worth printing: the start, every ten seconds, the last three.
fn announce(seconds: u32, countdown_secs: u32) -> bool {
    seconds > 0 && (seconds == countdown_secs || seconds % 10 == 0 || seconds <= 3)
}

pub async fn handle(args: WatchArgs, cfg: &Config, printer: Printer) -> Result<(), CliError> {
    let mut dashboard_config = config::dashboard_config(cfg)?;
    if let Some(range) = args.range {
        dashboard_config.default_range = range;
    }
    if let Some(lang) = args.lang {
        dashboard_config.language = lang;
    }
    dashboard_config.refresh_interval_secs = match (args.interval, dashboard_config.refresh_interval_secs) {
        (Some(secs), _) => secs,
        (None, 0) => DEFAULT_WATCH_INTERVAL_SECS,
        (None, secs) => secs,
    };
    let range = dashboard_config.default_range;
    let language = dashboard_config.language;
    let countdown_secs = dashboard_config.connectivity.countdown_secs;

    let dashboard = Dashboard::new(dashboard_config)?;
    let events = stream_events(
        &dashboard,
        tokio::signal::ctrl_c(),
        range,
        language,
        countdown_secs,
        printer,
    );
    shutdown_after(&dashboard, events).await
}

/// Run `body`, then shut the dashboard down whatever it returned.
async fn shutdown_after<T>(
    dashboard: &Dashboard,
    body: impl Future<Output = Result<T, CliError>>,
) -> Result<T, CliError> {
    let result = body.await;
    dashboard.shutdown().await;
    result
}

/// Print status, countdown and summary changes until `stop` resolves.
async fn stream_events(
    dashboard: &Dashboard,
    stop: impl Future,
    range: ChartRange,
    language: Language,
    countdown_secs: u32,
    printer: Printer,
) -> Result<(), CliError> {
    let mut status = dashboard.subscribe_status();
    let mut countdown = dashboard.subscribe_countdown();
    let mut summary = dashboard.store().subscribe_summary();

    let initial = dashboard.start().await;
    printer.print(&WatchEvent::Status { status: initial }.render(printer)?);
    dashboard.refresh_all(range, language).await;

    tokio::pin!(stop);

    loop {
        let event = tokio::select! {
            _ = &mut stop => break,
            Some(s) = status.changed() => WatchEvent::Status { status: s }.render(printer)?,
            Some(c) = countdown.changed() => {
                if !announce(c, countdown_secs) {
                    continue;
                }
                WatchEvent::Countdown { seconds: c }.render(printer)?
            }
            Some(s) = summary.changed() => {
                let origin = dashboard.store().origins().summary;
                WatchEvent::Summary { summary: &s, origin: &origin }.render(printer)?
            }
        };
        printer.print(&event);
    }

    printer.note("shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use odinsight_core::{Dashboard, DashboardConfig};

    use super::{CliError, announce, shutdown_after};

    #[test]
    fn countdown_announcements() {
        let shown: Vec<u32> = (0..=30).rev().filter(|s| announce(*s, 30)).collect();
        assert_eq!(shown, [30, 20, 10, 3, 2, 1]);
    }

    #[tokio::test]
    async fn failed_body_still_stops_background_tasks() {
        let dashboard = Dashboard::new(DashboardConfig::default()).unwrap();
        dashboard.start().await;
        assert_eq!(dashboard.monitor().live_timers(), 1);

        let result: Result<(), CliError> = shutdown_after(&dashboard, async {
            Err(CliError::Validation {
                field: "output".into(),
                reason: "stdout closed".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(CliError::Validation { .. })));
        assert_eq!(dashboard.monitor().live_timers(), 0);
        assert!(dashboard.monitor().is_shut_down());
    }
}
