//! Status command handler.
//!
//! Exits with the connection error code when nothing is reachable, so the
//! command doubles as a scriptable health check.

use odinsight_core::{ApiStatus, Dashboard};
use serde::Serialize;

use crate::error::CliError;
use crate::output::{Printer, render_detail};

#[derive(Serialize)]
struct StatusReport {
    status: ApiStatus,
    source: Option<String>,
    sources_configured: usize,
    reconnect_countdown: u32,
}

pub async fn handle(dashboard: &Dashboard, printer: Printer) -> Result<(), CliError> {
    let status = dashboard.check_health().await;
    let report = StatusReport {
        status,
        source: dashboard.monitor().reachable_source(),
        sources_configured: dashboard.registry().len(),
        reconnect_countdown: dashboard.reconnect_countdown(),
    };

    let out = printer.render_single(
        &report,
        |r| {
            render_detail(&[
                ("Status", printer.status(r.status)),
                ("Source", r.source.clone().unwrap_or_else(|| "-".into())),
                ("Configured", r.sources_configured.to_string()),
            ])
        },
        |r| r.status.to_string(),
    )?;
    printer.print(&out);

    match status {
        ApiStatus::Offline => Err(CliError::Offline {
            countdown: report.reconnect_countdown,
        }),
        ApiStatus::Online | ApiStatus::Checking => Ok(()),
    }
}
