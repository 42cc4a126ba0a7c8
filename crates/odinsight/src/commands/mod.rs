//! Command dispatch: bridges CLI args -> dashboard operations -> output.

pub mod addresses;
pub mod config_cmd;
pub mod refresh;
pub mod series;
pub mod sources;
pub mod status;
pub mod summary;
pub mod transactions;
pub mod watch;

use odinsight_core::{Dashboard, DashboardConfig};

use crate::cli::Command;
use crate::error::CliError;
use crate::output::Printer;

/// Run a one-shot, dashboard-bound command.
pub async fn dispatch(
    cmd: Command,
    config: DashboardConfig,
    printer: Printer,
) -> Result<(), CliError> {
    Dashboard::oneshot(config, |dashboard| async move {
        Ok(run(cmd, &dashboard, printer).await)
    })
    .await?
}

async fn run(cmd: Command, dashboard: &Dashboard, printer: Printer) -> Result<(), CliError> {
    let language = dashboard.config().language;
    let range = dashboard.config().default_range;

    match cmd {
        Command::Summary => summary::handle(dashboard, printer).await,
        Command::Series(args) => series::handle(dashboard, &args, printer).await,
        Command::Addresses(args) => {
            addresses::handle(dashboard, args.lang.unwrap_or(language), printer).await
        }
        Command::Transactions(_) => transactions::handle(dashboard, printer).await,
        Command::Refresh(args) => {
            refresh::handle(
                dashboard,
                args.range.unwrap_or(range),
                args.lang.unwrap_or(language),
                printer,
            )
            .await
        }
        Command::Status => status::handle(dashboard, printer).await,
        // Handled before a dashboard is built
        Command::Sources | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "not a one-shot dashboard command".into(),
            })
        }
    }
}
