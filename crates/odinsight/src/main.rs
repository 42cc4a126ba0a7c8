mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::Printer;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose, cli.global.quiet);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, quiet: bool) {
    let filter = match (quiet, verbosity) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands work even when the file is broken
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "odinsight", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load(&cli.global)?;
            let printer = Printer::new(&cli.global, &cfg);

            match cmd {
                Command::Sources => commands::sources::handle(&cfg, printer),
                Command::Watch(args) => commands::watch::handle(args, &cfg, printer).await,
                cmd => {
                    let mut dashboard_config = config::dashboard_config(&cfg)?;
                    if let Command::Transactions(args) = &cmd {
                        if let Some(limit) = args.limit {
                            dashboard_config.transaction_count = usize::from(limit);
                        }
                        if let Some(lang) = args.lang {
                            dashboard_config.language = lang;
                        }
                    }

                    tracing::debug!(command = ?cmd, sources = dashboard_config.sources.len(), "dispatching command");
                    commands::dispatch(cmd, dashboard_config, printer).await
                }
            }
        }
    }
}
