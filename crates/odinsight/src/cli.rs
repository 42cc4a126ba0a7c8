//! Clap derive structures for the `odinsight` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use odinsight_core::{ChartRange, Language};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// odinsight -- ckBTC custody dashboard in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "odinsight",
    version,
    about = "Inspect ckBTC custody reserves, flows and addresses",
    long_about = "Queries the configured custody-metrics sources in priority order.\n\n\
        When every source is unreachable, deterministic synthetic data is\n\
        served instead and the connection is retried on a countdown.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "ODINSIGHT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Skip every upstream source and serve synthetic data
    #[arg(long, global = true)]
    pub offline: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reserve totals, net flows and coverage
    #[command(alias = "sum")]
    Summary,

    /// Net-flow and total-reserve chart series
    Series(SeriesArgs),

    /// Custody address clusters
    #[command(alias = "addr")]
    Addresses(AddressesArgs),

    /// Recent deposits and withdrawals
    #[command(alias = "tx")]
    Transactions(TransactionsArgs),

    /// Refresh every panel at once and print the full snapshot
    Refresh(RefreshArgs),

    /// Probe the sources and report connectivity
    Status,

    /// List configured sources in priority order
    Sources,

    /// Follow connectivity and refreshes until interrupted
    Watch(WatchArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared value parsers ─────────────────────────────────────────────

fn parse_range(s: &str) -> Result<ChartRange, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse().map_err(|e| format!("{e}"))
}

// ── Query commands ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeriesSelect {
    /// Net flow only
    Net,
    /// Total reserve only
    Total,
    /// Both series
    Both,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    /// Chart range: 1h, 24h, 7d, 30d, 90d, 180d, 1Y, All
    #[arg(long, short = 'r', value_parser = parse_range)]
    pub range: Option<ChartRange>,

    /// Which series to print
    #[arg(long, short = 'k', value_enum, default_value = "both")]
    pub kind: SeriesSelect,
}

#[derive(Debug, Args)]
pub struct AddressesArgs {
    /// Note language: zh or en
    #[arg(long, short = 'l', value_parser = parse_language)]
    pub lang: Option<Language>,
}

#[derive(Debug, Args)]
pub struct TransactionsArgs {
    /// Number of transactions to request
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u16).range(1..))]
    pub limit: Option<u16>,

    /// Note language: zh or en
    #[arg(long, short = 'l', value_parser = parse_language)]
    pub lang: Option<Language>,
}

#[derive(Debug, Args)]
pub struct RefreshArgs {
    /// Chart range for the series panels
    #[arg(long, short = 'r', value_parser = parse_range)]
    pub range: Option<ChartRange>,

    /// Note language: zh or en
    #[arg(long, short = 'l', value_parser = parse_language)]
    pub lang: Option<Language>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Chart range for the periodic refresh
    #[arg(long, short = 'r', value_parser = parse_range)]
    pub range: Option<ChartRange>,

    /// Note language: zh or en
    #[arg(long, short = 'l', value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Seconds between refreshes (overrides refresh_interval_secs)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
