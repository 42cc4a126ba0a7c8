//! CLI error types with miette diagnostics.
//!
//! Fetch operations never fail, so most errors come from configuration,
//! argument validation, and output.

use miette::Diagnostic;
use thiserror::Error;

use odinsight_config::ConfigError;
use odinsight_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connectivity ─────────────────────────────────────────────────

    #[error("No upstream source is reachable")]
    #[diagnostic(
        code(odinsight::offline),
        help(
            "Synthetic data is being served. Retry in {countdown}s, or check\n\
             the configured sources with: odinsight sources"
        )
    )]
    Offline { countdown: u32 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(odinsight::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(odinsight::config),
        help("Inspect the effective configuration with: odinsight config show")
    )]
    Config(#[from] ConfigError),

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(
        code(odinsight::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    // ── Core ─────────────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(odinsight::core))]
    Core(#[from] CoreError),

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(odinsight::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Offline { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::ConfigExists { .. } => exit_code::USAGE,
            Self::Config(_) | Self::Core(CoreError::Config { .. }) => exit_code::CONFIG,
            Self::Core(CoreError::InvalidRange { .. } | CoreError::InvalidLanguage { .. }) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(CliError::Offline { countdown: 30 }.exit_code(), 7);
        assert_eq!(
            CliError::Validation {
                field: "limit".into(),
                reason: "too large".into()
            }
            .exit_code(),
            2
        );
        let config = ConfigError::Validation {
            field: "timeout".into(),
            reason: "zero".into(),
        };
        assert_eq!(CliError::from(config).exit_code(), 3);
        assert_eq!(CliError::Render("x".into()).exit_code(), 1);
    }
}
