//! CLI-side configuration: locate and load the file, then apply flag
//! overrides before translating to `odinsight_core::DashboardConfig`.

use std::path::PathBuf;

use odinsight_config::{Config, load_config_from, to_dashboard_config};
use odinsight_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// `--config` / `ODINSIGHT_CONFIG`, else the platform location.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(odinsight_config::config_path)
}

/// Load the layered config with `--timeout` and `--offline` applied.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = load_config_from(&config_path(global))?;
    if let Some(timeout) = global.timeout {
        cfg.timeout = timeout;
    }
    if global.offline {
        cfg.offline = true;
    }
    Ok(cfg)
}

pub fn dashboard_config(cfg: &Config) -> Result<DashboardConfig, CliError> {
    Ok(to_dashboard_config(cfg)?)
}
