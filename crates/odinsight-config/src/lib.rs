//! Configuration for the OdinSight CLI.
//!
//! A TOML file in the platform config directory, layered over built-in
//! defaults and under `ODINSIGHT_*` environment variables, then translated
//! to `odinsight_core::DashboardConfig`.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use odinsight_api::{Endpoints, SourceDescriptor, SourceKind};
use odinsight_core::{ChartRange, ConnectivityConfig, DashboardConfig, Language};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of environment overrides, e.g. `ODINSIGHT_TIMEOUT=5`.
pub const ENV_PREFIX: &str = "ODINSIGHT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default output format for the CLI.
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always" or "never".
    #[serde(default = "default_color")]
    pub color: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Reachability probe timeout in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,

    #[serde(default = "default_range")]
    pub default_range: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_countdown")]
    pub reconnect_countdown_secs: u32,

    /// Online re-check interval; 0 disables it.
    #[serde(default = "default_health_interval")]
    pub health_interval_secs: u64,

    /// Background refresh interval for `watch`; 0 disables it.
    #[serde(default)]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_transaction_count")]
    pub transaction_count: usize,

    /// Never contact upstream; serve synthetic data only.
    #[serde(default)]
    pub offline: bool,

    /// Sources in priority order.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

impl Default for Config {
    fn default() -> Self {
        let builtin = [SourceDescriptor::icp_dashboard(), SourceDescriptor::mempool_space()];
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            probe_timeout: default_probe_timeout(),
            default_range: default_range(),
            language: default_language(),
            reconnect_countdown_secs: default_countdown(),
            health_interval_secs: default_health_interval(),
            refresh_interval_secs: 0,
            transaction_count: default_transaction_count(),
            offline: false,
            sources: builtin
                .into_iter()
                .flatten()
                .map(|source| SourceEntry::from(&source))
                .collect(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_range() -> String {
    ChartRange::default().to_string()
}
fn default_language() -> String {
    Language::default().to_string()
}
fn default_countdown() -> u32 {
    30
}
fn default_health_interval() -> u64 {
    30
}
fn default_transaction_count() -> usize {
    100
}

/// One `[[sources]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceEntry {
    pub name: String,

    /// "icp_dashboard" or "mempool_space"; decides the payload contract.
    pub kind: SourceKind,

    pub base_url: String,

    /// Path of the summary endpoint.
    pub summary: String,

    /// Path of the series endpoint.
    pub series: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addresses: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transactions: Option<String>,

    /// Extra headers sent on every request (e.g. an API key).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl From<&SourceDescriptor> for SourceEntry {
    fn from(source: &SourceDescriptor) -> Self {
        Self {
            name: source.name.clone(),
            kind: source.kind,
            base_url: source.base_url.to_string(),
            summary: source.endpoints.summary.clone(),
            series: source.endpoints.series.clone(),
            addresses: source.endpoints.addresses.clone(),
            transactions: source.endpoints.transactions.clone(),
            headers: source.headers.clone(),
        }
    }
}

impl SourceEntry {
    pub fn to_descriptor(&self) -> Result<SourceDescriptor, ConfigError> {
        let field = || format!("sources.{}.base_url", self.name);
        let base_url: url::Url = self
            .base_url
            .parse()
            .map_err(|e| ConfigError::invalid(field(), format!("{e}: {}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                field(),
                format!("expected an http(s) URL, got '{}'", self.base_url),
            ));
        }

        let mut descriptor = SourceDescriptor::new(
            self.name.clone(),
            self.kind,
            base_url,
            Endpoints {
                summary: self.summary.clone(),
                series: self.series.clone(),
                addresses: self.addresses.clone(),
                transactions: self.transactions.clone(),
            },
        );
        descriptor.headers.clone_from(&self.headers);
        Ok(descriptor)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "odinsight", "odinsight").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("odinsight");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate and build a `DashboardConfig`.
///
/// In offline mode the source list is dropped, so every query resolves to
/// synthetic data without touching the network.
pub fn to_dashboard_config(cfg: &Config) -> Result<DashboardConfig, ConfigError> {
    if cfg.timeout == 0 {
        return Err(ConfigError::invalid("timeout", "must be at least 1 second"));
    }
    if cfg.probe_timeout == 0 {
        return Err(ConfigError::invalid("probe_timeout", "must be at least 1 second"));
    }
    if cfg.reconnect_countdown_secs == 0 {
        return Err(ConfigError::invalid(
            "reconnect_countdown_secs",
            "must be at least 1 second",
        ));
    }

    let default_range: ChartRange = cfg
        .default_range
        .parse()
        .map_err(|e| ConfigError::invalid("default_range", format!("{e}")))?;
    let language: Language = cfg
        .language
        .parse()
        .map_err(|e| ConfigError::invalid("language", format!("{e}")))?;

    let mut seen = HashSet::new();
    for entry in &cfg.sources {
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::invalid(
                "sources",
                format!("duplicate source name '{}'", entry.name),
            ));
        }
    }
    let sources = if cfg.offline {
        Vec::new()
    } else {
        cfg.sources
            .iter()
            .map(SourceEntry::to_descriptor)
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(DashboardConfig {
        sources,
        timeout: Duration::from_secs(cfg.timeout),
        probe_timeout: Duration::from_secs(cfg.probe_timeout),
        default_range,
        language,
        connectivity: ConnectivityConfig {
            countdown_secs: cfg.reconnect_countdown_secs,
            health_interval: Duration::from_secs(cfg.health_interval_secs),
        },
        refresh_interval_secs: cfg.refresh_interval_secs,
        transaction_count: cfg.transaction_count,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use figment::Jail;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_list_builtin_sources_in_order() {
        let cfg = Config::default();
        let names: Vec<_> = cfg.sources.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["ICP Dashboard", "Mempool.space"]);

        let dashboard = to_dashboard_config(&cfg).unwrap();
        assert_eq!(dashboard.sources.len(), 2);
        assert_eq!(dashboard.timeout, Duration::from_secs(10));
        assert_eq!(dashboard.default_range, ChartRange::Week);
        assert_eq!(dashboard.connectivity.countdown_secs, 30);
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let cfg = load_config_from(Path::new("does-not-exist.toml")).unwrap();
            assert_eq!(cfg, Config::default());
            Ok(())
        });
    }

    #[test]
    fn file_sources_replace_builtin_list() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    timeout = 4
                    language = "en"

                    [[sources]]
                    name = "self-hosted"
                    kind = "icp_dashboard"
                    base_url = "http://127.0.0.1:8080"
                    summary = "/summary"
                    series = "/series"
                    addresses = "/holders"

                    [sources.headers]
                    x-api-key = "secret"
                "#,
            )?;

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.timeout, 4);
            assert_eq!(cfg.sources.len(), 1);

            let dashboard = to_dashboard_config(&cfg).unwrap();
            let source = &dashboard.sources[0];
            assert_eq!(source.name, "self-hosted");
            assert_eq!(source.endpoints.addresses.as_deref(), Some("/holders"));
            assert_eq!(source.headers["x-api-key"], "secret");
            assert_eq!(dashboard.language, Language::En);
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "timeout = 4\ndefault_range = \"30d\"")?;
            jail.set_env("ODINSIGHT_TIMEOUT", "9");
            jail.set_env("ODINSIGHT_OFFLINE", "true");

            let cfg = load_config_from(Path::new("config.toml")).unwrap();
            assert_eq!(cfg.timeout, 9);
            assert!(cfg.offline);

            let dashboard = to_dashboard_config(&cfg).unwrap();
            assert!(dashboard.sources.is_empty());
            assert_eq!(dashboard.default_range, ChartRange::Month);
            Ok(())
        });
    }

    #[test]
    fn validation_rejects_bad_values() {
        let cfg = Config {
            default_range: "2w".into(),
            ..Config::default()
        };
        assert!(matches!(
            to_dashboard_config(&cfg),
            Err(ConfigError::Validation { field, .. }) if field == "default_range"
        ));

        let cfg = Config {
            timeout: 0,
            ..Config::default()
        };
        assert!(to_dashboard_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.sources[1].name = cfg.sources[0].name.clone();
        assert!(to_dashboard_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.sources[0].base_url = "ftp://example.com".into();
        assert!(to_dashboard_config(&cfg).is_err());
    }

    #[test]
    fn save_then_load_preserves_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.reconnect_countdown_secs = 10;
        cfg.sources[0]
            .headers
            .insert("authorization".into(), "Bearer t".into());
        save_config(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[[sources]]"));

        let loaded: Config = toml::from_str(&text).unwrap();
        assert_eq!(loaded, cfg);
    }
}
