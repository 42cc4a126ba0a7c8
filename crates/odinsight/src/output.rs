//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one value per line.

use std::io::{self, IsTerminal, Write};

use odinsight_core::{ApiStatus, DataOrigin};
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Printer ──────────────────────────────────────────────────────────

/// Resolved output settings: CLI flags first, then the config file.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Printer {
    pub fn new(global: &GlobalOpts, cfg: &odinsight_config::Config) -> Self {
        let format = global.output.unwrap_or_else(|| {
            clap::ValueEnum::from_str(&cfg.output, true).unwrap_or(OutputFormat::Table)
        });
        let mode = global.color.unwrap_or_else(|| {
            clap::ValueEnum::from_str(&cfg.color, true).unwrap_or(ColorMode::Auto)
        });
        Self {
            format,
            color: should_color(mode),
            quiet: global.quiet,
        }
    }

    /// Print the rendered output to stdout, respecting quiet mode.
    pub fn print(&self, output: &str) {
        if self.quiet || output.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{output}");
    }

    /// Progress and status notes go to stderr.
    pub fn note(&self, message: &str) {
        if !self.quiet {
            eprintln!("{message}");
        }
    }

    /// Render a list of serde-serializable + tabled items in the chosen format.
    ///
    /// - `table`: uses the `Tabled` derive to build a pretty table
    /// - `json` / `json-compact` / `yaml`: serializes the data via serde
    /// - `plain`: calls `id_fn` on each item to emit one line per item
    pub fn render_list<T, R>(
        &self,
        data: &[T],
        to_row: impl Fn(&T) -> R,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<String, CliError>
    where
        T: serde::Serialize,
        R: Tabled,
    {
        match self.format {
            OutputFormat::Table => {
                let rows: Vec<R> = data.iter().map(to_row).collect();
                Ok(render_table(&rows))
            }
            OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
            _ => self.render_structured(data),
        }
    }

    /// Render a single item. Table rendering uses a pre-formatted detail view.
    pub fn render_single<T>(
        &self,
        data: &T,
        detail_fn: impl Fn(&T) -> String,
        id_fn: impl Fn(&T) -> String,
    ) -> Result<String, CliError>
    where
        T: serde::Serialize + ?Sized,
    {
        match self.format {
            OutputFormat::Table => Ok(detail_fn(data)),
            OutputFormat::Plain => Ok(id_fn(data)),
            _ => self.render_structured(data),
        }
    }

    fn render_structured<T: serde::Serialize + ?Sized>(&self, data: &T) -> Result<String, CliError> {
        Ok(match self.format {
            OutputFormat::JsonCompact => serde_json::to_string(data)?,
            OutputFormat::Yaml => serde_yaml::to_string(data)?,
            _ => serde_json::to_string_pretty(data)?,
        })
    }

    // ── Color helpers ────────────────────────────────────────────────

    pub fn status(&self, status: ApiStatus) -> String {
        let text = status.to_string();
        if !self.color {
            return text;
        }
        match status {
            ApiStatus::Online => text.green().bold().to_string(),
            ApiStatus::Offline => text.red().bold().to_string(),
            ApiStatus::Checking => text.yellow().to_string(),
        }
    }

    pub fn origin(&self, origin: &DataOrigin) -> String {
        let text = origin.to_string();
        match origin {
            _ if !self.color => text,
            DataOrigin::Live { .. } => text.cyan().to_string(),
            DataOrigin::Synthetic => text.dimmed().to_string(),
        }
    }

    /// Signed BTC amount, green inflow / red outflow.
    pub fn flow(&self, btc: f64) -> String {
        let text = format!("{btc:+.4} BTC");
        if !self.color {
            text
        } else if btc < 0.0 {
            text.red().to_string()
        } else {
            text.green().to_string()
        }
    }
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Two-column key/value detail view.
pub fn render_detail(pairs: &[(&str, String)]) -> String {
    let width = pairs.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    pairs
        .iter()
        .map(|(key, value)| format!("{key:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: String,
    }

    fn printer(format: OutputFormat) -> Printer {
        Printer {
            format,
            color: false,
            quiet: false,
        }
    }

    #[test]
    fn list_formats() {
        let data = vec![Row { name: "a".into() }, Row { name: "b".into() }];
        let to_row = |r: &Row| Row {
            name: r.name.clone(),
        };
        let id = |r: &Row| r.name.clone();

        let plain = printer(OutputFormat::Plain).render_list(&data, to_row, id).unwrap();
        assert_eq!(plain, "a\nb");

        let json = printer(OutputFormat::JsonCompact)
            .render_list(&data, to_row, id)
            .unwrap();
        assert_eq!(json, r#"[{"name":"a"},{"name":"b"}]"#);

        let table = printer(OutputFormat::Table).render_list(&data, to_row, id).unwrap();
        assert!(table.contains("name"));
    }

    #[test]
    fn detail_aligns_keys() {
        let out = render_detail(&[("a", "1".into()), ("long", "2".into())]);
        assert_eq!(out, "a     1\nlong  2");
    }

    #[test]
    fn uncolored_status_is_plain_text() {
        assert_eq!(printer(OutputFormat::Table).status(ApiStatus::Offline), "offline");
        assert_eq!(printer(OutputFormat::Table).flow(-1.5), "-1.5000 BTC");
    }
}
