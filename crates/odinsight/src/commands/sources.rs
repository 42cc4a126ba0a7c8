//! Sources command handler: the configured registry, in priority order.

use odinsight_config::{Config, SourceEntry};
use serde::Serialize;
use tabled::Tabled;

use crate::error::CliError;
use crate::output::Printer;

#[derive(Tabled)]
struct SourceRow {
    #[tabled(rename = "#")]
    priority: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Base URL")]
    base_url: String,
    #[tabled(rename = "Serves")]
    serves: String,
}

#[derive(Serialize)]
struct RankedSource<'a> {
    priority: usize,
    #[serde(flatten)]
    entry: &'a SourceEntry,
}

impl From<&RankedSource<'_>> for SourceRow {
    fn from(r: &RankedSource<'_>) -> Self {
        Self {
            priority: r.priority,
            name: r.entry.name.clone(),
            kind: r.entry.kind.to_string(),
            base_url: r.entry.base_url.clone(),
            serves: served(r.entry),
        }
    }
}

fn served(entry: &SourceEntry) -> String {
    let mut queries = vec!["summary", "series"];
    if entry.addresses.is_some() {
        queries.push("addresses");
    }
    if entry.transactions.is_some() {
        queries.push("transactions");
    }
    queries.join(", ")
}

pub fn handle(cfg: &Config, printer: Printer) -> Result<(), CliError> {
    let ranked: Vec<RankedSource<'_>> = cfg
        .sources
        .iter()
        .enumerate()
        .map(|(i, entry)| RankedSource {
            priority: i + 1,
            entry,
        })
        .collect();

    let out = printer.render_list(&ranked, |r| SourceRow::from(r), |r| r.entry.name.clone())?;
    printer.print(&out);

    if cfg.offline {
        printer.note("offline mode: sources are skipped and synthetic data is served");
    }
    Ok(())
}
