//! Address cluster command handler.

use odinsight_core::{AddressRow, Dashboard, Language};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::Printer;

#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Chain")]
    chain: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Last active")]
    last_active: String,
    #[tabled(rename = "In (BTC)")]
    received: String,
    #[tabled(rename = "Out (BTC)")]
    sent: String,
    #[tabled(rename = "Balance (BTC)")]
    balance: String,
    #[tabled(rename = "Note")]
    note: String,
}

impl From<&AddressRow> for ClusterRow {
    fn from(r: &AddressRow) -> Self {
        Self {
            label: r.label.clone(),
            chain: r.chain.clone(),
            address: r.address.clone(),
            last_active: r.last_active.clone(),
            received: format!("{:.4}", r.in_sum_btc),
            sent: format!("{:.4}", r.out_sum_btc),
            balance: format!("{:.4}", r.balance_btc()),
            note: r.note.clone(),
        }
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    language: Language,
    printer: Printer,
) -> Result<(), CliError> {
    let origin = dashboard.fetch_addresses(language).await;
    let rows = dashboard.addresses();

    let out = printer.render_list(&rows, |r| ClusterRow::from(r), |r| r.address.clone())?;
    printer.print(&out);
    printer.note(&format!("source: {}", printer.origin(&origin)));
    Ok(())
}
