//! Transaction list command handler.
//!
//! Count and language come from the dashboard config, which `main` has
//! already overridden with `--limit` / `--lang`.

use odinsight_core::{Dashboard, Direction, TransactionRow, TxStatus};
use tabled::Tabled;

use crate::error::CliError;
use crate::output::Printer;

#[derive(Tabled)]
struct TxRow {
    #[tabled(rename = "Time (UTC)")]
    time: String,
    #[tabled(rename = "Type")]
    direction: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Amount (BTC)")]
    amount: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Tx hash")]
    hash: String,
}

impl From<&TransactionRow> for TxRow {
    fn from(t: &TransactionRow) -> Self {
        let sign = match t.direction {
            Direction::Deposit => '+',
            Direction::Withdrawal => '-',
        };
        let status = match t.status {
            TxStatus::Confirmed => format!("confirmed ({})", t.confirmations),
            other => other.to_string(),
        };
        Self {
            time: t.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            direction: t.direction.to_string(),
            user: t.user_id.clone(),
            amount: format!("{sign}{:.8}", t.amount_btc),
            status,
            hash: abbreviate(&t.tx_hash),
        }
    }
}

fn abbreviate(hash: &str) -> String {
    if hash.len() <= 16 {
        return hash.to_owned();
    }
    match (hash.get(..10), hash.get(hash.len() - 6..)) {
        (Some(head), Some(tail)) => format!("{head}…{tail}"),
        _ => hash.to_owned(),
    }
}

pub async fn handle(dashboard: &Dashboard, printer: Printer) -> Result<(), CliError> {
    let origin = dashboard.fetch_transactions().await;
    let rows = dashboard.transactions();

    let out = printer.render_list(&rows, |t| TxRow::from(t), |t| t.tx_hash.clone())?;
    printer.print(&out);
    printer.note(&format!("source: {}", printer.origin(&origin)));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::abbreviate;

    #[test]
    fn long_hashes_are_shortened() {
        let hash = format!("0x{}", "ab".repeat(32));
        assert_eq!(abbreviate(&hash), "0xabababab…ababab");
        assert_eq!(abbreviate("0x1234"), "0x1234");
    }
}
