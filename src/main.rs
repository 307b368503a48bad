use std::io::{self, Write};

use tracing::info;

use trade_ledger::config::fetch_config;
use trade_ledger::ingest::ingest_lines;
use trade_ledger::{Ledger, TradeLedgerError};

fn main() -> Result<(), TradeLedgerError> {
    // Logs go to stderr; stdout carries only the ledger dump.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let app_config = fetch_config()?;
    let ledger = Ledger::from_config(&app_config.ledger)?;

    if app_config.ledger.seed_demo {
        let seeded = ledger.seed_demo()?;
        info!(count = seeded.len(), "Seeded demo trades");
    }

    let summary = ingest_lines(&ledger, io::stdin().lock())?;
    info!(
        created = summary.created,
        malformed = summary.malformed,
        rejected = summary.rejected,
        "Finished reading requests"
    );

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &ledger.list())?;
    writeln!(stdout)?;

    Ok(())
}
