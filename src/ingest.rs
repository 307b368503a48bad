//! Line-oriented intake of trade creation requests.
//!
//! Each non-blank input line is one JSON [`TradeCreateRequest`]. Lines that
//! fail to deserialize or are rejected by the ledger are logged and skipped;
//! only I/O failures abort the run.

use std::io::BufRead;

use tracing::{debug, warn};

use crate::ledger::{Ledger, TradeStore};
use crate::models::TradeCreateRequest;

/// Counts from one [`ingest_lines`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub created: usize,
    pub malformed: usize,
    pub rejected: usize,
}

/// Feeds every request in `reader` to `ledger`.
///
/// # Errors
///
/// Returns [`TradeLedgerError::Io`](crate::TradeLedgerError::Io) if reading
/// a line fails.
pub fn ingest_lines<R, S>(ledger: &Ledger<S>, reader: R) -> crate::Result<IngestSummary>
where
    R: BufRead,
    S: TradeStore,
{
    let mut summary = IngestSummary::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let request: TradeCreateRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                warn!(line = line_no, error = %err, "Skipping malformed request");
                summary.malformed += 1;
                continue;
            }
        };

        match ledger.create(request) {
            Ok(record) => {
                debug!(
                    line = line_no,
                    id = %record.id,
                    exchange = %record.exchange,
                    side = %record.side,
                    symbol = %record.symbol(),
                    amount = %record.amount,
                    "Recorded trade"
                );
                summary.created += 1;
            }
            Err(err) => {
                warn!(
                    line = line_no,
                    code = err.code(),
                    error = %err,
                    "Skipping rejected request"
                );
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}
