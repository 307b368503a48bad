//! In-memory ledger of trade executions.
//!
//! Provides typed trade models with field validation and a thread-safe
//! [`Ledger`](ledger::Ledger) that records trades and serves them back by
//! listing or id lookup.

pub mod config;
pub mod error;
pub mod ingest;
pub mod ledger;
pub mod models;

pub use error::{Result, TradeLedgerError};
pub use ledger::{Ledger, LedgerError};
pub use models::{Exchange, TradeCreateRequest, TradeRecord, TradeSide, ValidationError};
