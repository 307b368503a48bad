//! Crate-level error types.
//!
//! [`TradeLedgerError`] unifies every error source (configuration, ledger,
//! JSON, I/O) behind a single enum so callers can match on the variant they
//! care about while still using the `?` operator for easy propagation.

use crate::ledger::LedgerError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TradeLedgerError>;

/// Top-level error type returned by the configuration layer and the binary.
#[derive(Debug, thiserror::Error)]
pub enum TradeLedgerError {
    /// An environment variable held a value that could not be used.
    #[error("configuration error: {0}")]
    Config(String),

    /// A ledger operation was rejected.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading input or writing output failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
