//! Application configuration loaded from environment variables.
//!
//! - `TRADE_LEDGER_ID_PREFIX` — prefix for generated trade ids (default `TRD`)
//! - `TRADE_LEDGER_SEED_DEMO` — record two sample trades at startup
//!
//! Empty values are treated as unset.

use crate::ledger::is_valid_id_prefix;

/// Default prefix for generated trade ids.
pub const DEFAULT_ID_PREFIX: &str = "TRD";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ledger: LedgerConfig,
}

/// Ledger-specific configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub id_prefix: String,
    pub seed_demo: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            id_prefix: DEFAULT_ID_PREFIX.to_string(),
            seed_demo: false,
        }
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`TradeLedgerError::Config`](crate::TradeLedgerError::Config) if
/// the id prefix is not ASCII alphanumeric or the seed flag is not a
/// recognised boolean.
pub fn fetch_config() -> crate::Result<AppConfig> {
    let id_prefix = match non_empty_var("TRADE_LEDGER_ID_PREFIX") {
        Some(prefix) => validate_prefix(prefix)?,
        None => DEFAULT_ID_PREFIX.to_string(),
    };

    let seed_demo = match non_empty_var("TRADE_LEDGER_SEED_DEMO") {
        Some(raw) => parse_flag("TRADE_LEDGER_SEED_DEMO", &raw)?,
        None => false,
    };

    Ok(AppConfig {
        ledger: LedgerConfig {
            id_prefix,
            seed_demo,
        },
    })
}

fn validate_prefix(prefix: String) -> crate::Result<String> {
    if is_valid_id_prefix(&prefix) {
        Ok(prefix)
    } else {
        Err(crate::TradeLedgerError::Config(format!(
            "TRADE_LEDGER_ID_PREFIX must be ASCII alphanumeric, got {prefix:?}"
        )))
    }
}

fn parse_flag(name: &str, raw: &str) -> crate::Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(crate::TradeLedgerError::Config(format!(
            "{name} must be true/false/1/0, got {raw:?}"
        ))),
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
