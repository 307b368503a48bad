//! In-memory trade ledger.
//!
//! The [`Ledger`] is the only owner of recorded trades. It validates
//! creation requests, assigns each accepted trade a fresh id and timestamp,
//! and hands out clones of stored records. All methods take `&self`, so a
//! single ledger can be shared across threads behind an `Arc`.

pub mod store;

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::config::{DEFAULT_ID_PREFIX, LedgerConfig};
use crate::models::{Exchange, TradeCreateRequest, TradeRecord, TradeSide, ValidationError};
pub use store::{MemoryStore, TradeStore};

/// Error returned by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No record carries the requested id.
    #[error("trade {id:?} not found")]
    NotFound { id: String },

    /// The creation request broke a field rule. Nothing was recorded.
    #[error("invalid trade request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// The id prefix is empty or contains non-alphanumeric characters.
    #[error("id prefix {prefix:?} must be non-empty ASCII alphanumeric")]
    InvalidIdPrefix { prefix: String },

    /// An injected store holds the same id more than once.
    #[error("store holds trade id {id:?} more than once")]
    DuplicateId { id: String },

    /// An injected store holds a record timestamped before its predecessor.
    #[error("stored trade {id:?} is timestamped before the trade preceding it")]
    TimestampOutOfOrder { id: String },
}

impl LedgerError {
    /// Machine-readable code for the request-handling layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "TRADE_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::InvalidIdPrefix { .. } => "INVALID_ID_PREFIX",
            Self::DuplicateId { .. } => "DUPLICATE_TRADE_ID",
            Self::TimestampOutOfOrder { .. } => "TIMESTAMP_OUT_OF_ORDER",
        }
    }
}

/// Holds trade records in creation order.
pub struct Ledger<S = MemoryStore> {
    id_prefix: String,
    state: RwLock<LedgerState<S>>,
}

struct LedgerState<S> {
    store: S,
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Ledger<MemoryStore> {
    /// Creates an empty ledger issuing ids with the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::assemble(DEFAULT_ID_PREFIX, MemoryStore::new(), None)
    }

    /// Creates an empty ledger configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidIdPrefix`] if the configured prefix is
    /// not usable.
    pub fn from_config(config: &LedgerConfig) -> Result<Self, LedgerError> {
        Self::with_store(&config.id_prefix, MemoryStore::new())
    }
}

impl Default for Ledger<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TradeStore> Ledger<S> {
    /// Creates a ledger that takes ownership of `store`.
    ///
    /// Records already in the store stay visible; new ids skip any id the
    /// store already holds and new timestamps never precede its last record.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidIdPrefix`] for an unusable prefix,
    /// [`LedgerError::DuplicateId`] if two stored records share an id, and
    /// [`LedgerError::TimestampOutOfOrder`] if stored timestamps decrease.
    pub fn with_store(id_prefix: &str, store: S) -> Result<Self, LedgerError> {
        if !is_valid_id_prefix(id_prefix) {
            return Err(LedgerError::InvalidIdPrefix {
                prefix: id_prefix.to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        for record in store.records() {
            if !seen.insert(record.id.as_str()) {
                return Err(LedgerError::DuplicateId {
                    id: record.id.clone(),
                });
            }
            if last_timestamp.is_some_and(|last| record.timestamp < last) {
                return Err(LedgerError::TimestampOutOfOrder {
                    id: record.id.clone(),
                });
            }
            last_timestamp = Some(record.timestamp);
        }

        Ok(Self::assemble(id_prefix, store, last_timestamp))
    }

    fn assemble(id_prefix: &str, store: S, last_timestamp: Option<DateTime<Utc>>) -> Self {
        Self {
            id_prefix: id_prefix.to_string(),
            state: RwLock::new(LedgerState {
                store,
                next_id: 1,
                last_timestamp,
            }),
        }
    }

    /// Returns every record in creation order.
    #[must_use]
    pub fn list(&self) -> Vec<TradeRecord> {
        self.read().store.records().to_vec()
    }

    /// Returns the record whose id equals `id` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if no record has that id.
    pub fn get_by_id(&self, id: &str) -> Result<TradeRecord, LedgerError> {
        self.read()
            .store
            .find(id)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound { id: id.to_string() })
    }

    /// Validates `request` and records it as a new trade.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidRequest`] if the request breaks a field
    /// rule; the ledger is left untouched.
    pub fn create(&self, request: TradeCreateRequest) -> Result<TradeRecord, LedgerError> {
        request.validate()?;

        let mut state = self.write();
        let id = state.allocate_id(&self.id_prefix);
        let timestamp = state.stamp(Utc::now());
        let record = TradeRecord::from_request(id, timestamp, request);
        state.store.append(record.clone());
        Ok(record)
    }

    /// Number of recorded trades.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().store.len()
    }

    /// Whether no trade has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().store.is_empty()
    }

    /// Records the sample trades from [`demo_requests`].
    ///
    /// # Errors
    ///
    /// Propagates any creation error, though the samples are always valid.
    pub fn seed_demo(&self) -> Result<Vec<TradeRecord>, LedgerError> {
        demo_requests()
            .into_iter()
            .map(|request| self.create(request))
            .collect()
    }

    // Poisoning is recovered from: every mutation is a single append made
    // after all fallible work, so the state is never half-written.
    fn read(&self) -> RwLockReadGuard<'_, LedgerState<S>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LedgerState<S>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: TradeStore> LedgerState<S> {
    fn allocate_id(&mut self, prefix: &str) -> String {
        loop {
            let id = format!("{prefix}-{:06}", self.next_id);
            self.next_id += 1;
            if self.store.find(&id).is_none() {
                return id;
            }
        }
    }

    /// Never hands out a timestamp earlier than the previous one, even if
    /// the wall clock steps backwards.
    fn stamp(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}

/// Whether `prefix` can head generated ids: non-empty ASCII alphanumeric.
#[must_use]
pub fn is_valid_id_prefix(prefix: &str) -> bool {
    !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Two sample trades used to populate a fresh ledger for demos.
#[must_use]
pub fn demo_requests() -> Vec<TradeCreateRequest> {
    vec![
        TradeCreateRequest::new(Exchange::Binance, "BTC", "USDT", TradeSide::Buy, "0.5"),
        TradeCreateRequest::new(Exchange::Coinbase, "ETH", "EUR", TradeSide::Sell, "2.0"),
    ]
}
