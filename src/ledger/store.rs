//! Storage backends for the ledger.

use std::collections::HashMap;

use crate::models::TradeRecord;

/// Append-only record storage owned by a [`Ledger`](super::Ledger).
///
/// Implementations must keep records in append order and must not reorder,
/// replace, or drop them.
pub trait TradeStore {
    /// Appends a record. The ledger guarantees its id is not yet stored.
    fn append(&mut self, record: TradeRecord);

    /// All records in append order.
    fn records(&self) -> &[TradeRecord];

    /// Looks up a record by exact id.
    fn find(&self, id: &str) -> Option<&TradeRecord>;

    fn len(&self) -> usize {
        self.records().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Vector-backed store with an id index for point lookups.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<TradeRecord>,
    index: HashMap<String, usize>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `records`, kept in the given order.
    ///
    /// The records are not checked here; [`Ledger::with_store`](super::Ledger::with_store)
    /// refuses a store with repeated ids or decreasing timestamps.
    #[must_use]
    pub fn from_records(records: Vec<TradeRecord>) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.id.clone()).or_insert(position);
        }
        Self { records, index }
    }
}

impl TradeStore for MemoryStore {
    fn append(&mut self, record: TradeRecord) {
        self.index.insert(record.id.clone(), self.records.len());
        self.records.push(record);
    }

    fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    fn find(&self, id: &str) -> Option<&TradeRecord> {
        self.index.get(id).map(|&position| &self.records[position])
    }
}
