//! # Event Persistence
//!
//! The event log persists through a keyed byte store supplied by the host.
//! [`EventStore`] is the whole contract: put a value under a key, scan a key
//! prefix in ascending key order, clear a prefix. [`InMemoryEventStore`] is
//! a `BTreeMap`-backed implementation for tests and embedders without a
//! durable engine.

use std::collections::BTreeMap;

use thiserror::Error;

/// Failure reported by the persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store cannot be reached or refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store failed while reading or writing.
    #[error("store I/O failure: {0}")]
    Io(String),
}

/// Keyed byte store beneath the event log.
pub trait EventStore: Send {
    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write did not complete.
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Return every entry whose key starts with `prefix`, in ascending key
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scan could not be performed.
    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError>;

    /// Remove every entry whose key starts with `prefix`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the entries could not be removed.
    fn clear(&mut self, prefix: &str) -> Result<(), StoreError>;
}

/// In-memory [`EventStore`] backed by an ordered map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventStore {
    entries: BTreeMap<String, Vec<u8>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all prefixes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl EventStore for InMemoryEventStore {
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    fn clear(&mut self, prefix: &str) -> Result<(), StoreError> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}
