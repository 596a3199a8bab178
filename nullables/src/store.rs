//! Nullable store: thread-safe in-memory consumption registry for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use payproof_store::{ConsumedEntry, ConsumptionStore, StoreError};
use payproof_types::{Timestamp, TxReference};

/// An in-memory consumption registry.
///
/// Thread-safe for use with tokio's multi-threaded runtime; the map lock
/// makes `mark_if_absent` atomic. Can be switched into a failing mode to
/// simulate a broken backend.
pub struct NullConsumptionStore {
    consumed: Mutex<HashMap<TxReference, Timestamp>>,
    failing: AtomicBool,
}

impl NullConsumptionStore {
    pub fn new() -> Self {
        Self {
            consumed: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Backend("null store is failing".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullConsumptionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsumptionStore for NullConsumptionStore {
    fn is_consumed(&self, reference: &TxReference) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.consumed.lock().unwrap().contains_key(reference))
    }

    fn mark_if_absent(&self, reference: &TxReference, at: Timestamp) -> Result<bool, StoreError> {
        self.check()?;
        let mut consumed = self.consumed.lock().unwrap();
        if consumed.contains_key(reference) {
            return Ok(false);
        }
        consumed.insert(reference.clone(), at);
        Ok(true)
    }

    fn consumed_at(&self, reference: &TxReference) -> Result<Option<Timestamp>, StoreError> {
        self.check()?;
        Ok(self.consumed.lock().unwrap().get(reference).copied())
    }

    fn list_consumed(&self) -> Result<Vec<ConsumedEntry>, StoreError> {
        self.check()?;
        let mut entries: Vec<ConsumedEntry> = self
            .consumed
            .lock()
            .unwrap()
            .iter()
            .map(|(reference, at)| ConsumedEntry {
                reference: reference.clone(),
                consumed_at: *at,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.consumed_at
                .cmp(&b.consumed_at)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        Ok(entries)
    }

    fn consumed_count(&self) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self.consumed.lock().unwrap().len() as u64)
    }
}
