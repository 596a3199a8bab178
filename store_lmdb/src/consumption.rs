//! LMDB implementation of ConsumptionStore.
//!
//! Keys are the reference strings; values are the consumed-at time as an
//! 8-byte big-endian unix second count.

use std::sync::Arc;

use heed::types::{Bytes, Str};
use heed::{Database, Env};
use tracing::debug;

use payproof_store::{ConsumedEntry, ConsumptionStore, StoreError};
use payproof_types::{Timestamp, TxReference};

use crate::LmdbError;

pub struct LmdbConsumptionStore {
    pub(crate) env: Arc<Env>,
    pub(crate) consumed_db: Database<Str, Bytes>,
}

fn decode_timestamp(key: &str, bytes: &[u8]) -> Result<Timestamp, LmdbError> {
    let arr: [u8; 8] = bytes.try_into().map_err(|_| {
        LmdbError::Corruption(format!(
            "consumed-at for {key} has {} bytes, expected 8",
            bytes.len()
        ))
    })?;
    Ok(Timestamp::new(u64::from_be_bytes(arr)))
}

impl ConsumptionStore for LmdbConsumptionStore {
    fn is_consumed(&self, reference: &TxReference) -> Result<bool, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let found = self
            .consumed_db
            .get(&rtxn, reference.as_str())
            .map_err(LmdbError::from)?
            .is_some();
        Ok(found)
    }

    fn mark_if_absent(&self, reference: &TxReference, at: Timestamp) -> Result<bool, StoreError> {
        // LMDB admits one write transaction at a time, so the lookup and the
        // insert below cannot interleave with another writer.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .consumed_db
            .get(&wtxn, reference.as_str())
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Ok(false);
        }
        self.consumed_db
            .put(&mut wtxn, reference.as_str(), &at.as_secs().to_be_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        debug!(reference = %reference.short(), "reference marked consumed");
        Ok(true)
    }

    fn consumed_at(&self, reference: &TxReference) -> Result<Option<Timestamp>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .consumed_db
            .get(&rtxn, reference.as_str())
            .map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode_timestamp(reference.as_str(), bytes)?)),
            None => Ok(None),
        }
    }

    fn list_consumed(&self) -> Result<Vec<ConsumedEntry>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut entries = Vec::new();
        for item in self.consumed_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (key, bytes) = item.map_err(LmdbError::from)?;
            let reference = TxReference::parse(key)
                .map_err(|e| StoreError::Corruption(format!("stored key {key}: {e}")))?;
            let consumed_at = decode_timestamp(key, bytes)?;
            entries.push(ConsumedEntry {
                reference,
                consumed_at,
            });
        }
        entries.sort_by(|a, b| {
            a.consumed_at
                .cmp(&b.consumed_at)
                .then_with(|| a.reference.cmp(&b.reference))
        });
        Ok(entries)
    }

    fn consumed_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.consumed_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
