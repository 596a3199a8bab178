//! Consumption registry trait.

use payproof_types::{Timestamp, TxReference};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// One accepted reference and when it was accepted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedEntry {
    pub reference: TxReference,
    pub consumed_at: Timestamp,
}

/// The durable set of references that have already been credited.
///
/// Entries are only ever added. Implementations must be safe to call from
/// many verification tasks at once, and [`mark_if_absent`] must be atomic
/// per reference: of any number of concurrent calls for the same reference,
/// exactly one observes `true`.
///
/// [`mark_if_absent`]: ConsumptionStore::mark_if_absent
pub trait ConsumptionStore: Send + Sync {
    /// Whether `reference` has already been accepted.
    fn is_consumed(&self, reference: &TxReference) -> Result<bool, StoreError>;

    /// Record `reference` unless it is already present.
    ///
    /// Returns `true` if this call inserted it, `false` if it was already there.
    fn mark_if_absent(&self, reference: &TxReference, at: Timestamp) -> Result<bool, StoreError>;

    /// When `reference` was accepted, if it was.
    fn consumed_at(&self, reference: &TxReference) -> Result<Option<Timestamp>, StoreError>;

    /// All accepted references, oldest first.
    fn list_consumed(&self) -> Result<Vec<ConsumedEntry>, StoreError>;

    /// Number of accepted references.
    fn consumed_count(&self) -> Result<u64, StoreError>;

    /// Idempotent insert for callers that checked separately.
    ///
    /// Racy when paired with [`is_consumed`](ConsumptionStore::is_consumed);
    /// prefer [`mark_if_absent`](ConsumptionStore::mark_if_absent).
    fn mark_consumed(&self, reference: &TxReference, at: Timestamp) -> Result<(), StoreError> {
        self.mark_if_absent(reference, at).map(|_| ())
    }
}
