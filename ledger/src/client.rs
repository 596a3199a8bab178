//! The seam between the verification engine and the ledger transport.

use async_trait::async_trait;
use payproof_types::{TransactionRecord, TxReference};

use crate::{Commitment, LedgerError};

/// Read access to finalized ledger transactions.
///
/// Implementations must be side-effect free: the same request may be issued
/// any number of times.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the record for `reference` as seen at `commitment`.
    ///
    /// Returns [`LedgerError::NotFound`] when the ledger has no record yet.
    async fn fetch_transaction(
        &self,
        reference: &TxReference,
        commitment: Commitment,
    ) -> Result<TransactionRecord, LedgerError>;
}
