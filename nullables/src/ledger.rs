//! Nullable ledger: scripted transaction lookups.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use payproof_ledger::{Commitment, LedgerClient, LedgerError};
use payproof_types::{TransactionRecord, TxReference};

/// What the null ledger answers for one reference.
#[derive(Clone, Debug)]
pub enum NullResponse {
    Record(TransactionRecord),
    NotFound,
    Timeout,
    Unreachable,
    Rpc { code: i64, message: String },
    InvalidResponse(String),
}

impl NullResponse {
    fn into_result(self) -> Result<TransactionRecord, LedgerError> {
        match self {
            Self::Record(record) => Ok(record),
            Self::NotFound => Err(LedgerError::NotFound),
            Self::Timeout => Err(LedgerError::Timeout("null ledger timeout".into())),
            Self::Unreachable => Err(LedgerError::Unreachable("null ledger offline".into())),
            Self::Rpc { code, message } => Err(LedgerError::Rpc { code, message }),
            Self::InvalidResponse(msg) => Err(LedgerError::InvalidResponse(msg)),
        }
    }
}

/// A ledger client that answers from a script instead of the network.
///
/// Unscripted references are reported as not found.
pub struct NullLedgerClient {
    responses: Mutex<HashMap<TxReference, NullResponse>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    calls_by_reference: Mutex<HashMap<TxReference, usize>>,
    commitments: Mutex<Vec<Commitment>>,
}

impl NullLedgerClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
            calls_by_reference: Mutex::new(HashMap::new()),
            commitments: Mutex::new(Vec::new()),
        }
    }

    /// Script the answer for `reference`.
    pub fn respond(&self, reference: &TxReference, response: NullResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(reference.clone(), response);
    }

    /// Script a record, keyed by its own reference.
    pub fn add_record(&self, record: TransactionRecord) {
        let reference = record.reference.clone();
        self.respond(&reference, NullResponse::Record(record));
    }

    /// Make every lookup wait `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Total lookups performed.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Lookups performed for one reference.
    pub fn calls_for(&self, reference: &TxReference) -> usize {
        self.calls_by_reference
            .lock()
            .unwrap()
            .get(reference)
            .copied()
            .unwrap_or(0)
    }

    /// Commitment levels requested, in call order.
    pub fn commitments(&self) -> Vec<Commitment> {
        self.commitments.lock().unwrap().clone()
    }
}

impl Default for NullLedgerClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for NullLedgerClient {
    async fn fetch_transaction(
        &self,
        reference: &TxReference,
        commitment: Commitment,
    ) -> Result<TransactionRecord, LedgerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .calls_by_reference
            .lock()
            .unwrap()
            .entry(reference.clone())
            .or_default() += 1;
        self.commitments.lock().unwrap().push(commitment);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(reference)
            .cloned()
            .unwrap_or(NullResponse::NotFound);
        response.into_result()
    }
}
