//! The verification engine.
//!
//! One call to [`VerificationEngine::verify`] walks a fixed sequence of
//! checks and stops at the first failure:
//!
//! 1. reference format (no I/O)
//! 2. consumption pre-check (no ledger call for known references), then
//!    the expected amount must be non-zero
//! 3. ledger fetch at confirmed commitment, bounded by a timeout
//! 4. through 8. record checks, see [`crate::rules`]
//! 9. atomic `mark_if_absent` in the consumption registry
//!
//! Only step 9 writes anything, and only when every check passed, so a
//! rejected reference can always be retried. Step 9 is the authority on
//! exactly-once crediting: when two calls for the same reference race past
//! step 2, only one of them wins the insert and the other is reported as
//! already used.

use std::sync::Arc;

use tracing::{debug, info, warn, Instrument};

use payproof_ledger::{Commitment, LedgerClient, LedgerError};
use payproof_store::ConsumptionStore;
use payproof_types::{AccountId, Lamports, Timestamp, TxReference};
use payproof_utils::spans::verify_span;
use payproof_utils::StatsCounter;

use crate::rules::{self, PaymentExpectation};
use crate::{
    Rejection, RejectionKind, VerificationError, VerificationRequest, VerificationResult,
    VerifiedPayment, VerifierConfig,
};

/// Commitment level every lookup uses. Never speculative.
pub const REQUIRED_COMMITMENT: Commitment = Commitment::Confirmed;

/// Counter name for accepted payments; rejections count under their kind code.
pub const VERIFIED_COUNTER: &str = "verified";

/// Verifies claimed payments against the ledger.
///
/// Holds no per-call state; share it behind an `Arc` and call `verify`
/// from as many tasks as needed.
pub struct VerificationEngine {
    ledger: Arc<dyn LedgerClient>,
    store: Arc<dyn ConsumptionStore>,
    config: VerifierConfig,
    stats: StatsCounter,
}

impl VerificationEngine {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        store: Arc<dyn ConsumptionStore>,
        config: VerifierConfig,
    ) -> Result<Self, VerificationError> {
        config.validate()?;
        let mut names = vec![VERIFIED_COUNTER];
        names.extend(RejectionKind::ALL.iter().map(|k| k.code()));
        Ok(Self {
            ledger,
            store,
            config,
            stats: StatsCounter::new(&names),
        })
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// The registry this engine commits to.
    pub fn store(&self) -> &Arc<dyn ConsumptionStore> {
        &self.store
    }

    /// Outcome counters since start-up.
    pub fn stats(&self) -> &StatsCounter {
        &self.stats
    }

    /// Decide whether `reference` is a genuine, unused payment of
    /// `expected_amount` to the configured recipient, optionally from
    /// `expected_sender`. Consumes the reference on success.
    pub async fn verify(
        &self,
        reference: &str,
        expected_amount: Lamports,
        expected_sender: Option<&AccountId>,
    ) -> VerificationResult {
        let span = verify_span(reference.get(..8).unwrap_or(reference));
        let result = self
            .run(reference, expected_amount, expected_sender)
            .instrument(span.clone())
            .await;

        span.in_scope(|| self.record_outcome(&result));
        result
    }

    pub async fn verify_request(&self, request: &VerificationRequest) -> VerificationResult {
        self.verify(
            &request.reference,
            request.expected_amount,
            request.expected_sender.as_ref(),
        )
        .await
    }

    fn record_outcome(&self, result: &VerificationResult) {
        match result {
            VerificationResult::Verified(payment) => {
                self.stats.increment(VERIFIED_COUNTER);
                info!(amount = %payment.amount, slot = payment.slot, "payment verified");
            }
            VerificationResult::Rejected(rejection) => {
                self.stats.increment(rejection.kind.code());
                match rejection.kind {
                    RejectionKind::Internal | RejectionKind::FetchFailed => {
                        warn!(kind = %rejection.kind, message = %rejection.message, "verification rejected")
                    }
                    _ => {
                        debug!(kind = %rejection.kind, message = %rejection.message, "verification rejected")
                    }
                }
            }
        }
    }

    async fn run(
        &self,
        raw_reference: &str,
        expected_amount: Lamports,
        expected_sender: Option<&AccountId>,
    ) -> VerificationResult {
        let reference = match TxReference::parse(raw_reference) {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "reference rejected before lookup");
                return Rejection::invalid_format().into();
            }
        };

        match self.store.is_consumed(&reference) {
            Ok(true) => return Rejection::already_used().into(),
            Ok(false) => {}
            Err(e) => return Rejection::internal(format!("registry lookup failed: {e}")).into(),
        }
        // Consumed references win over every other input.
        if expected_amount.is_zero() {
            return Rejection::invalid_amount().into();
        }

        let record = match self.fetch(&reference).await {
            Ok(record) => record,
            Err(rejection) => return rejection.into(),
        };

        let expectation = PaymentExpectation {
            recipient: &self.config.recipient,
            amount: expected_amount,
            sender: expected_sender,
            tolerance: self.config.tolerance,
        };
        let amount = match rules::evaluate(&record, &expectation) {
            Ok(amount) => amount,
            Err(rejection) => return rejection.into(),
        };

        match self.store.mark_if_absent(&reference, Timestamp::now()) {
            Ok(true) => VerificationResult::Verified(VerifiedPayment {
                reference,
                amount,
                recipient: self.config.recipient.clone(),
                timestamp: record.block_time,
                slot: record.slot,
            }),
            Ok(false) => {
                warn!("reference consumed by a concurrent verification");
                Rejection::already_used().into()
            }
            Err(e) => Rejection::internal(format!("registry update failed: {e}")).into(),
        }
    }

    /// Fetch the confirmed record, folding every failure into a rejection.
    async fn fetch(
        &self,
        reference: &TxReference,
    ) -> Result<payproof_types::TransactionRecord, Rejection> {
        let lookup = self
            .ledger
            .fetch_transaction(reference, REQUIRED_COMMITMENT);
        match tokio::time::timeout(self.config.fetch_timeout, lookup).await {
            Err(_) => {
                warn!(timeout = ?self.config.fetch_timeout, "ledger lookup timed out");
                Err(Rejection::pending())
            }
            Ok(Ok(record)) => Ok(record),
            Ok(Err(e)) => Err(Self::classify_fetch_error(e)),
        }
    }

    fn classify_fetch_error(e: LedgerError) -> Rejection {
        if e.is_pending() {
            Rejection::pending()
        } else if e.is_transport() {
            Rejection::fetch_failed(e)
        } else {
            Rejection::internal(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payproof_ledger::LedgerError;

    #[test]
    fn fetch_errors_map_to_categories() {
        let kind = |e| VerificationEngine::classify_fetch_error(e).kind;
        assert_eq!(kind(LedgerError::NotFound), RejectionKind::Pending);
        assert_eq!(kind(LedgerError::Timeout("t".into())), RejectionKind::Pending);
        assert_eq!(kind(LedgerError::Unreachable("u".into())), RejectionKind::FetchFailed);
        assert_eq!(kind(LedgerError::RequestFailed("r".into())), RejectionKind::FetchFailed);
        assert_eq!(
            kind(LedgerError::Rpc { code: -1, message: "m".into() }),
            RejectionKind::FetchFailed
        );
        assert_eq!(kind(LedgerError::InvalidResponse("i".into())), RejectionKind::Internal);
        assert_eq!(kind(LedgerError::Config("c".into())), RejectionKind::Internal);
    }
}
