//! Checks applied to a fetched transaction record.
//!
//! These are the ledger-independent steps of a verification: failure flag,
//! recipient presence, amount computation, sender presence and amount
//! match, evaluated in that order and stopping at the first failure.

use payproof_types::{AccountId, Lamports, TransactionRecord};

use crate::Rejection;

/// What the caller claims about the payment.
#[derive(Clone, Debug)]
pub struct PaymentExpectation<'a> {
    pub recipient: &'a AccountId,
    pub amount: Lamports,
    pub sender: Option<&'a AccountId>,
    pub tolerance: Lamports,
}

/// Run every record check; on success return the lamports the recipient received.
pub fn evaluate(
    record: &TransactionRecord,
    expect: &PaymentExpectation<'_>,
) -> Result<Lamports, Rejection> {
    if record.is_failed() {
        return Err(Rejection::failed_on_chain());
    }

    let recipient_index = record
        .position_of(expect.recipient)
        .ok_or_else(Rejection::wrong_recipient)?;

    let change = record.balance_change(recipient_index).ok_or_else(|| {
        Rejection::internal(format!(
            "no balance entry for recipient at index {recipient_index}"
        ))
    })?;

    if let Some(sender) = expect.sender {
        if record.position_of(sender).is_none() {
            return Err(Rejection::sender_mismatch());
        }
    }

    amount_within_tolerance(change, expect.amount, expect.tolerance)
}

/// Compare a signed balance change against the expected amount.
///
/// The bound is inclusive. A change that is not a strict increase never
/// matches, whatever the tolerance.
pub fn amount_within_tolerance(
    change: i128,
    expected: Lamports,
    tolerance: Lamports,
) -> Result<Lamports, Rejection> {
    let transferred = match u64::try_from(change) {
        Ok(raw) if raw > 0 => Lamports::new(raw),
        _ => {
            return Err(Rejection::new(
                crate::RejectionKind::AmountMismatch,
                format!(
                    "recipient balance did not increase (change of {change} lamports); expected {expected}"
                ),
            ))
        }
    };

    if transferred.abs_diff(expected) > tolerance {
        return Err(Rejection::new(
            crate::RejectionKind::AmountMismatch,
            format!(
                "amount transferred ({transferred}) does not match expected amount ({expected})"
            ),
        ));
    }
    Ok(transferred)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RejectionKind;
    use payproof_nullables::TestRecord;
    use payproof_types::{TxReference, LAMPORTS_PER_SOL};

    const TOLERANCE: Lamports = Lamports::new(1_000_000);

    fn shop() -> AccountId {
        AccountId::new("shop")
    }

    fn payer() -> AccountId {
        AccountId::new("payer")
    }

    fn reference() -> TxReference {
        TxReference::parse(&"4".repeat(87)).unwrap()
    }

    fn payment(lamports: u64) -> TransactionRecord {
        TestRecord::payment(reference(), &payer(), &shop(), lamports).build()
    }

    fn expect<'a>(recipient: &'a AccountId, amount: u64, sender: Option<&'a AccountId>) -> PaymentExpectation<'a> {
        PaymentExpectation {
            recipient,
            amount: Lamports::new(amount),
            sender,
            tolerance: TOLERANCE,
        }
    }

    #[test]
    fn exact_payment_passes() {
        let shop = shop();
        let got = evaluate(&payment(LAMPORTS_PER_SOL), &expect(&shop, LAMPORTS_PER_SOL, None));
        assert_eq!(got, Ok(Lamports::new(LAMPORTS_PER_SOL)));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let expected = Lamports::new(LAMPORTS_PER_SOL);
        let at_bound = i128::from(LAMPORTS_PER_SOL + TOLERANCE.raw());
        let below_bound = i128::from(LAMPORTS_PER_SOL - TOLERANCE.raw());
        assert!(amount_within_tolerance(at_bound, expected, TOLERANCE).is_ok());
        assert!(amount_within_tolerance(below_bound, expected, TOLERANCE).is_ok());
        assert!(amount_within_tolerance(at_bound + 1, expected, TOLERANCE).is_err());
        assert!(amount_within_tolerance(below_bound - 1, expected, TOLERANCE).is_err());
    }

    #[test]
    fn mismatch_message_states_both_amounts() {
        let err = amount_within_tolerance(
            i128::from(LAMPORTS_PER_SOL / 2),
            Lamports::new(LAMPORTS_PER_SOL),
            TOLERANCE,
        )
        .unwrap_err();
        assert_eq!(err.kind, RejectionKind::AmountMismatch);
        assert!(err.message.contains("0.5 SOL"), "{}", err.message);
        assert!(err.message.contains("1 SOL"), "{}", err.message);
    }

    #[test]
    fn decrease_never_matches() {
        // Even when the tolerance would cover the gap.
        let err = amount_within_tolerance(-10, Lamports::new(5), TOLERANCE).unwrap_err();
        assert_eq!(err.kind, RejectionKind::AmountMismatch);
        let err = amount_within_tolerance(0, Lamports::new(5), TOLERANCE).unwrap_err();
        assert_eq!(err.kind, RejectionKind::AmountMismatch);
    }

    #[test]
    fn failure_flag_wins_over_balances() {
        let record = TestRecord::payment(reference(), &payer(), &shop(), LAMPORTS_PER_SOL)
            .failed("InstructionError")
            .build();
        let shop = shop();
        let err = evaluate(&record, &expect(&shop, LAMPORTS_PER_SOL, None)).unwrap_err();
        assert_eq!(err, Rejection::failed_on_chain());
    }

    #[test]
    fn missing_recipient() {
        let elsewhere = AccountId::new("elsewhere");
        let err = evaluate(&payment(LAMPORTS_PER_SOL), &expect(&elsewhere, LAMPORTS_PER_SOL, None))
            .unwrap_err();
        assert_eq!(err, Rejection::wrong_recipient());
    }

    #[test]
    fn sender_must_participate() {
        let shop = shop();
        let stranger = AccountId::new("stranger");
        let err = evaluate(
            &payment(LAMPORTS_PER_SOL),
            &expect(&shop, LAMPORTS_PER_SOL, Some(&stranger)),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::sender_mismatch());

        let payer = payer();
        assert!(evaluate(
            &payment(LAMPORTS_PER_SOL),
            &expect(&shop, LAMPORTS_PER_SOL, Some(&payer)),
        )
        .is_ok());
    }

    #[test]
    fn short_balance_arrays_are_internal() {
        let mut record = payment(LAMPORTS_PER_SOL);
        record.post_balances.truncate(1);
        let shop = shop();
        let err = evaluate(&record, &expect(&shop, LAMPORTS_PER_SOL, None)).unwrap_err();
        assert_eq!(err.kind, RejectionKind::Internal);
    }
}
