//! The retrieved ledger artifact for a reference.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Timestamp, TxReference};

/// A finalized transaction as reported by the ledger.
///
/// `pre_balances` and `post_balances` are parallel to `account_keys`, in
/// lamports. Read-only to this system.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub reference: TxReference,
    /// Slot the transaction landed in.
    pub slot: u64,
    /// On-chain error description, if the transaction failed.
    pub failed: Option<String>,
    /// All participating accounts, static keys first, then loaded addresses.
    pub account_keys: Vec<AccountId>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub block_time: Option<Timestamp>,
}

impl TransactionRecord {
    pub fn is_failed(&self) -> bool {
        self.failed.is_some()
    }

    /// Index of `account` among the participants.
    pub fn position_of(&self, account: &AccountId) -> Option<usize> {
        self.account_keys.iter().position(|k| k == account)
    }

    /// Signed balance change (post − pre) at `index`, in lamports.
    ///
    /// `None` when either balance array has no entry for `index`.
    pub fn balance_change(&self, index: usize) -> Option<i128> {
        let pre = *self.pre_balances.get(index)?;
        let post = *self.post_balances.get(index)?;
        Some(i128::from(post) - i128::from(pre))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord {
            reference: TxReference::parse(&"r".repeat(64)).unwrap(),
            slot: 7,
            failed: None,
            account_keys: vec![AccountId::new("payer"), AccountId::new("shop")],
            pre_balances: vec![5_000, 100],
            post_balances: vec![1_000, 3_100],
            block_time: None,
        }
    }

    #[test]
    fn balance_change_is_signed() {
        let r = record();
        assert_eq!(r.balance_change(0), Some(-4_000));
        assert_eq!(r.balance_change(1), Some(3_000));
    }

    #[test]
    fn balance_change_out_of_range() {
        let mut r = record();
        r.post_balances.pop();
        assert_eq!(r.balance_change(1), None);
        assert_eq!(r.balance_change(9), None);
    }

    #[test]
    fn position_of_participant() {
        let r = record();
        assert_eq!(r.position_of(&AccountId::new("shop")), Some(1));
        assert_eq!(r.position_of(&AccountId::new("nobody")), None);
    }
}
