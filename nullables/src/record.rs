//! Builder for synthetic transaction records.

use payproof_types::{AccountId, Timestamp, TransactionRecord, TxReference};

/// Network fee charged to the payer in generated records.
pub const TEST_FEE: u64 = 5_000;

/// Starting balance of every generated account.
const OPENING_BALANCE: u64 = 50_000_000_000;

/// Builds [`TransactionRecord`]s describing simple transfers.
pub struct TestRecord {
    reference: TxReference,
    slot: u64,
    failed: Option<String>,
    accounts: Vec<(AccountId, u64, u64)>,
    block_time: Option<Timestamp>,
}

impl TestRecord {
    /// An empty record for `reference`.
    pub fn new(reference: TxReference) -> Self {
        Self {
            reference,
            slot: 1,
            failed: None,
            accounts: Vec::new(),
            block_time: Some(Timestamp::new(1_700_000_000)),
        }
    }

    /// A transfer of `lamports` from `payer` to `recipient`, plus the system program.
    pub fn payment(
        reference: TxReference,
        payer: &AccountId,
        recipient: &AccountId,
        lamports: u64,
    ) -> Self {
        Self::new(reference)
            .account(
                payer.clone(),
                OPENING_BALANCE,
                OPENING_BALANCE - lamports - TEST_FEE,
            )
            .account(recipient.clone(), OPENING_BALANCE, OPENING_BALANCE + lamports)
            .account(AccountId::new("11111111111111111111111111111111"), 1, 1)
    }

    /// Append a participant with its balances before and after.
    pub fn account(mut self, id: AccountId, pre: u64, post: u64) -> Self {
        self.accounts.push((id, pre, post));
        self
    }

    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.failed = Some(reason.into());
        self
    }

    pub fn block_time(mut self, time: Option<Timestamp>) -> Self {
        self.block_time = time;
        self
    }

    pub fn slot(mut self, slot: u64) -> Self {
        self.slot = slot;
        self
    }

    pub fn build(self) -> TransactionRecord {
        let (account_keys, (pre_balances, post_balances)) = self
            .accounts
            .into_iter()
            .map(|(id, pre, post)| (id, (pre, post)))
            .unzip();
        TransactionRecord {
            reference: self.reference,
            slot: self.slot,
            failed: self.failed,
            account_keys,
            pre_balances,
            post_balances,
            block_time: self.block_time,
        }
    }
}
