//! Verification outcomes.
//!
//! A verification either yields a [`VerifiedPayment`] or a [`Rejection`].
//! Rejections carry a machine-readable [`RejectionKind`] alongside the
//! user-presentable message, so callers can tell "already used" and "still
//! processing" apart from hard failures.

use payproof_types::{AccountId, Lamports, Timestamp, TxReference};
use serde::Serialize;
use std::fmt;

/// A claimed payment awaiting verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationRequest {
    /// Raw reference as supplied by the caller; validated by the engine.
    pub reference: String,
    pub expected_amount: Lamports,
    pub expected_sender: Option<AccountId>,
}

/// A payment that passed every check and has now been consumed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerifiedPayment {
    pub reference: TxReference,
    /// Lamports the recipient's balance increased by.
    pub amount: Lamports,
    pub recipient: AccountId,
    /// Ledger block time, when the node reported one.
    pub timestamp: Option<Timestamp>,
    pub slot: u64,
}

/// Why a verification was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// The reference is malformed; no lookup was made.
    InvalidFormat,
    /// The expected amount is not a positive number.
    InvalidAmount,
    /// The reference was credited before.
    AlreadyUsed,
    /// The ledger has no confirmed record yet (or the lookup timed out).
    Pending,
    /// The ledger could not be reached or refused the request.
    FetchFailed,
    /// The ledger marked the transaction as failed.
    FailedOnChain,
    /// The configured recipient does not take part in the transaction.
    WrongRecipient,
    /// The expected sender does not take part in the transaction.
    SenderMismatch,
    /// The transferred amount is outside tolerance.
    AmountMismatch,
    /// Malformed ledger data or a registry failure.
    Internal,
}

impl RejectionKind {
    pub const ALL: [RejectionKind; 10] = [
        Self::InvalidFormat,
        Self::InvalidAmount,
        Self::AlreadyUsed,
        Self::Pending,
        Self::FetchFailed,
        Self::FailedOnChain,
        Self::WrongRecipient,
        Self::SenderMismatch,
        Self::AmountMismatch,
        Self::Internal,
    ];

    /// Stable identifier for API consumers and counters.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "invalid_format",
            Self::InvalidAmount => "invalid_amount",
            Self::AlreadyUsed => "already_used",
            Self::Pending => "pending",
            Self::FetchFailed => "fetch_failed",
            Self::FailedOnChain => "failed_on_chain",
            Self::WrongRecipient => "wrong_recipient",
            Self::SenderMismatch => "sender_mismatch",
            Self::AmountMismatch => "amount_mismatch",
            Self::Internal => "internal",
        }
    }

    /// Whether submitting the same reference again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Pending | Self::FetchFailed)
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_format() -> Self {
        Self::new(RejectionKind::InvalidFormat, "invalid format")
    }

    pub fn invalid_amount() -> Self {
        Self::new(
            RejectionKind::InvalidAmount,
            "expected amount must be a positive number",
        )
    }

    pub fn already_used() -> Self {
        Self::new(RejectionKind::AlreadyUsed, "already used")
    }

    pub fn pending() -> Self {
        Self::new(
            RejectionKind::Pending,
            "transaction not found or still processing; try again in a few moments",
        )
    }

    pub fn fetch_failed(detail: impl fmt::Display) -> Self {
        Self::new(
            RejectionKind::FetchFailed,
            format!("failed to fetch transaction: {detail}"),
        )
    }

    pub fn failed_on_chain() -> Self {
        Self::new(RejectionKind::FailedOnChain, "transaction failed on-chain")
    }

    pub fn wrong_recipient() -> Self {
        Self::new(RejectionKind::WrongRecipient, "not sent to expected recipient")
    }

    pub fn sender_mismatch() -> Self {
        Self::new(RejectionKind::SenderMismatch, "sender mismatch")
    }

    pub fn internal(detail: impl fmt::Display) -> Self {
        Self::new(RejectionKind::Internal, format!("internal error: {detail}"))
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

/// The outcome of one verification call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationResult {
    Verified(VerifiedPayment),
    Rejected(Rejection),
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }

    pub fn payment(&self) -> Option<&VerifiedPayment> {
        match self {
            Self::Verified(p) => Some(p),
            Self::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Verified(_) => None,
            Self::Rejected(r) => Some(r),
        }
    }

    /// Kind of rejection, or `None` when verified.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        self.rejection().map(|r| r.kind)
    }
}

impl From<Rejection> for VerificationResult {
    fn from(r: Rejection) -> Self {
        Self::Rejected(r)
    }
}
