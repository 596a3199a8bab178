//! Payment verification.
//!
//! Given a claimed ledger payment (a transaction reference, the amount the
//! payer says they sent and optionally who sent it), decide whether a real,
//! confirmed, matching payment to the configured recipient exists, and make
//! sure the same payment is never credited twice.
//!
//! The [`VerificationEngine`] never fails with an error: every outcome,
//! including transport trouble, comes back as a [`VerificationResult`].

pub mod config;
pub mod engine;
pub mod error;
pub mod outcomes;
pub mod rules;

pub use config::{VerifierConfig, DEFAULT_RECIPIENT, DEFAULT_TOLERANCE};
pub use engine::{VerificationEngine, REQUIRED_COMMITMENT, VERIFIED_COUNTER};
pub use error::VerificationError;
pub use outcomes::{
    Rejection, RejectionKind, VerificationRequest, VerificationResult, VerifiedPayment,
};
