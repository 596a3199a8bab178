//! Engine configuration.

use std::time::Duration;

use payproof_types::{AccountId, Lamports};

use crate::VerificationError;

/// The presale wallet that payments must reach.
pub const DEFAULT_RECIPIENT: &str = "946svTRVZa4KGU8NkvVSJwU9NkHdzr9Q5LFkhVHQUwdh";

/// Allowed slack between expected and observed amount (0.001 SOL).
pub const DEFAULT_TOLERANCE: Lamports = Lamports::new(1_000_000);

/// Upper bound on one ledger lookup.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct VerifierConfig {
    /// Account whose balance must increase.
    pub recipient: AccountId,
    /// Inclusive bound on `|transferred - expected|`.
    pub tolerance: Lamports,
    /// Lookups that take longer are reported as still processing.
    pub fetch_timeout: Duration,
}

impl VerifierConfig {
    pub fn new(recipient: AccountId) -> Self {
        Self {
            recipient,
            ..Self::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: Lamports) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.fetch_timeout.is_zero() {
            return Err(VerificationError::ZeroFetchTimeout);
        }
        if self.recipient.as_str().is_empty() {
            return Err(VerificationError::EmptyRecipient);
        }
        Ok(())
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            recipient: AccountId::new(DEFAULT_RECIPIENT),
            tolerance: DEFAULT_TOLERANCE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
