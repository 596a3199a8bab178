use thiserror::Error;

/// Errors raised while assembling an engine. Verification itself never errors.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("fetch timeout must be greater than zero")]
    ZeroFetchTimeout,

    #[error("recipient account is empty")]
    EmptyRecipient,
}
