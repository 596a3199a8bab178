use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transaction not found or still processing")]
    NotFound,

    #[error("ledger request timed out: {0}")]
    Timeout(String),

    #[error("ledger endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("ledger request failed: {0}")]
    RequestFailed(String),

    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("invalid response from ledger: {0}")]
    InvalidResponse(String),

    #[error("ledger client misconfigured: {0}")]
    Config(String),
}

impl LedgerError {
    /// Whether the ledger may simply not have the record yet.
    ///
    /// These failures are safe to retry later with the same reference.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::NotFound | Self::Timeout(_))
    }

    /// Whether the failure lies in the transport rather than the response.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::RequestFailed(_) | Self::Rpc { .. }
        )
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LedgerError::Timeout(e.to_string())
        } else if e.is_connect() {
            LedgerError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            LedgerError::InvalidResponse(e.to_string())
        } else if e.is_builder() {
            LedgerError::Config(e.to_string())
        } else {
            LedgerError::RequestFailed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_category() {
        assert!(LedgerError::NotFound.is_pending());
        assert!(LedgerError::Timeout("slow node".into()).is_pending());
        assert!(!LedgerError::InvalidResponse("x".into()).is_pending());
        assert!(!LedgerError::Rpc { code: -32000, message: "x".into() }.is_pending());
    }

    #[test]
    fn transport_category() {
        assert!(LedgerError::Unreachable("x".into()).is_transport());
        assert!(!LedgerError::NotFound.is_transport());
        assert!(!LedgerError::InvalidResponse("x".into()).is_transport());
    }
}
