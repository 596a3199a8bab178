//! Ledger account identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A ledger account identifier (base58-encoded public key on Solana).
///
/// Compared byte-for-byte: the ledger never normalises account keys, so
/// neither do we.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypesError::InvalidAccount("empty".into()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        let id: AccountId = "  946svTRVZa4KGU8NkvVSJwU9NkHdzr9Q5LFkhVHQUwdh ".parse().unwrap();
        assert_eq!(id.as_str(), "946svTRVZa4KGU8NkvVSJwU9NkHdzr9Q5LFkhVHQUwdh");
    }

    #[test]
    fn parse_rejects_blank() {
        assert!("   ".parse::<AccountId>().is_err());
    }
}
