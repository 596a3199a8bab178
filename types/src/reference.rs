//! Transaction reference (signature) type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// An opaque reference naming a single ledger transaction.
///
/// Solana signatures are 64 bytes encoded in base58, which yields strings of
/// 87 or 88 characters; the accepted envelope is kept wider to tolerate other
/// encodings of the same identifier. Anything outside it is rejected before
/// any network call is made.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TxReference(String);

impl TxReference {
    /// Shortest accepted reference, in characters.
    pub const MIN_LEN: usize = 43;
    /// Longest accepted reference, in characters.
    pub const MAX_LEN: usize = 88;

    /// Validate and wrap a raw reference string.
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let len = raw.chars().count();
        if raw.is_empty() || !(Self::MIN_LEN..=Self::MAX_LEN).contains(&len) {
            return Err(TypesError::InvalidReference(format!(
                "length {len} outside [{}, {}]",
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for log lines.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }
}

impl TryFrom<String> for TxReference {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TxReference> for String {
    fn from(r: TxReference) -> Self {
        r.0
    }
}

impl fmt::Display for TxReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
