//! Ledger commitment levels.

use serde::{Deserialize, Serialize};

/// How finalized the queried ledger state must be.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    /// Seen by the connected node; may be rolled back.
    Processed,
    /// Voted on by a supermajority of the cluster.
    Confirmed,
    /// Rooted; cannot be rolled back.
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}
