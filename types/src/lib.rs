//! Fundamental types for payment proof verification.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! transaction references, account identifiers, lamport amounts, timestamps,
//! cluster identifiers and the retrieved transaction record.

pub mod address;
pub mod amount;
pub mod error;
pub mod network;
pub mod record;
pub mod reference;
pub mod time;

pub use address::AccountId;
pub use amount::{Lamports, LAMPORTS_PER_SOL};
pub use error::TypesError;
pub use network::Cluster;
pub use record::TransactionRecord;
pub use reference::TxReference;
pub use time::Timestamp;
