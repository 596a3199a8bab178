//! Consumption registry contract.
//!
//! Every storage backend (LMDB, in-memory for testing) implements
//! [`ConsumptionStore`]. The verification engine depends only on the trait.

pub mod consumption;
pub mod error;

pub use consumption::{ConsumedEntry, ConsumptionStore};
pub use error::StoreError;
