//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the verifier (the ledger RPC node and the
//! consumption registry) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return scripted, deterministic results
//! - Count how often they were called
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod ledger;
pub mod record;
pub mod store;

pub use ledger::{NullLedgerClient, NullResponse};
pub use record::TestRecord;
pub use store::NullConsumptionStore;
