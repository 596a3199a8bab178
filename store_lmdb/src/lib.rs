//! LMDB storage backend for the consumption registry.
//!
//! Implements [`payproof_store::ConsumptionStore`] using the `heed` LMDB
//! bindings. All databases live in a single environment.

pub mod consumption;
pub mod environment;
pub mod error;

pub use consumption::LmdbConsumptionStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
