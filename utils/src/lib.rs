//! Shared utilities for the payment proof verifier.

pub mod logging;
pub mod spans;
pub mod stats;

pub use logging::{init_logging, LogFormat};
pub use stats::StatsCounter;
