//! HTTP API for the payment verifier.
//!
//! Provides endpoints for:
//! - Verifying a claimed payment (`POST /api/verify-transaction`)
//! - Checking whether a reference has been consumed (`GET /api/check-transaction`)
//! - Listing consumed references (`POST /api/check-transaction`)
//! - Outcome counters (`GET /api/stats`)
//! - Liveness (`GET /health`)

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::RpcError;
pub use server::{router, RpcServer};
pub use state::AppState;
