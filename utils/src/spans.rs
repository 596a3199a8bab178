//! Pre-built [`tracing::Span`] constructors.
//!
//! Consistent span names and field sets make it easy to correlate one
//! verification across the engine, the ledger client and the HTTP layer.

use tracing::{info_span, Span};

/// Span covering one verification call for a reference.
pub fn verify_span(reference: &str) -> Span {
    info_span!("verify", reference = %reference)
}

/// Span covering a single ledger RPC round-trip.
pub fn ledger_fetch_span(method: &str, reference: &str) -> Span {
    info_span!("ledger_fetch", method = %method, reference = %reference)
}

/// Span covering a single inbound HTTP action.
pub fn rpc_span(action: &str) -> Span {
    info_span!("rpc", action = %action)
}
