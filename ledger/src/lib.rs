//! Ledger query client.
//!
//! Retrieves a finalized transaction record by reference from the ledger's
//! read RPC endpoint. The client is a leaf: it owns no state beyond a pooled
//! HTTP connection and performs no retries. Fetching is idempotent, so a
//! caller may simply repeat a request that failed in transport.

pub mod client;
pub mod commitment;
pub mod error;
pub mod rpc_client;
pub mod wire;

pub use client::LedgerClient;
pub use commitment::Commitment;
pub use error::LedgerError;
pub use rpc_client::RpcLedgerClient;
