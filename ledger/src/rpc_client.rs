//! HTTP JSON-RPC implementation of [`LedgerClient`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, Instrument};

use payproof_types::{TransactionRecord, TxReference};

use crate::wire::{EncodedTransactionWithMeta, JsonRpcRequest, JsonRpcResponse};
use crate::{Commitment, LedgerClient, LedgerError};

/// Default timeout for a whole ledger request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Highest transaction version the verifier understands (legacy + v0).
const MAX_SUPPORTED_TRANSACTION_VERSION: u8 = 0;

/// Client for a ledger node's JSON-RPC read endpoint.
///
/// Holds a reusable connection pool; share one instance across all
/// verification calls.
pub struct RpcLedgerClient {
    endpoint: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    next_id: AtomicU64,
}

impl RpcLedgerClient {
    /// Create a client with the default timeout.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, LedgerError> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LedgerError> {
        let endpoint = endpoint.into();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(LedgerError::Config(format!(
                "endpoint must be an http(s) URL, got '{endpoint}'"
            )));
        }
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| LedgerError::Config(e.to_string()))?;
        Ok(Self {
            endpoint,
            http_client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Ask the node whether it is healthy (`getHealth`).
    pub async fn health(&self) -> Result<(), LedgerError> {
        let status: Option<String> = self.call("getHealth", json!([])).await?;
        match status.as_deref() {
            Some("ok") => Ok(()),
            other => Err(LedgerError::InvalidResponse(format!(
                "unexpected health status {other:?}"
            ))),
        }
    }

    /// Issue one JSON-RPC call. `Ok(None)` means the node answered `null`.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        params: serde_json::Value,
    ) -> Result<Option<T>, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LedgerError::RequestFailed(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body: JsonRpcResponse<T> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LedgerError::Timeout(e.to_string())
            } else {
                LedgerError::InvalidResponse(format!("failed to parse {method} response: {e}"))
            }
        })?;

        if let Some(err) = body.error {
            return Err(err.into_ledger_error());
        }
        Ok(body.result)
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn fetch_transaction(
        &self,
        reference: &TxReference,
        commitment: Commitment,
    ) -> Result<TransactionRecord, LedgerError> {
        let params = json!([
            reference.as_str(),
            {
                "commitment": commitment.as_str(),
                "maxSupportedTransactionVersion": MAX_SUPPORTED_TRANSACTION_VERSION,
                "encoding": "json",
            }
        ]);

        let span = payproof_utils::spans::ledger_fetch_span("getTransaction", reference.short());
        async {
            let tx: Option<EncodedTransactionWithMeta> =
                self.call("getTransaction", params).await?;
            let tx = tx.ok_or(LedgerError::NotFound)?;
            debug!(slot = tx.slot, "transaction fetched");
            tx.into_record(reference.clone())
        }
        .instrument(span)
        .await
    }
}
