//! RPC request handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, Instrument};

use payproof_store::ConsumptionStore;
use payproof_types::{AccountId, Lamports, TxReference};
use payproof_utils::spans::rpc_span;
use payproof_verification::{
    Rejection, RejectionKind, VerificationRequest, VerificationResult, VerifiedPayment,
};

use crate::error::RpcError;
use crate::state::AppState;

const MISSING_PARAMETERS: &str = "Missing required parameters";

// ── Verify ───────────────────────────────────────────────────────────────

/// Body of `POST /api/verify-transaction`.
///
/// Field names follow the public web client; the older `transactionId` and
/// `senderAddress` spellings are still accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyTransactionBody {
    #[serde(alias = "transactionId")]
    pub reference: Option<String>,
    /// SOL, as a JSON number or a numeric string.
    pub expected_amount: Option<Value>,
    #[serde(alias = "senderAddress")]
    pub expected_sender: Option<String>,
}

/// Why a body could not be turned into a [`VerificationRequest`].
#[derive(Debug, PartialEq, Eq)]
pub enum BodyError {
    Missing,
    NonPositiveAmount,
}

impl VerifyTransactionBody {
    pub fn into_request(self) -> Result<VerificationRequest, BodyError> {
        let reference = self
            .reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or(BodyError::Missing)?;
        let sol = self
            .expected_amount
            .as_ref()
            .and_then(parse_sol)
            .ok_or(BodyError::Missing)?;
        let expected_amount = Lamports::from_sol(sol).ok_or(BodyError::NonPositiveAmount)?;
        let expected_sender = self
            .expected_sender
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(AccountId::new);
        Ok(VerificationRequest {
            reference,
            expected_amount,
            expected_sender,
        })
    }
}

fn parse_sol(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedData {
    pub reference: String,
    /// SOL received by the recipient.
    pub amount: f64,
    pub recipient: String,
    /// RFC 3339 block time, when known.
    pub timestamp: Option<String>,
    pub slot: u64,
}

impl From<&VerifiedPayment> for VerifiedData {
    fn from(payment: &VerifiedPayment) -> Self {
        Self {
            reference: payment.reference.to_string(),
            amount: payment.amount.as_sol(),
            recipient: payment.recipient.to_string(),
            timestamp: payment.timestamp.map(|t| t.to_rfc3339()),
            slot: payment.slot,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifySuccess {
    pub success: bool,
    pub message: &'static str,
    pub data: VerifiedData,
}

#[derive(Debug, Serialize)]
pub struct VerifyFailure {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub retryable: bool,
}

/// HTTP status for a rejection.
///
/// Retryable outcomes use 202 so clients poll instead of giving up.
pub fn status_for(kind: RejectionKind) -> StatusCode {
    match kind {
        RejectionKind::AlreadyUsed => StatusCode::CONFLICT,
        RejectionKind::Pending | RejectionKind::FetchFailed => StatusCode::ACCEPTED,
        RejectionKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn rejection_response(rejection: &Rejection) -> Response {
    let body = VerifyFailure {
        success: false,
        error: rejection.message.clone(),
        code: rejection.kind.code(),
        retryable: rejection.kind.is_retryable(),
    };
    (status_for(rejection.kind), Json(body)).into_response()
}

/// `POST /api/verify-transaction`
pub async fn verify_transaction(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifyTransactionBody>, JsonRejection>,
) -> Response {
    async move {
        let body = match body {
            Ok(Json(body)) => body,
            Err(e) => {
                debug!(error = %e, "unreadable verify body");
                return RpcError::InvalidRequest(MISSING_PARAMETERS.into()).into_response();
            }
        };
        let request = match body.into_request() {
            Ok(request) => request,
            Err(BodyError::Missing) => {
                return RpcError::InvalidRequest(MISSING_PARAMETERS.into()).into_response()
            }
            Err(BodyError::NonPositiveAmount) => {
                return rejection_response(&Rejection::invalid_amount())
            }
        };

        match state.engine.verify_request(&request).await {
            VerificationResult::Verified(payment) => Json(VerifySuccess {
                success: true,
                message: "Transaction verified successfully",
                data: VerifiedData::from(&payment),
            })
            .into_response(),
            VerificationResult::Rejected(rejection) => rejection_response(&rejection),
        }
    }
    .instrument(rpc_span("verify_transaction"))
    .await
}

// ── Check ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub success: bool,
    pub is_used: bool,
}

/// `GET /api/check-transaction?id=<reference>`
pub async fn check_transaction(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, RpcError> {
    async move {
        let id = query
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| RpcError::InvalidRequest("Missing transaction ID".into()))?;
        // A malformed reference can never have been consumed.
        let is_used = match TxReference::parse(&id) {
            Ok(reference) => state.store().is_consumed(&reference)?,
            Err(_) => false,
        };
        Ok::<_, RpcError>(Json(CheckResponse {
            success: true,
            is_used,
        }))
    }
    .instrument(rpc_span("check_transaction"))
    .await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedTransactionsResponse {
    pub success: bool,
    pub count: usize,
    /// Consumed references, oldest first.
    pub used_transactions: Vec<String>,
}

/// `POST /api/check-transaction`
pub async fn list_used_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UsedTransactionsResponse>, RpcError> {
    async move {
        let used_transactions: Vec<String> = state
            .store()
            .list_consumed()?
            .into_iter()
            .map(|entry| entry.reference.to_string())
            .collect();
        Ok::<_, RpcError>(Json(UsedTransactionsResponse {
            success: true,
            count: used_transactions.len(),
            used_transactions,
        }))
    }
    .instrument(rpc_span("list_used_transactions"))
    .await
}

// ── Stats ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    pub consumed: u64,
    pub outcomes: BTreeMap<&'static str, u64>,
    pub recipient: String,
    pub uptime_secs: u64,
}

/// `GET /api/stats`
pub async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, RpcError> {
    Ok(Json(StatsResponse {
        success: true,
        consumed: state.store().consumed_count()?,
        outcomes: state.engine.stats().snapshot(),
        recipient: state.engine.config().recipient.to_string(),
        uptime_secs: state.started_at.elapsed().as_secs(),
    }))
}

// ── Health ───────────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
