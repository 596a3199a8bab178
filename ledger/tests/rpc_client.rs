//! Exercises `RpcLedgerClient` against a loopback JSON-RPC node.
//!
//! The fake node answers `getTransaction` according to the first character
//! of the requested signature, so each test can pick its scenario.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use payproof_ledger::{Commitment, LedgerClient, LedgerError, RpcLedgerClient};
use payproof_types::{AccountId, TxReference};

fn reference(c: char) -> TxReference {
    TxReference::parse(&c.to_string().repeat(88)).unwrap()
}

async fn fake_node(Json(req): Json<Value>) -> Response {
    let id = req["id"].clone();
    let method = req["method"].as_str().unwrap_or_default().to_string();
    if method == "getHealth" {
        return Json(json!({"jsonrpc": "2.0", "id": id, "result": "ok"})).into_response();
    }

    // Requests must always ask for confirmed data and the v0 encoding ceiling.
    let opts = &req["params"][1];
    assert_eq!(opts["commitment"], "confirmed");
    assert_eq!(opts["maxSupportedTransactionVersion"], 0);

    let signature = req["params"][0].as_str().unwrap_or_default();
    match signature.chars().next() {
        Some('1') => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "result": {
                "slot": 42,
                "blockTime": 1_700_000_000,
                "meta": {
                    "err": null,
                    "preBalances": [3_000_000_000u64, 500],
                    "postBalances": [1_999_995_000u64, 1_000_000_500u64],
                },
                "transaction": { "message": { "accountKeys": ["payer", "shop"] } }
            }
        }))
        .into_response(),
        Some('2') => Json(json!({"jsonrpc": "2.0", "id": id, "result": null})).into_response(),
        Some('3') => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32602, "message": "Invalid param: WrongSize"}
        }))
        .into_response(),
        Some('4') => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"jsonrpc": "2.0", "id": id, "result": null})).into_response()
        }
        Some('5') => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        Some('6') => "definitely not json".into_response(),
        _ => Json(json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32005, "message": "Node is unhealthy"}
        }))
        .into_response(),
    }
}

async fn spawn_fake_node() -> String {
    let app = Router::new().route("/", post(fake_node));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetches_confirmed_transaction() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();

    let record = client
        .fetch_transaction(&reference('1'), Commitment::Confirmed)
        .await
        .unwrap();

    assert_eq!(record.slot, 42);
    assert_eq!(record.position_of(&AccountId::new("shop")), Some(1));
    assert_eq!(record.balance_change(1), Some(1_000_000_000));
    assert!(!record.is_failed());
}

#[tokio::test]
async fn null_result_is_not_found() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    let err = client
        .fetch_transaction(&reference('2'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound));
}

#[tokio::test]
async fn wrong_size_is_not_found() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    let err = client
        .fetch_transaction(&reference('3'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(err.is_pending());
}

#[tokio::test]
async fn slow_node_times_out() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::with_timeout(url, Duration::from_millis(200)).unwrap();
    let err = client
        .fetch_transaction(&reference('4'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Timeout(_)), "got {err:?}");
}

#[tokio::test]
async fn http_error_status_is_request_failure() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    let err = client
        .fetch_transaction(&reference('5'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::RequestFailed(_)), "got {err:?}");
}

#[tokio::test]
async fn garbage_body_is_invalid_response() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    let err = client
        .fetch_transaction(&reference('6'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn other_rpc_errors_keep_code() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    let err = client
        .fetch_transaction(&reference('9'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::Rpc { code: -32005, .. }), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint() {
    // Bind and drop to obtain a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RpcLedgerClient::new(format!("http://{addr}")).unwrap();
    let err = client
        .fetch_transaction(&reference('1'), Commitment::Confirmed)
        .await
        .unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}

#[tokio::test]
async fn health_check() {
    let url = spawn_fake_node().await;
    let client = RpcLedgerClient::new(url).unwrap();
    client.health().await.unwrap();
}
