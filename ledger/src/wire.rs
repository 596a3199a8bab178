//! JSON-RPC 2.0 envelope and `getTransaction` payload types.
//!
//! Only the fields the verifier reads are modelled; everything else in the
//! ledger's response is ignored by serde.

use payproof_types::{AccountId, Timestamp, TransactionRecord, TxReference};
use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Substrings of RPC error messages that mean "no such transaction yet".
const NOT_FOUND_MARKERS: &[&str] = &["WrongSize", "failed to get transaction"];

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: &'static str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default = "Option::default")]
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
}

impl JsonRpcErrorObject {
    /// Classify an RPC-level error, folding "not found" variants together.
    pub fn into_ledger_error(self) -> LedgerError {
        if NOT_FOUND_MARKERS.iter().any(|m| self.message.contains(m)) {
            LedgerError::NotFound
        } else {
            LedgerError::Rpc {
                code: self.code,
                message: self.message,
            }
        }
    }
}

/// `getTransaction` result with `"encoding": "json"`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedTransactionWithMeta {
    pub slot: u64,
    #[serde(default)]
    pub block_time: Option<i64>,
    #[serde(default)]
    pub meta: Option<TransactionMeta>,
    pub transaction: EncodedTransaction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionMeta {
    #[serde(default)]
    pub err: Option<serde_json::Value>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    #[serde(default)]
    pub loaded_addresses: Option<LoadedAddresses>,
}

/// Accounts pulled in through address lookup tables (versioned transactions).
#[derive(Debug, Default, Deserialize)]
pub struct LoadedAddresses {
    #[serde(default)]
    pub writable: Vec<String>,
    #[serde(default)]
    pub readonly: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EncodedTransaction {
    pub message: EncodedMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedMessage {
    pub account_keys: Vec<String>,
}

impl EncodedTransactionWithMeta {
    /// Flatten the wire payload into a [`TransactionRecord`].
    ///
    /// Participants are the static account keys followed by writable, then
    /// read-only loaded addresses; this is the order the balance arrays use.
    pub fn into_record(self, reference: TxReference) -> Result<TransactionRecord, LedgerError> {
        let meta = self
            .meta
            .ok_or_else(|| LedgerError::InvalidResponse("transaction metadata missing".into()))?;

        let loaded = meta.loaded_addresses.unwrap_or_default();
        let account_keys: Vec<AccountId> = self
            .transaction
            .message
            .account_keys
            .into_iter()
            .chain(loaded.writable)
            .chain(loaded.readonly)
            .map(AccountId::new)
            .collect();

        if meta.pre_balances.len() != account_keys.len()
            || meta.post_balances.len() != account_keys.len()
        {
            return Err(LedgerError::InvalidResponse(format!(
                "balance arrays ({} pre, {} post) do not match {} accounts",
                meta.pre_balances.len(),
                meta.post_balances.len(),
                account_keys.len()
            )));
        }

        let failed = match meta.err {
            None | Some(serde_json::Value::Null) => None,
            Some(err) => Some(err.to_string()),
        };

        Ok(TransactionRecord {
            reference,
            slot: self.slot,
            failed,
            account_keys,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
            block_time: self.block_time.and_then(Timestamp::from_block_time),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> TxReference {
        TxReference::parse(&"5".repeat(88)).unwrap()
    }

    const SAMPLE: &str = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "slot": 250000000,
            "blockTime": 1700000000,
            "meta": {
                "err": null,
                "fee": 5000,
                "preBalances": [2000000000, 0, 1],
                "postBalances": [999995000, 1000000000, 1],
                "loadedAddresses": { "writable": [], "readonly": [] }
            },
            "transaction": {
                "signatures": ["sig"],
                "message": {
                    "accountKeys": ["payer", "shop", "11111111111111111111111111111111"]
                }
            },
            "version": 0
        }
    }"#;

    #[test]
    fn parses_successful_transaction() {
        let resp: JsonRpcResponse<EncodedTransactionWithMeta> =
            serde_json::from_str(SAMPLE).unwrap();
        let record = resp.result.unwrap().into_record(reference()).unwrap();
        assert_eq!(record.slot, 250_000_000);
        assert!(!record.is_failed());
        assert_eq!(record.account_keys.len(), 3);
        assert_eq!(record.balance_change(1), Some(1_000_000_000));
        assert_eq!(record.block_time, Some(Timestamp::new(1_700_000_000)));
    }

    #[test]
    fn null_result_is_none() {
        let resp: JsonRpcResponse<EncodedTransactionWithMeta> =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":null}"#).unwrap();
        assert!(resp.result.is_none());
        assert!(resp.error.is_none());
    }

    #[test]
    fn failed_transaction_keeps_error_text() {
        let json = SAMPLE.replace(
            r#""err": null"#,
            r#""err": {"InstructionError": [0, {"Custom": 1}]}"#,
        );
        let resp: JsonRpcResponse<EncodedTransactionWithMeta> =
            serde_json::from_str(&json).unwrap();
        let record = resp.result.unwrap().into_record(reference()).unwrap();
        assert!(record.is_failed());
        assert!(record.failed.unwrap().contains("InstructionError"));
    }

    #[test]
    fn loaded_addresses_extend_participants() {
        let json = SAMPLE
            .replace(
                r#""loadedAddresses": { "writable": [], "readonly": [] }"#,
                r#""loadedAddresses": { "writable": ["lut-w"], "readonly": ["lut-r"] }"#,
            )
            .replace("[2000000000, 0, 1]", "[2000000000, 0, 1, 10, 20]")
            .replace("[999995000, 1000000000, 1]", "[999995000, 1000000000, 1, 15, 20]");
        let resp: JsonRpcResponse<EncodedTransactionWithMeta> =
            serde_json::from_str(&json).unwrap();
        let record = resp.result.unwrap().into_record(reference()).unwrap();
        assert_eq!(record.account_keys[3], AccountId::new("lut-w"));
        assert_eq!(record.account_keys[4], AccountId::new("lut-r"));
        assert_eq!(record.balance_change(3), Some(5));
    }

    #[test]
    fn mismatched_balances_are_invalid() {
        let json = SAMPLE.replace("[999995000, 1000000000, 1]", "[999995000, 1000000000]");
        let resp: JsonRpcResponse<EncodedTransactionWithMeta> =
            serde_json::from_str(&json).unwrap();
        let err = resp.result.unwrap().into_record(reference()).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidResponse(_)));
    }

    #[test]
    fn wrong_size_error_means_not_found() {
        let err = JsonRpcErrorObject {
            code: -32602,
            message: "Invalid param: WrongSize".into(),
        };
        assert!(matches!(err.into_ledger_error(), LedgerError::NotFound));

        let other = JsonRpcErrorObject {
            code: -32005,
            message: "Node is behind by 42 slots".into(),
        };
        assert!(matches!(
            other.into_ledger_error(),
            LedgerError::Rpc { code: -32005, .. }
        ));
    }
}
