//! JSON-RPC wrapper layer.
//!
//! The transport is pluggable through [`RpcClient`]: one synchronous call,
//! opaque strings in both directions, node URL passed per request. The
//! [`JsonRpc`] wrapper owns request construction, the message-id counter,
//! and `"result"` extraction; the wallet never sees raw JSON.

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::{json, Value};
use tracing::debug;

use crate::error::WalletError;

/// A synchronous JSON-RPC transport.
///
/// Implementations POST `request_body` to `node_url` and return the raw
/// response body. The in-order request/response contract must hold; the
/// wallet issues one request at a time.
pub trait RpcClient {
    fn request(&self, node_url: &str, request_body: &str) -> Result<String, WalletError>;
}

/// Builds JSON-RPC requests and extracts results.
///
/// Message ids increase monotonically from a random 32-bit seed.
pub struct JsonRpc<C> {
    client: C,
    next_id: AtomicU32,
}

impl<C: RpcClient> JsonRpc<C> {
    pub fn new(client: C) -> Result<Self, WalletError> {
        let seed = crypto_utils::random::random_u32()?;
        Ok(Self {
            client,
            next_id: AtomicU32::new(seed),
        })
    }

    /// The underlying transport.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// `eth_getTransactionCount(address, block_tag)` → hex quantity string.
    pub fn transaction_count(
        &self,
        node_url: &str,
        address: &str,
        block_tag: &str,
    ) -> Result<String, WalletError> {
        self.request_result(node_url, "eth_getTransactionCount", json!([address, block_tag]))
            .and_then(result_string)
    }

    /// `eth_gasPrice()` → hex quantity string (wei per gas).
    pub fn gas_price(&self, node_url: &str) -> Result<String, WalletError> {
        self.request_result(node_url, "eth_gasPrice", json!([]))
            .and_then(result_string)
    }

    /// `eth_getBalance(address, block_tag)` → hex quantity string (wei).
    pub fn balance(
        &self,
        node_url: &str,
        address: &str,
        block_tag: &str,
    ) -> Result<String, WalletError> {
        self.request_result(node_url, "eth_getBalance", json!([address, block_tag]))
            .and_then(result_string)
    }

    /// `eth_sendRawTransaction(signed_hex)` → transaction hash hex string.
    pub fn send_raw_transaction(
        &self,
        node_url: &str,
        signed_hex: &str,
    ) -> Result<String, WalletError> {
        self.request_result(node_url, "eth_sendRawTransaction", json!([signed_hex]))
            .and_then(result_string)
    }

    /// `eth_getStorageAt(address, position, block_tag)` → hex string.
    pub fn storage_at(
        &self,
        node_url: &str,
        address: &str,
        position: &str,
        block_tag: &str,
    ) -> Result<String, WalletError> {
        self.request_result(
            node_url,
            "eth_getStorageAt",
            json!([address, position, block_tag]),
        )
        .and_then(result_string)
    }

    /// `eth_getTransactionReceipt(tx_hash).status`.
    ///
    /// A `null` receipt means the transaction is still pending and maps to
    /// the empty string; a mined transaction reports `"0x1"` (success) or
    /// `"0x0"` (contract-level failure).
    pub fn transaction_receipt_status(
        &self,
        node_url: &str,
        tx_hash: &str,
    ) -> Result<String, WalletError> {
        let result = self.request_result(node_url, "eth_getTransactionReceipt", json!([tx_hash]))?;
        if result.is_null() {
            return Ok(String::new());
        }
        match result.get("status").and_then(Value::as_str) {
            Some(status) => Ok(status.to_owned()),
            None => Err(WalletError::JsonParse(
                "receipt has no \"status\" item".into(),
            )),
        }
    }

    /// `eth_call({to, gas, gasPrice, data})` → hex string return value.
    pub fn call(
        &self,
        node_url: &str,
        to: &str,
        gas: &str,
        gas_price: &str,
        data: &str,
    ) -> Result<String, WalletError> {
        self.request_result(
            node_url,
            "eth_call",
            json!([{ "to": to, "gas": gas, "gasPrice": gas_price, "data": data }]),
        )
        .and_then(result_string)
    }

    fn request_result(
        &self,
        node_url: &str,
        method: &str,
        params: Value,
    ) -> Result<Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id,
        })
        .to_string();

        debug!(method, request = %body, "rpc request");
        let response = self.client.request(node_url, &body)?;
        debug!(method, response = %response, "rpc response");

        let parsed: Value = serde_json::from_str(&response)
            .map_err(|e| WalletError::JsonParse(e.to_string()))?;

        if let Some(error) = parsed.get("error") {
            return Err(WalletError::Rpc(error.to_string()));
        }

        match parsed.get("result") {
            Some(result) => Ok(result.clone()),
            None => Err(WalletError::JsonParse(
                "response has no \"result\" item".into(),
            )),
        }
    }
}

fn result_string(value: Value) -> Result<String, WalletError> {
    match value.as_str() {
        Some(s) => Ok(s.to_owned()),
        None => Err(WalletError::JsonParse("\"result\" is not a string".into())),
    }
}
