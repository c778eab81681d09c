//! JSON-RPC adapter for wallets that expose an EIP-1193 provider over HTTP.
//!
//! Desktop wallets and signer daemons accept the same `eth_*` / `wallet_*`
//! requests a browser extension does. Signing and confirmation prompts stay in
//! the wallet; this side only forwards requests and decodes responses.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use stakeapp_core::{Address, Bytes, NetworkConfig, TxHash};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::ProviderError;
use crate::provider::{CallRequest, TxReceipt, WalletProvider};

/// `wallet_addEthereumChain` parameters (EIP-3085).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddChainParams<'a> {
    chain_id: String,
    chain_name: &'a str,
    native_currency: NativeCurrencyParams<'a>,
    rpc_urls: &'a [String],
    block_explorer_urls: &'a [String],
}

#[derive(Debug, Serialize)]
struct NativeCurrencyParams<'a> {
    name: &'a str,
    symbol: &'a str,
    decimals: u8,
}

impl<'a> From<&'a NetworkConfig> for AddChainParams<'a> {
    fn from(network: &'a NetworkConfig) -> Self {
        Self {
            chain_id: network.chain_id_hex(),
            chain_name: &network.chain_name,
            native_currency: NativeCurrencyParams {
                name: &network.native_currency.name,
                symbol: &network.native_currency.symbol,
                decimals: network.native_currency.decimals,
            },
            rpc_urls: &network.rpc_urls,
            block_explorer_urls: &network.block_explorer_urls,
        }
    }
}

/// Wallet provider reached over HTTP JSON-RPC.
pub struct JsonRpcProvider {
    url: String,
    http: reqwest::Client,
    next_id: AtomicU64,
    poll_interval: Duration,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            url: url.into(),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            poll_interval,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one JSON-RPC request and return its `result`.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!("-> {} #{} {}", method, id, body["params"]);

        let reply = self.http.post(&self.url).json(&body).send().await?;
        let status = reply.status();
        let text = reply.text().await?;

        tracing::debug!("<- {} #{} {} {}", method, id, status, text);

        parse_response(decode_reply(status, &text)?)
    }
}

/// Decode an HTTP reply body as JSON-RPC.
///
/// Wallets may attach a JSON-RPC error to a non-2xx status, so the body is
/// classified first; the status only matters when the body is not JSON-RPC.
fn decode_reply(status: reqwest::StatusCode, text: &str) -> Result<Value, ProviderError> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if value.get("result").is_some() || value.get("error").is_some() => Ok(value),
        _ if !status.is_success() => Err(ProviderError::Transport(format!("HTTP {}", status))),
        Ok(value) => Ok(value),
        Err(e) => Err(ProviderError::InvalidResponse(format!(
            "response is not JSON: {}",
            e
        ))),
    }
}

/// Split a JSON-RPC response into its result or a classified error.
fn parse_response(mut response: Value) -> Result<Value, ProviderError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ProviderError::from_code(code, message));
    }

    match response.get_mut("result") {
        Some(result) => Ok(result.take()),
        None => Err(ProviderError::InvalidResponse(
            "response has neither result nor error".to_string(),
        )),
    }
}

/// Parse a `0x`-prefixed hex quantity.
fn parse_quantity(value: &Value) -> Result<u64, ProviderError> {
    let text = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected hex quantity, got {}", value)))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    u64::from_str_radix(digits, 16)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad quantity '{}': {}", text, e)))
}

fn parse_bytes(value: &Value) -> Result<Bytes, ProviderError> {
    let text = value
        .as_str()
        .ok_or_else(|| ProviderError::InvalidResponse(format!("expected hex data, got {}", value)))?;
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits)
        .map(Bytes::from)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad hex data: {}", e)))
}

fn parse_hash(value: Value) -> Result<TxHash, ProviderError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderError::InvalidResponse(format!("bad transaction hash: {}", e)))
}

/// Parse a receipt object; `None` while the transaction is still pending.
fn parse_receipt(value: Value) -> Result<Option<TxReceipt>, ProviderError> {
    if value.is_null() {
        return Ok(None);
    }

    let transaction_hash = parse_hash(value["transactionHash"].clone())?;
    let block_number = value
        .get("blockNumber")
        .filter(|v| !v.is_null())
        .map(parse_quantity)
        .transpose()?;
    let gas_used = value
        .get("gasUsed")
        .filter(|v| !v.is_null())
        .map(parse_quantity)
        .transpose()?;
    // Pre-Byzantium receipts carry no status; treat inclusion as success.
    let success = match value.get("status").filter(|v| !v.is_null()) {
        Some(status) => parse_quantity(status)? == 1,
        None => true,
    };

    Ok(Some(TxReceipt {
        transaction_hash,
        block_number,
        gas_used,
        success,
    }))
}

/// Transaction object for `eth_call`, `eth_estimateGas` and `eth_sendTransaction`.
fn call_object(request: &CallRequest) -> Value {
    let mut object = json!({
        "to": request.to,
        "data": request.data,
    });
    if let Some(from) = request.from {
        object["from"] = json!(from);
    }
    if let Some(gas) = request.gas {
        object["gas"] = json!(format!("{:#x}", gas));
    }
    object
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let result = self.request("eth_requestAccounts", json!([])).await?;
        serde_json::from_value(result)
            .map_err(|e| ProviderError::InvalidResponse(format!("bad account list: {}", e)))
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        let result = self.request("eth_chainId", json!([])).await?;
        parse_quantity(&result)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        self.request(
            "wallet_switchEthereumChain",
            json!([{ "chainId": format!("{:#x}", chain_id) }]),
        )
        .await?;
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), ProviderError> {
        let params = AddChainParams::from(network);
        self.request("wallet_addEthereumChain", json!([params])).await?;
        Ok(())
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ProviderError> {
        let result = self
            .request("eth_call", json!([call_object(request), "latest"]))
            .await?;
        parse_bytes(&result)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, ProviderError> {
        let result = self
            .request("eth_estimateGas", json!([call_object(request)]))
            .await?;
        parse_quantity(&result)
    }

    async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, ProviderError> {
        let result = self
            .request("eth_sendTransaction", json!([call_object(request)]))
            .await?;
        parse_hash(result)
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<TxReceipt, ProviderError> {
        loop {
            let result = self
                .request("eth_getTransactionReceipt", json!([hash]))
                .await?;
            if let Some(receipt) = parse_receipt(result)? {
                return Ok(receipt);
            }
            tracing::trace!("Receipt for {} not available yet", hash);
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
