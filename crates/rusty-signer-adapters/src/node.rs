use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde_json::Value;

use rusty_signer_core::{BlockNumberPort, NoncePort, PortError};

use crate::SignerAdapterConfig;

const METHOD_NOT_FOUND: i64 = -32601;

/// Node access for the signer: nonce lookup and chain head.
#[derive(Debug, Clone)]
pub struct NodeAdapter {
    mode: NodeMode,
}

#[derive(Debug, Clone)]
enum NodeMode {
    Deterministic(Arc<Mutex<DeterministicState>>),
    Rpc(RpcRuntime),
}

#[derive(Debug, Clone)]
struct RpcRuntime {
    url: String,
    client: reqwest::blocking::Client,
    next_id: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
struct DeterministicState {
    nonce: U256,
    block_number: U256,
    nonce_failure: Option<String>,
}

impl Default for NodeAdapter {
    fn default() -> Self {
        Self::with_config(SignerAdapterConfig::from_env())
    }
}

impl NodeAdapter {
    pub fn with_config(config: SignerAdapterConfig) -> Self {
        let Some(url) = config.rpc_url.clone() else {
            return Self::deterministic(
                U256::from(config.offline_nonce),
                U256::from(config.offline_block_number),
            );
        };

        let timeout = Duration::from_millis(config.rpc_timeout_ms);
        match reqwest::blocking::Client::builder().timeout(timeout).build() {
            Ok(client) => Self {
                mode: NodeMode::Rpc(RpcRuntime {
                    url,
                    client,
                    next_id: Arc::new(AtomicU64::new(1)),
                }),
            },
            Err(e) => {
                tracing::warn!(error = %e, "rpc client init failed, using deterministic node");
                Self::deterministic(
                    U256::from(config.offline_nonce),
                    U256::from(config.offline_block_number),
                )
            }
        }
    }

    pub fn deterministic(nonce: U256, block_number: U256) -> Self {
        Self {
            mode: NodeMode::Deterministic(Arc::new(Mutex::new(DeterministicState {
                nonce,
                block_number,
                nonce_failure: None,
            }))),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        matches!(self.mode, NodeMode::Deterministic(_))
    }

    pub fn debug_set_block_number(&self, block_number: U256) -> Result<(), PortError> {
        self.with_deterministic(|state| state.block_number = block_number)
    }

    pub fn debug_set_nonce(&self, nonce: U256) -> Result<(), PortError> {
        self.with_deterministic(|state| state.nonce = nonce)
    }

    /// Makes every following nonce lookup fail with `reason` until cleared.
    pub fn debug_fail_nonce(&self, reason: Option<String>) -> Result<(), PortError> {
        self.with_deterministic(|state| state.nonce_failure = reason)
    }

    fn with_deterministic<T>(
        &self,
        f: impl FnOnce(&mut DeterministicState) -> T,
    ) -> Result<T, PortError> {
        match &self.mode {
            NodeMode::Deterministic(state) => {
                let mut g = state
                    .lock()
                    .map_err(|e| PortError::Transport(format!("node lock poisoned: {e}")))?;
                Ok(f(&mut g))
            }
            NodeMode::Rpc(_) => Err(PortError::NotImplemented(
                "debug hooks need the deterministic node",
            )),
        }
    }

    fn rpc_call(&self, runtime: &RpcRuntime, method: &str, params: Value) -> Result<Value, PortError> {
        let id = runtime.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        tracing::debug!(%method, id, "rpc call");

        let response = runtime
            .client
            .post(&runtime.url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("rpc request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "rpc http status {status} for {method}"
            )));
        }
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("rpc response decode failed: {e}")))?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(0);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_owned();
            return Err(PortError::Rpc { code, message });
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport(format!("rpc response for {method} has no result")))
    }
}

impl NoncePort for NodeAdapter {
    fn next_nonce(&self, address: Address) -> Result<U256, PortError> {
        match &self.mode {
            NodeMode::Deterministic(_) => self.with_deterministic(|state| {
                match state.nonce_failure.clone() {
                    Some(reason) => Err(PortError::Transport(reason)),
                    None => Ok(state.nonce),
                }
            })?,
            NodeMode::Rpc(runtime) => {
                let params = serde_json::json!([address]);
                match self.rpc_call(runtime, "parity_nextNonce", params) {
                    Ok(value) => parse_quantity(&value),
                    Err(PortError::Rpc { code, .. }) if code == METHOD_NOT_FOUND => {
                        tracing::warn!(
                            %address,
                            "parity_nextNonce unsupported, falling back to eth_getTransactionCount"
                        );
                        let params = serde_json::json!([address, "pending"]);
                        let value = self.rpc_call(runtime, "eth_getTransactionCount", params)?;
                        parse_quantity(&value)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

impl BlockNumberPort for NodeAdapter {
    fn block_number(&self) -> Result<U256, PortError> {
        match &self.mode {
            NodeMode::Deterministic(_) => self.with_deterministic(|state| state.block_number),
            NodeMode::Rpc(runtime) => {
                let value = self.rpc_call(runtime, "eth_blockNumber", serde_json::json!([]))?;
                parse_quantity(&value)
            }
        }
    }
}

/// Hex quantity as returned by JSON-RPC (`"0x1b4"`); `"0x"` reads as zero.
pub fn parse_quantity(value: &Value) -> Result<U256, PortError> {
    let raw = value
        .as_str()
        .ok_or_else(|| PortError::Validation(format!("expected hex quantity, got {value}")))?;
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| PortError::Validation(format!("quantity without 0x prefix: {raw}")))?;
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| PortError::Validation(format!("invalid quantity {raw}: {e}")))
}
