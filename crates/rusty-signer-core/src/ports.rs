use std::collections::BTreeMap;

use alloy::primitives::{Address, B256, U256};
use thiserror::Error;

use crate::domain::{Request, RequestError, RequestId, TxReceipt};
use crate::form::ConfirmPayload;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("port not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub trait NoncePort {
    /// Next nonce the node would assign to `address`, pending pool included.
    fn next_nonce(&self, address: Address) -> Result<U256, PortError>;
}

pub trait BlockNumberPort {
    fn block_number(&self) -> Result<U256, PortError>;
}

/// Receiver of a completed confirmation. Signing and submission happen behind it.
pub trait ConfirmSink {
    fn confirm_request(&self, id: RequestId, payload: ConfirmPayload) -> Result<(), PortError>;
}

pub trait RequestStorePort {
    fn snapshot(&self) -> Result<BTreeMap<RequestId, Request>, PortError>;
    fn upsert(&self, request: Request) -> Result<(), PortError>;
    fn remove(&self, id: RequestId) -> Result<Option<Request>, PortError>;
    fn mark_sent(&self, id: RequestId, hash: B256) -> Result<(), PortError>;
    fn mark_mined(&self, id: RequestId, receipt: TxReceipt) -> Result<(), PortError>;
    fn mark_failed(&self, id: RequestId, error: RequestError) -> Result<(), PortError>;
}
