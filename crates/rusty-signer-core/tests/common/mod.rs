#![allow(dead_code)]

use std::cell::Cell;

use alloy::primitives::{Address, Bytes, U256};

use rusty_signer_core::{
    Account, AccountKind, AccountMeta, ConfirmForm, NoncePort, PortError, RequestId, TxPayload,
};

pub fn sender() -> Address {
    "0x1000000000000000000000000000000000000001"
        .parse()
        .expect("valid sender address")
}

pub fn recipient() -> Address {
    "0x000000000000000000000000000000000000CAFE"
        .parse()
        .expect("valid recipient address")
}

pub fn transfer() -> TxPayload {
    TxPayload {
        from: sender(),
        to: Some(recipient()),
        value: U256::from(1),
        gas: U256::from(21_000),
        gas_price: U256::from(20_000_000_000u64),
        data: Bytes::new(),
        nonce: None,
    }
}

pub fn form_for(kind: AccountKind) -> ConfirmForm {
    ConfirmForm::new(RequestId(1), Account::new(sender(), kind), transfer())
}

pub fn form_with_meta(kind: AccountKind, meta: AccountMeta) -> ConfirmForm {
    ConfirmForm::new(
        RequestId(1),
        Account::new(sender(), kind).with_meta(meta),
        transfer(),
    )
}

/// Nonce port answering from a fixed result and counting calls.
pub struct FixedNonce {
    result: Result<U256, PortError>,
    pub calls: Cell<u32>,
}

impl FixedNonce {
    pub fn ok(nonce: u64) -> Self {
        Self {
            result: Ok(U256::from(nonce)),
            calls: Cell::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            result: Err(PortError::Transport(message.to_owned())),
            calls: Cell::new(0),
        }
    }
}

impl NoncePort for FixedNonce {
    fn next_nonce(&self, _address: Address) -> Result<U256, PortError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}
