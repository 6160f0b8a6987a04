use std::collections::BTreeMap;
use std::fmt;

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transaction proposed by a dapp, as handed to the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxPayload {
    pub from: Address,
    /// `None` for contract creation.
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub gas: U256,
    #[serde(default)]
    pub gas_price: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub nonce: Option<U256>,
}

impl TxPayload {
    /// Nonce pinned by the request itself. A zero nonce counts as unset.
    pub fn explicit_nonce(&self) -> Option<U256> {
        self.nonce.filter(|nonce| !nonce.is_zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestError {
    #[serde(default)]
    pub kind: Option<String>,
    pub message: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
            text: None,
        }
    }

    /// Body shown in the list. Falls back to `message` when `text` is empty.
    pub fn display_text(&self) -> &str {
        self.text
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub block_number: U256,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: RequestId,
    pub transaction: TxPayload,
    #[serde(default)]
    pub error: Option<RequestError>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default)]
    pub transaction_receipt: Option<TxReceipt>,
}

impl Request {
    pub fn new(id: RequestId, transaction: TxPayload) -> Self {
        Self {
            id,
            transaction,
            error: None,
            transaction_hash: None,
            transaction_receipt: None,
        }
    }
}

/// Read-only view handed to the request list: chain head plus pending requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerContext {
    pub block_number: U256,
    pub requests: BTreeMap<RequestId, Request>,
}

impl SignerContext {
    pub fn new(block_number: U256, requests: BTreeMap<RequestId, Request>) -> Self {
        Self {
            block_number,
            requests,
        }
    }
}

/// How an account signs. Decides which input surface the confirm form shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccountKind {
    /// Offline signer reached through a QR exchange.
    External,
    Hardware,
    /// Encrypted key held by the node, unlocked with a password.
    Unlocked { uuid: String },
    /// Encrypted wallet file supplied by the user, decrypted with a password.
    Keyfile,
}

impl AccountKind {
    pub fn uses_password(&self) -> bool {
        matches!(self, Self::Unlocked { .. } | Self::Keyfile)
    }

    pub fn uses_keyfile(&self) -> bool {
        matches!(self, Self::Keyfile)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountMeta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password_hint: Option<String>,
}

/// Capability flags as reported by the node's account listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFlags {
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub hardware: bool,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub wallet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub address: Address,
    pub kind: AccountKind,
    #[serde(default)]
    pub meta: AccountMeta,
}

impl Account {
    pub fn new(address: Address, kind: AccountKind) -> Self {
        Self {
            address,
            kind,
            meta: AccountMeta::default(),
        }
    }

    pub fn with_meta(mut self, meta: AccountMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Resolves overlapping flags: external, then hardware, then uuid.
    /// Everything else (the `wallet` flag or no flag at all) needs a keyfile.
    pub fn from_flags(address: Address, flags: &AccountFlags, meta: AccountMeta) -> Self {
        let kind = if flags.external {
            AccountKind::External
        } else if flags.hardware {
            AccountKind::Hardware
        } else if let Some(uuid) = flags.uuid.clone().filter(|uuid| !uuid.is_empty()) {
            AccountKind::Unlocked { uuid }
        } else {
            AccountKind::Keyfile
        };
        Self {
            address,
            kind,
            meta,
        }
    }

    pub fn password_hint(&self) -> Option<&str> {
        self.meta
            .password_hint
            .as_deref()
            .filter(|hint| !hint.is_empty())
    }
}
