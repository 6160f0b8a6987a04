//! JSON fixtures for accounts and pending requests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use alloy::primitives::Address;
use serde::Deserialize;

use rusty_signer_core::{Account, AccountFlags, AccountKind, AccountMeta, PortError, Request};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountEntry {
    address: Address,
    #[serde(flatten)]
    flags: AccountFlags,
    #[serde(default)]
    meta: AccountMeta,
}

/// Known signing accounts keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountBook {
    accounts: BTreeMap<Address, Account>,
}

impl AccountBook {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: accounts
                .into_iter()
                .map(|account| (account.address, account))
                .collect(),
        }
    }

    /// Unknown senders are treated as keyfile accounts.
    pub fn resolve(&self, address: Address) -> Account {
        self.accounts
            .get(&address)
            .cloned()
            .unwrap_or_else(|| Account::new(address, AccountKind::Keyfile))
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

/// Parses `[{ "address", "external"?, "hardware"?, "uuid"?, "wallet"?, "meta"? }]`.
pub fn parse_accounts(text: &str) -> Result<AccountBook, PortError> {
    let entries: Vec<AccountEntry> = serde_json::from_str(text)
        .map_err(|e| PortError::Validation(format!("invalid accounts json: {e}")))?;
    Ok(AccountBook::new(entries.into_iter().map(|entry| {
        Account::from_flags(entry.address, &entry.flags, entry.meta)
    })))
}

pub fn parse_requests(text: &str) -> Result<Vec<Request>, PortError> {
    serde_json::from_str(text)
        .map_err(|e| PortError::Validation(format!("invalid requests json: {e}")))
}

pub fn read_text(path: &Path) -> Result<String, PortError> {
    fs::read_to_string(path)
        .map_err(|e| PortError::NotFound(format!("{}: {e}", path.display())))
}
