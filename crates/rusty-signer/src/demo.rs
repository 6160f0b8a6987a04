//! Sample accounts and requests for running without a node.

use alloy::primitives::{address, bytes, Address, Bytes, U256};

use rusty_signer_adapters::{AccountBook, InMemoryRequestStore};
use rusty_signer_core::{
    Account, AccountFlags, AccountMeta, PortError, Request, RequestError, RequestId,
    RequestStorePort, TxPayload, TxReceipt,
};

pub const DEMO_BLOCK: u64 = 4_370_000;

const UNLOCKED: Address = address!("00a329c0648769a73afac7f9381e08fb43dbea72");
const KEYFILE: Address = address!("0b2d6a3b5bb0f2a4e0a5e1e1bfa8d7e2c0f1a001");
const HARDWARE: Address = address!("7e5f4552091a69125d5dfcb7b8c2659029395bdf");
const EXTERNAL: Address = address!("2b5ad5c4795c026514f8317c7a215e218dccd6cf");
const RECIPIENT: Address = address!("000000000000000000000000000000000000cafe");

fn meta(name: &str, password_hint: Option<&str>) -> AccountMeta {
    AccountMeta {
        name: Some(name.to_owned()),
        password_hint: password_hint.map(str::to_owned),
    }
}

pub fn accounts() -> AccountBook {
    AccountBook::new([
        Account::from_flags(
            UNLOCKED,
            &AccountFlags {
                uuid: Some("9b1b6f2e-demo-unlocked".to_owned()),
                ..AccountFlags::default()
            },
            meta("Node account", Some("the usual one")),
        ),
        Account::from_flags(
            KEYFILE,
            &AccountFlags {
                wallet: true,
                ..AccountFlags::default()
            },
            meta("Paper wallet", None),
        ),
        Account::from_flags(
            HARDWARE,
            &AccountFlags {
                hardware: true,
                ..AccountFlags::default()
            },
            meta("Ledger", None),
        ),
        Account::from_flags(
            EXTERNAL,
            &AccountFlags {
                external: true,
                ..AccountFlags::default()
            },
            meta("Offline signer", None),
        ),
    ])
}

fn transfer(from: Address, value: u64) -> TxPayload {
    TxPayload {
        from,
        to: Some(RECIPIENT),
        value: U256::from(value) * U256::from(10u64).pow(U256::from(15)),
        gas: U256::from(21_000),
        gas_price: U256::from(20_000_000_000u64),
        data: Bytes::new(),
        nonce: None,
    }
}

fn token_call(from: Address) -> TxPayload {
    TxPayload {
        gas: U256::from(60_000),
        value: U256::ZERO,
        data: bytes!(
            "a9059cbb000000000000000000000000000000000000000000000000000000000000cafe0000000000000000000000000000000000000000000000000de0b6b3a7640000"
        ),
        ..transfer(from, 0)
    }
}

/// One pending request per account kind plus one per list state.
pub fn seed(store: &InMemoryRequestStore, head: U256) -> Result<(), PortError> {
    let mut requests = vec![
        Request::new(RequestId(1), transfer(UNLOCKED, 250)),
        Request::new(RequestId(2), token_call(KEYFILE)),
        Request::new(RequestId(3), transfer(HARDWARE, 1_000)),
        Request::new(
            RequestId(4),
            TxPayload {
                to: None,
                gas: U256::from(900_000),
                data: bytes!("6080604052348015600f57600080fd5b50"),
                ..transfer(EXTERNAL, 0)
            },
        ),
    ];

    let mut sent = Request::new(RequestId(5), transfer(UNLOCKED, 10));
    sent.transaction_hash = Some(alloy::primitives::keccak256(b"demo sent"));
    requests.push(sent);

    let mut mined = Request::new(RequestId(6), transfer(KEYFILE, 42));
    let hash = alloy::primitives::keccak256(b"demo mined");
    mined.transaction_hash = Some(hash);
    mined.transaction_receipt = Some(TxReceipt {
        block_number: head.saturating_sub(U256::from(2)),
        transaction_hash: Some(hash),
    });
    requests.push(mined);

    let mut failed = Request::new(RequestId(7), transfer(HARDWARE, 5_000));
    failed.error = Some(RequestError {
        kind: Some("rejected".to_owned()),
        text: Some("insufficient funds for gas * price + value".to_owned()),
        ..RequestError::new("Transaction rejected by the node")
    });
    requests.push(failed);

    for request in requests {
        store.upsert(request)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_signer_core::AccountKind;

    #[test]
    fn demo_accounts_cover_every_kind() {
        let book = accounts();
        assert_eq!(book.len(), 4);
        assert!(matches!(book.resolve(UNLOCKED).kind, AccountKind::Unlocked { .. }));
        assert_eq!(book.resolve(KEYFILE).kind, AccountKind::Keyfile);
        assert_eq!(book.resolve(HARDWARE).kind, AccountKind::Hardware);
        assert_eq!(book.resolve(EXTERNAL).kind, AccountKind::External);
        assert_eq!(book.resolve(UNLOCKED).password_hint(), Some("the usual one"));
    }

    #[test]
    fn seeded_requests_keep_ids_and_receipt_depth() {
        let store = InMemoryRequestStore::new();
        seed(&store, U256::from(DEMO_BLOCK)).expect("seed");
        let snapshot = store.snapshot().expect("snapshot");
        assert_eq!(snapshot.len(), 7);
        assert_eq!(
            snapshot[&RequestId(6)]
                .transaction_receipt
                .as_ref()
                .map(|r| r.block_number),
            Some(U256::from(DEMO_BLOCK - 2))
        );
        assert!(snapshot[&RequestId(4)].transaction.to.is_none());
        assert_eq!(store.propose(transfer(UNLOCKED, 1)).expect("propose"), RequestId(8));
    }
}
