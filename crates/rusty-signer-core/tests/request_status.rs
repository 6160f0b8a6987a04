mod common;

use std::collections::BTreeMap;

use alloy::primitives::{B256, U256};
use rusty_signer_core::{
    derive_state, request_row, request_rows, Progress, Request, RequestError, RequestId,
    RequestState, SignerContext, StatusMessage, TxReceipt, CONFIRMATION_TARGET,
};

use common::transfer;

fn request(id: u64) -> Request {
    Request::new(RequestId(id), transfer())
}

fn receipt(block: u64) -> TxReceipt {
    TxReceipt {
        block_number: U256::from(block),
        transaction_hash: None,
    }
}

#[test]
fn error_wins_over_hash_and_receipt() {
    let mut req = request(1);
    req.error = Some(RequestError {
        kind: Some("signer".to_owned()),
        message: "Request rejected".to_owned(),
        text: Some("user rejected the request".to_owned()),
    });
    req.transaction_hash = Some(B256::repeat_byte(0xab));
    req.transaction_receipt = Some(receipt(10));

    let row = request_row(&req, U256::from(20));
    assert_eq!(row.state, RequestState::Error);
    assert_eq!(row.progress, Progress::Hidden);
    assert!(row.status.is_error());
    assert_eq!(
        row.status,
        StatusMessage::Failed {
            title: "Request rejected".to_owned(),
            text: "user rejected the request".to_owned(),
        }
    );
}

#[test]
fn mined_request_reports_depth_and_full_progress() {
    let mut req = request(2);
    req.transaction_hash = Some(B256::repeat_byte(0x01));
    req.transaction_receipt = Some(receipt(4_370_000));

    let row = request_row(&req, U256::from(4_370_003u64));
    assert_eq!(
        row.state,
        RequestState::Done {
            block_height: U256::from(3)
        }
    );
    assert_eq!(
        row.progress,
        Progress::Determinate {
            value: CONFIRMATION_TARGET,
            max: CONFIRMATION_TARGET
        }
    );
    assert_eq!(row.progress.fraction(), Some(1.0));
    assert_eq!(
        row.status.headline(),
        "Transaction mined at block #4,370,000"
    );
    assert_eq!(row.status.detail(), None);
}

#[test]
fn depth_does_not_fit_in_a_machine_word() {
    let mut req = request(3);
    let mined = U256::from(u128::MAX);
    req.transaction_receipt = Some(TxReceipt {
        block_number: mined,
        transaction_hash: None,
    });
    let head = mined + U256::from(u128::MAX);

    assert_eq!(
        derive_state(&req, head),
        RequestState::Done {
            block_height: U256::from(u128::MAX)
        }
    );
}

#[test]
fn lagging_head_saturates_depth_at_zero() {
    let mut req = request(4);
    req.transaction_receipt = Some(receipt(100));
    assert_eq!(
        derive_state(&req, U256::from(99)),
        RequestState::Done {
            block_height: U256::ZERO
        }
    );
}

#[test]
fn waiting_request_without_hash_is_generic_pending() {
    let row = request_row(&request(5), U256::from(1));
    assert_eq!(row.state, RequestState::Waiting);
    assert_eq!(row.progress, Progress::Indeterminate);
    assert_eq!(row.progress.fraction(), None);
    assert_eq!(row.status, StatusMessage::Pending);
    assert_eq!(row.status.headline(), "Transaction pending in Signer");
}

#[test]
fn waiting_request_with_hash_shows_hash() {
    let mut req = request(6);
    let hash = B256::repeat_byte(0x42);
    req.transaction_hash = Some(hash);

    let row = request_row(&req, U256::from(1));
    assert_eq!(row.state, RequestState::Waiting);
    assert_eq!(row.progress, Progress::Indeterminate);
    assert_eq!(row.status, StatusMessage::Sent { hash });
    assert_eq!(row.status.detail(), Some(hash.to_string()));
}

#[test]
fn rows_follow_request_id_order() {
    let mut requests = BTreeMap::new();
    for id in [9u64, 2, 5] {
        requests.insert(RequestId(id), request(id));
    }
    let ctx = SignerContext::new(U256::from(1), requests);

    let ids: Vec<u64> = request_rows(&ctx).iter().map(|row| row.id.0).collect();
    assert_eq!(ids, vec![2, 5, 9]);
}

#[test]
fn empty_context_renders_no_rows() {
    assert!(request_rows(&SignerContext::default()).is_empty());
}
