mod common;

use alloy::primitives::U256;
use rusty_signer_core::{
    AccountKind, AccountMeta, ConfirmOutcome, ConfirmPayload, FormError, FormKey, FormProps,
    Hint, KeyfileError, PortError, QrPhase, PASSWORD_TOOLTIP,
};

use common::{form_for, form_with_meta, sender, FixedNonce};

fn unlocked() -> AccountKind {
    AccountKind::Unlocked {
        uuid: "9a1b-uuid".to_owned(),
    }
}

#[test]
fn unlocked_account_submits_password_on_enter() {
    let mut form = form_for(unlocked());
    form.set_password("secret");

    let outcome = form
        .on_key_down(FormKey::Enter)
        .expect("enter confirms")
        .expect("enter yields an outcome");
    let ConfirmOutcome::Submit(payload) = outcome else {
        panic!("expected a submission");
    };
    assert_eq!(
        serde_json::to_value(&payload).expect("serialize payload"),
        serde_json::json!({"password": "secret", "wallet": null})
    );
}

#[test]
fn other_keys_do_nothing() {
    let mut form = form_for(unlocked());
    assert_eq!(form.on_key_down(FormKey::Other), Ok(None));
}

#[test]
fn hardware_account_submits_empty_payload() {
    let mut form = form_for(AccountKind::Hardware);
    let outcome = form.confirm().expect("hardware confirm");
    assert_eq!(outcome, ConfirmOutcome::Submit(ConfirmPayload::Hardware {}));
    let ConfirmOutcome::Submit(payload) = outcome else {
        unreachable!()
    };
    assert_eq!(
        serde_json::to_value(&payload).expect("serialize payload"),
        serde_json::json!({})
    );
}

#[test]
fn keyfile_account_needs_a_valid_wallet() {
    let mut form = form_for(AccountKind::Keyfile);
    assert!(form.shows_keyfile_input());
    assert!(!form.can_confirm());
    assert_eq!(form.confirm(), Err(FormError::Disabled));

    form.select_keyfile(Some("definitely not json"));
    assert!(form.wallet().is_none());
    assert_eq!(form.wallet_error(), Some(&KeyfileError::Invalid));
    assert!(!form.can_confirm());

    form.select_keyfile(Some(r#"{"id":"w","meta":"{\"passwordHint\":\"blue\"}"}"#));
    assert!(form.wallet_error().is_none());
    let meta = form.wallet().and_then(|w| w.meta()).expect("wallet meta");
    assert!(meta.is_object());
    assert!(form.can_confirm());
    assert_eq!(form.hint(), Some(Hint::Password("blue".to_owned())));

    form.set_password("hunter2");
    let ConfirmOutcome::Submit(payload) = form.confirm().expect("keyfile confirm") else {
        panic!("expected a submission");
    };
    let json = serde_json::to_value(&payload).expect("serialize payload");
    assert_eq!(json["password"], "hunter2");
    assert_eq!(json["wallet"]["id"], "w");
    assert_eq!(json["wallet"]["meta"]["passwordHint"], "blue");
}

#[test]
fn clearing_the_keyfile_selection_resets_wallet_state() {
    let mut form = form_for(AccountKind::Keyfile);
    form.select_keyfile(Some("{}"));
    assert!(form.wallet().is_some());
    form.select_keyfile(None);
    assert!(form.wallet().is_none());
    assert!(form.wallet_error().is_none());

    form.keyfile_failed(KeyfileError::TooLarge { limit: 16 });
    assert!(form.wallet().is_none());
    assert!(form.wallet_error().is_some());
}

#[test]
fn last_completed_keyfile_read_wins() {
    let mut form = form_for(AccountKind::Keyfile);
    form.select_keyfile(Some(r#"{"id":"first"}"#));
    form.select_keyfile(Some(r#"{"id":"second"}"#));
    assert_eq!(
        form.wallet().and_then(|w| w.get("id")),
        Some(&serde_json::json!("second"))
    );
}

#[test]
fn disabled_and_sending_block_every_account_kind() {
    for kind in [
        AccountKind::External,
        AccountKind::Hardware,
        unlocked(),
        AccountKind::Keyfile,
    ] {
        for props in [
            FormProps {
                disabled: true,
                ..FormProps::default()
            },
            FormProps {
                is_sending: true,
                ..FormProps::default()
            },
        ] {
            let mut form = form_for(kind.clone()).with_props(props);
            form.select_keyfile(Some("{}"));
            assert!(!form.can_confirm(), "{kind:?} with {props:?}");
            assert_eq!(form.confirm(), Err(FormError::Disabled));
        }
    }
}

#[test]
fn external_invisible_reaches_visible_after_nonce() {
    let nonces = FixedNonce::ok(12);
    let mut form = form_for(AccountKind::External);
    assert_eq!(form.confirm_label(), Some("External Confirm"));
    assert_eq!(form.hint(), Some(Hint::ExternalConfirm));
    assert!(form.password_prompt().is_none());

    let outcome = form.confirm().expect("external confirm");
    let ConfirmOutcome::FetchNonce(request) = outcome else {
        panic!("expected a nonce lookup");
    };
    assert_eq!(request.address, sender());
    assert_eq!(form.qr_phase(), QrPhase::Generating);
    assert!(form.is_generating());
    assert!(form.qr_code_value().is_none());

    // A second tap while the lookup is in flight must not start another one.
    assert_eq!(form.confirm(), Err(FormError::Disabled));
    assert_eq!(form.confirm_label(), Some("External Confirm"));

    let phase = form
        .nonce_resolved(request.ticket, Ok(U256::from(12)))
        .expect("nonce applied");
    assert_eq!(phase, QrPhase::Visible);
    assert_eq!(form.qr_payload().map(|qr| qr.nonce), Some(U256::from(12)));
    assert!(form.qr_code_value().is_some());
    assert_eq!(form.confirm_label(), Some("Scan Signed QR"));
    assert_eq!(form.hint(), Some(Hint::ExternalScanTx));
    assert_eq!(nonces.calls.get(), 0);
}

#[test]
fn failed_nonce_lookup_never_shows_the_qr() {
    let nonces = FixedNonce::failing("node unreachable");
    let mut form = form_for(AccountKind::External);

    let err = form.confirm_with(&nonces).expect_err("lookup fails");
    assert!(matches!(err, FormError::NonceLookup(_)));
    assert_eq!(nonces.calls.get(), 1);
    assert_eq!(form.qr_phase(), QrPhase::Invisible);
    assert!(form.qr_payload().is_none());
    assert!(form
        .last_error()
        .expect("inline error")
        .contains("node unreachable"));

    form.dismiss_error();
    assert!(form.last_error().is_none());
    assert!(form.can_confirm());
}

#[test]
fn stale_nonce_results_are_discarded() {
    let mut form = form_for(AccountKind::External);
    let ConfirmOutcome::FetchNonce(request) = form.confirm().expect("confirm") else {
        panic!("expected a nonce lookup");
    };

    let err = form
        .nonce_resolved(request.ticket + 1, Ok(U256::from(1)))
        .expect_err("wrong ticket");
    assert_eq!(
        err,
        FormError::StaleNonce {
            ticket: request.ticket + 1
        }
    );
    assert_eq!(form.qr_phase(), QrPhase::Generating);

    form.nonce_resolved(request.ticket, Err(PortError::Transport("down".to_owned())))
        .expect_err("lookup failed");
    let err = form
        .nonce_resolved(request.ticket, Ok(U256::from(1)))
        .expect_err("already resolved");
    assert!(matches!(err, FormError::StaleNonce { .. }));
    assert_eq!(form.qr_phase(), QrPhase::Invisible);
}

#[test]
fn visible_moves_to_scan_without_another_lookup() {
    let nonces = FixedNonce::ok(3);
    let mut form = form_for(AccountKind::External);
    form.confirm_with(&nonces).expect("qr generated");
    assert_eq!(form.qr_phase(), QrPhase::Visible);

    let outcome = form.confirm_with(&nonces).expect("start scan");
    assert_eq!(outcome, ConfirmOutcome::PhaseChanged(QrPhase::Scan));
    assert_eq!(nonces.calls.get(), 1);
    assert!(form.shows_scanner());
    assert_eq!(form.confirm_label(), None);
    assert_eq!(form.hint(), Some(Hint::ExternalScanSigned));
    assert_eq!(form.confirm(), Err(FormError::Disabled));
}

#[test]
fn scanned_signature_is_forwarded_with_unsigned_rlp() {
    let nonces = FixedNonce::ok(5);
    let mut form = form_for(AccountKind::External);
    form.confirm_with(&nonces).expect("qr generated");
    form.confirm_with(&nonces).expect("scan started");
    let rlp = form.qr_payload().expect("payload").rlp.clone();

    let payload = form.scan_received("deadbeef").expect("scan accepted");
    assert_eq!(form.qr_phase(), QrPhase::Completed);
    assert_eq!(form.confirm_label(), None);
    assert_eq!(form.hint(), None);

    let json = serde_json::to_value(&payload).expect("serialize payload");
    assert_eq!(json["txSigned"]["signature"], "0xdeadbeef");
    assert_eq!(json["txSigned"]["rlp"], rlp.as_str());
    assert_eq!(json["txSigned"]["tx"]["nonce"], "0x5");

    let err = form.scan_received("0xdeadbeef").expect_err("terminal phase");
    assert!(matches!(err, FormError::IllegalTransition { .. }));
}

#[test]
fn prefixed_scan_is_forwarded_unchanged() {
    let nonces = FixedNonce::ok(5);
    let mut form = form_for(AccountKind::External);
    form.confirm_with(&nonces).expect("qr generated");
    form.confirm_with(&nonces).expect("scan started");

    let ConfirmPayload::PreSigned { tx_signed } =
        form.scan_received("0xdeadbeef").expect("scan accepted")
    else {
        panic!("expected a pre-signed payload");
    };
    assert_eq!(tx_signed.signature, "0xdeadbeef");
}

#[test]
fn scan_before_scan_phase_is_rejected() {
    let mut form = form_for(AccountKind::External);
    let err = form.scan_received("deadbeef").expect_err("not scanning");
    assert_eq!(
        err,
        FormError::IllegalTransition {
            from: QrPhase::Invisible,
            action: rusty_signer_core::QrAction::ScanReceived,
        }
    );
}

#[test]
fn hardware_hints_follow_sending_then_disabled() {
    let meta = AccountMeta {
        name: None,
        password_hint: Some("ignored while busy".to_owned()),
    };
    let mut form = form_with_meta(AccountKind::Hardware, meta);
    assert_eq!(
        form.hint(),
        Some(Hint::Password("ignored while busy".to_owned()))
    );

    form.set_props(FormProps {
        disabled: true,
        ..FormProps::default()
    });
    assert_eq!(form.hint(), Some(Hint::HardwareConnect));

    form.set_props(FormProps {
        disabled: true,
        is_sending: true,
        focus: false,
    });
    assert_eq!(form.hint(), Some(Hint::HardwareConfirm));
    assert_eq!(
        Hint::HardwareConfirm.message(),
        "Please confirm the transaction on your attached hardware device"
    );
}

#[test]
fn account_hint_wins_over_wallet_hint() {
    let meta = AccountMeta {
        name: None,
        password_hint: Some("account".to_owned()),
    };
    let mut form = form_with_meta(AccountKind::Keyfile, meta);
    form.select_keyfile(Some(r#"{"meta":{"passwordHint":"wallet"}}"#));
    assert_eq!(form.password_hint(), Some("account"));
    assert_eq!(
        form.hint().map(|hint| hint.message()),
        Some("(hint) account".to_owned())
    );
}

#[test]
fn password_prompt_depends_on_account_kind() {
    let unlocked_form = form_for(unlocked());
    let prompt = unlocked_form.password_prompt().expect("prompt");
    assert_eq!(prompt.label, "Account Password");
    assert_eq!(prompt.hint, "unlock the account");
    assert!(!unlocked_form.shows_keyfile_input());
    assert_eq!(unlocked_form.password_tooltip(), Some(PASSWORD_TOOLTIP));

    let keyfile_form = form_for(AccountKind::Keyfile);
    let prompt = keyfile_form.password_prompt().expect("prompt");
    assert_eq!(prompt.label, "Key Password");
    assert_eq!(prompt.hint, "decrypt the key");

    let hardware_form = form_for(AccountKind::Hardware);
    assert!(hardware_form.password_prompt().is_none());
    assert!(hardware_form.password_tooltip().is_none());
}

#[test]
fn sending_changes_the_button_label() {
    let mut form = form_for(unlocked());
    assert_eq!(form.confirm_label(), Some("Confirm Request"));
    form.set_props(FormProps {
        is_sending: true,
        ..FormProps::default()
    });
    assert_eq!(form.confirm_label(), Some("Confirming..."));
}

#[test]
fn focus_is_reported_once_when_gained() {
    let mut form = form_for(unlocked());
    let focused = FormProps {
        focus: true,
        ..FormProps::default()
    };
    assert!(form.set_props(focused));
    assert!(!form.set_props(focused));
    assert!(!form.set_props(FormProps::default()));
    assert!(form.set_props(focused));
}
