//! Local state of the confirmation form for a single pending request.
//!
//! The form never signs or submits. It collects credentials, drives the QR
//! phases for offline signers and returns a [`ConfirmPayload`] for the caller
//! to hand to its [`ConfirmSink`](crate::ports::ConfirmSink).

use alloy::primitives::{Address, U256};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{Account, AccountKind, RequestId, TxPayload};
use crate::keyfile::{KeyfileError, WalletFile};
use crate::ports::{NoncePort, PortError};
use crate::qr::{
    build_qr_payload, normalize_signature, qr_transition, QrAction, QrPayload, QrPhase,
    SignedQrTx,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("confirmation is disabled")]
    Disabled,
    #[error("illegal qr transition: {from} --{action}-->")]
    IllegalTransition { from: QrPhase, action: QrAction },
    #[error("no qr payload has been generated")]
    MissingQrPayload,
    #[error("stale nonce lookup result (ticket {ticket})")]
    StaleNonce { ticket: u64 },
    #[error("unable to fetch the next nonce: {0}")]
    NonceLookup(String),
}

/// Inputs owned by the caller rather than the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormProps {
    pub disabled: bool,
    pub is_sending: bool,
    pub focus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonceRequest {
    pub ticket: u64,
    pub address: Address,
}

/// Payload handed to the confirm sink. Serializes to `{password, wallet}`,
/// `{}` or `{txSigned: {rlp, signature, tx}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfirmPayload {
    PreSigned {
        #[serde(rename = "txSigned")]
        tx_signed: SignedQrTx,
    },
    Credentials {
        password: String,
        wallet: Option<WalletFile>,
    },
    Hardware {},
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// Resolve through a [`NoncePort`] and report back via
    /// [`ConfirmForm::nonce_resolved`].
    FetchNonce(NonceRequest),
    PhaseChanged(QrPhase),
    Submit(ConfirmPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    ExternalConfirm,
    ExternalScanTx,
    ExternalScanSigned,
    HardwareConfirm,
    HardwareConnect,
    Password(String),
}

impl Hint {
    pub fn message(&self) -> String {
        match self {
            Self::ExternalConfirm => {
                "Create a transaction QR code for scanning on your external device".to_owned()
            }
            Self::ExternalScanTx => {
                "Please scan the transaction QR on your external device".to_owned()
            }
            Self::ExternalScanSigned => {
                "Scan the QR code of the signed transaction from your external device".to_owned()
            }
            Self::HardwareConfirm => {
                "Please confirm the transaction on your attached hardware device".to_owned()
            }
            Self::HardwareConnect => {
                "Please attach your hardware device before confirming the transaction".to_owned()
            }
            Self::Password(hint) => format!("(hint) {hint}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPrompt {
    pub label: &'static str,
    pub hint: &'static str,
}

pub const PASSWORD_TOOLTIP: &str = "Please provide a password for this account";

#[derive(Debug, Clone)]
pub struct ConfirmForm {
    request_id: RequestId,
    account: Account,
    transaction: TxPayload,
    props: FormProps,
    password: String,
    wallet: Option<WalletFile>,
    wallet_error: Option<KeyfileError>,
    qr_phase: QrPhase,
    qr: Option<QrPayload>,
    last_ticket: u64,
    pending_ticket: Option<u64>,
    last_error: Option<String>,
}

impl ConfirmForm {
    pub fn new(request_id: RequestId, account: Account, transaction: TxPayload) -> Self {
        Self {
            request_id,
            account,
            transaction,
            props: FormProps::default(),
            password: String::new(),
            wallet: None,
            wallet_error: None,
            qr_phase: QrPhase::Invisible,
            qr: None,
            last_ticket: 0,
            pending_ticket: None,
            last_error: None,
        }
    }

    pub fn with_props(mut self, props: FormProps) -> Self {
        self.props = props;
        self
    }

    /// Replaces the caller-owned props. Returns true when focus was just
    /// requested, so the view can move keyboard focus to the password field.
    pub fn set_props(&mut self, props: FormProps) -> bool {
        let focus_gained = !self.props.focus && props.focus;
        self.props = props;
        focus_gained
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn transaction(&self) -> &TxPayload {
        &self.transaction
    }

    pub fn props(&self) -> FormProps {
        self.props
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn password_mut(&mut self) -> &mut String {
        &mut self.password
    }

    pub fn wallet(&self) -> Option<&WalletFile> {
        self.wallet.as_ref()
    }

    pub fn wallet_error(&self) -> Option<&KeyfileError> {
        self.wallet_error.as_ref()
    }

    pub fn qr_phase(&self) -> QrPhase {
        self.qr_phase
    }

    pub fn qr_payload(&self) -> Option<&QrPayload> {
        self.qr.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.pending_ticket.is_some()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    // ----- surfaces -----

    pub fn password_prompt(&self) -> Option<PasswordPrompt> {
        match self.account.kind {
            AccountKind::Unlocked { .. } => Some(PasswordPrompt {
                label: "Account Password",
                hint: "unlock the account",
            }),
            AccountKind::Keyfile => Some(PasswordPrompt {
                label: "Key Password",
                hint: "decrypt the key",
            }),
            AccountKind::External | AccountKind::Hardware => None,
        }
    }

    pub fn shows_keyfile_input(&self) -> bool {
        self.account.kind.uses_keyfile()
    }

    /// QR text, only while the unsigned transaction is on screen.
    pub fn qr_code_value(&self) -> Option<&str> {
        match (&self.account.kind, self.qr_phase) {
            (AccountKind::External, QrPhase::Visible) => {
                self.qr.as_ref().map(|qr| qr.value.as_str())
            }
            _ => None,
        }
    }

    pub fn shows_scanner(&self) -> bool {
        matches!(self.account.kind, AccountKind::External) && self.qr_phase == QrPhase::Scan
    }

    pub fn password_tooltip(&self) -> Option<&'static str> {
        if self.account.kind.uses_password() && self.password.is_empty() {
            Some(PASSWORD_TOOLTIP)
        } else {
            None
        }
    }

    // ----- derived state -----

    pub fn is_wallet_ok(&self) -> bool {
        match self.account.kind {
            AccountKind::Keyfile => self.wallet.is_some() && self.wallet_error.is_none(),
            AccountKind::External | AccountKind::Hardware | AccountKind::Unlocked { .. } => true,
        }
    }

    pub fn can_confirm(&self) -> bool {
        if self.props.disabled || self.props.is_sending || !self.is_wallet_ok() {
            return false;
        }
        match self.account.kind {
            AccountKind::External => matches!(self.qr_phase, QrPhase::Invisible | QrPhase::Visible),
            AccountKind::Hardware | AccountKind::Unlocked { .. } | AccountKind::Keyfile => true,
        }
    }

    /// `None` means no confirm button is rendered.
    pub fn confirm_label(&self) -> Option<&'static str> {
        if let AccountKind::External = self.account.kind {
            return match self.qr_phase {
                QrPhase::Invisible | QrPhase::Generating => Some("External Confirm"),
                QrPhase::Visible => Some("Scan Signed QR"),
                QrPhase::Scan | QrPhase::Completed => None,
            };
        }
        if self.props.is_sending {
            Some("Confirming...")
        } else {
            Some("Confirm Request")
        }
    }

    pub fn password_hint(&self) -> Option<&str> {
        self.account
            .password_hint()
            .or_else(|| self.wallet.as_ref().and_then(WalletFile::password_hint))
    }

    /// Exactly one hint: qr phase, then hardware state, then password hint.
    pub fn hint(&self) -> Option<Hint> {
        match self.account.kind {
            AccountKind::External => {
                return match self.qr_phase {
                    QrPhase::Invisible | QrPhase::Generating => Some(Hint::ExternalConfirm),
                    QrPhase::Visible => Some(Hint::ExternalScanTx),
                    QrPhase::Scan => Some(Hint::ExternalScanSigned),
                    QrPhase::Completed => None,
                };
            }
            AccountKind::Hardware if self.props.is_sending => return Some(Hint::HardwareConfirm),
            AccountKind::Hardware if self.props.disabled => return Some(Hint::HardwareConnect),
            _ => {}
        }
        self.password_hint()
            .map(|hint| Hint::Password(hint.to_owned()))
    }

    // ----- events -----

    pub fn confirm(&mut self) -> Result<ConfirmOutcome, FormError> {
        if !self.can_confirm() {
            return Err(FormError::Disabled);
        }

        match self.account.kind {
            AccountKind::External => self.advance_qr(),
            AccountKind::Hardware => Ok(ConfirmOutcome::Submit(ConfirmPayload::Hardware {})),
            AccountKind::Unlocked { .. } | AccountKind::Keyfile => {
                Ok(ConfirmOutcome::Submit(ConfirmPayload::Credentials {
                    password: self.password.clone(),
                    wallet: self.wallet.clone(),
                }))
            }
        }
    }

    /// Keyboard handler of the password field. Enter behaves like the button.
    pub fn on_key_down(&mut self, key: FormKey) -> Result<Option<ConfirmOutcome>, FormError> {
        match key {
            FormKey::Enter => self.confirm().map(Some),
            FormKey::Other => Ok(None),
        }
    }

    fn advance_qr(&mut self) -> Result<ConfirmOutcome, FormError> {
        match self.qr_phase {
            QrPhase::Invisible => {
                let (next, _) = qr_transition(self.qr_phase, QrAction::RequestPayload)?;
                self.last_ticket = self.last_ticket.wrapping_add(1);
                self.pending_ticket = Some(self.last_ticket);
                self.qr_phase = next;
                self.last_error = None;
                Ok(ConfirmOutcome::FetchNonce(NonceRequest {
                    ticket: self.last_ticket,
                    address: self.transaction.from,
                }))
            }
            phase => {
                let (next, _) = qr_transition(phase, QrAction::StartScan)?;
                self.qr_phase = next;
                Ok(ConfirmOutcome::PhaseChanged(next))
            }
        }
    }

    /// Applies the result of a nonce lookup. A failure reverts to `Invisible`
    /// and leaves a dismissible error; results for an old ticket are dropped.
    pub fn nonce_resolved(
        &mut self,
        ticket: u64,
        result: Result<U256, PortError>,
    ) -> Result<QrPhase, FormError> {
        if self.pending_ticket != Some(ticket) {
            return Err(FormError::StaleNonce { ticket });
        }
        self.pending_ticket = None;

        match result {
            Ok(nonce) => {
                let (next, _) = qr_transition(self.qr_phase, QrAction::PayloadReady)?;
                self.qr = Some(build_qr_payload(&self.transaction, nonce));
                self.qr_phase = next;
                Ok(next)
            }
            Err(err) => {
                let (next, _) = qr_transition(self.qr_phase, QrAction::PayloadFailed)?;
                self.qr = None;
                self.qr_phase = next;
                let err = FormError::NonceLookup(err.to_string());
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Runs the whole confirm step against a blocking nonce port.
    pub fn confirm_with<P>(&mut self, nonces: &P) -> Result<ConfirmOutcome, FormError>
    where
        P: NoncePort + ?Sized,
    {
        match self.confirm()? {
            ConfirmOutcome::FetchNonce(request) => {
                let result = nonces.next_nonce(request.address);
                let phase = self.nonce_resolved(request.ticket, result)?;
                Ok(ConfirmOutcome::PhaseChanged(phase))
            }
            outcome => Ok(outcome),
        }
    }

    /// Signed result from the scanner. Moves to `Completed` and returns the
    /// pre-signed payload; the form is inert afterwards.
    pub fn scan_received(&mut self, raw_signature: &str) -> Result<ConfirmPayload, FormError> {
        let (next, _) = qr_transition(self.qr_phase, QrAction::ScanReceived)?;
        let qr = self.qr.as_ref().ok_or(FormError::MissingQrPayload)?;
        let payload = ConfirmPayload::PreSigned {
            tx_signed: SignedQrTx {
                rlp: qr.rlp.clone(),
                signature: normalize_signature(raw_signature),
                tx: qr.tx.clone(),
            },
        };
        self.qr_phase = next;
        Ok(payload)
    }

    /// `None` when the selection was cleared.
    pub fn select_keyfile(&mut self, contents: Option<&str>) {
        match contents.map(WalletFile::parse) {
            None => {
                self.wallet = None;
                self.wallet_error = None;
            }
            Some(Ok(wallet)) => {
                self.wallet = Some(wallet);
                self.wallet_error = None;
            }
            Some(Err(err)) => self.keyfile_failed(err),
        }
    }

    pub fn keyfile_failed(&mut self, err: KeyfileError) {
        self.wallet = None;
        self.wallet_error = Some(err);
    }
}
