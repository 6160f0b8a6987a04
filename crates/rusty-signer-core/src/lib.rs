pub mod domain;
pub mod form;
pub mod keyfile;
pub mod ports;
pub mod qr;
pub mod status;

pub use domain::{
    Account, AccountFlags, AccountKind, AccountMeta, Request, RequestError, RequestId,
    SignerContext, TxPayload, TxReceipt,
};
pub use form::{
    ConfirmForm, ConfirmOutcome, ConfirmPayload, FormError, FormKey, FormProps, Hint,
    NonceRequest, PasswordPrompt, PASSWORD_TOOLTIP,
};
pub use keyfile::{KeyfileError, WalletFile};
pub use ports::{BlockNumberPort, ConfirmSink, NoncePort, PortError, RequestStorePort};
pub use qr::{
    build_qr_payload, normalize_signature, qr_transition, QrAction, QrPayload, QrPhase,
    QrTransaction, SignedQrTx,
};
pub use status::{
    derive_state, format_grouped, progress_for, request_row, request_rows, status_message,
    Progress, RequestRow, RequestState, StatusMessage, CONFIRMATION_TARGET,
};
