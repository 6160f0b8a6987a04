//! Offline signing over QR: the phase machine plus the payloads exchanged
//! with the external device.

use std::fmt;

use alloy::primitives::{hex, Address, Bytes, U256};
use alloy::rlp::{Encodable, Header};
use serde::{Deserialize, Serialize};

use crate::domain::TxPayload;
use crate::form::FormError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QrPhase {
    /// Nothing shown yet.
    Invisible,
    /// Nonce lookup in flight. Rendered like `Invisible` with the button locked.
    Generating,
    /// Unsigned transaction QR on screen.
    Visible,
    /// Camera/scanner surface waiting for the signed result.
    Scan,
    Completed,
}

impl fmt::Display for QrPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Invisible => "invisible",
            Self::Generating => "generating",
            Self::Visible => "visible",
            Self::Scan => "scan",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrAction {
    RequestPayload,
    PayloadReady,
    PayloadFailed,
    StartScan,
    ScanReceived,
}

impl fmt::Display for QrAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

pub fn qr_transition(
    from: QrPhase,
    action: QrAction,
) -> Result<(QrPhase, &'static str), FormError> {
    match (from, action) {
        (QrPhase::Invisible, QrAction::RequestPayload) => {
            Ok((QrPhase::Generating, "nonce lookup started"))
        }
        (QrPhase::Generating, QrAction::PayloadReady) => {
            Ok((QrPhase::Visible, "unsigned transaction ready"))
        }
        (QrPhase::Generating, QrAction::PayloadFailed) => {
            Ok((QrPhase::Invisible, "nonce lookup failed"))
        }
        (QrPhase::Visible, QrAction::StartScan) => Ok((QrPhase::Scan, "awaiting signed qr")),
        (QrPhase::Scan, QrAction::ScanReceived) => {
            Ok((QrPhase::Completed, "signature forwarded"))
        }
        (from, action) => Err(FormError::IllegalTransition { from, action }),
    }
}

/// Unsigned legacy transaction as encoded into the QR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrTransaction {
    pub to: Option<Address>,
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub value: U256,
    pub data: Bytes,
}

impl QrTransaction {
    /// A nonce carried by the request wins over the fetched one.
    pub fn from_payload(tx: &TxPayload, fetched_nonce: U256) -> Self {
        Self {
            to: tx.to,
            nonce: tx.explicit_nonce().unwrap_or(fetched_nonce),
            gas_price: tx.gas_price,
            gas_limit: tx.gas,
            value: tx.value,
            data: tx.data.clone(),
        }
    }

    /// Nine item legacy list with empty `v`, `r`, `s`.
    pub fn rlp_unsigned(&self) -> Vec<u8> {
        let empty: &[u8] = &[];
        let to: &[u8] = self.to.as_ref().map_or(empty, |to| to.as_slice());

        let payload_length = self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + to.length()
            + self.value.length()
            + self.data.length()
            + 3 * empty.length();

        let mut out = Vec::with_capacity(payload_length + 3);
        Header {
            list: true,
            payload_length,
        }
        .encode(&mut out);
        self.nonce.encode(&mut out);
        self.gas_price.encode(&mut out);
        self.gas_limit.encode(&mut out);
        to.encode(&mut out);
        self.value.encode(&mut out);
        self.data.encode(&mut out);
        for _ in 0..3 {
            empty.encode(&mut out);
        }
        out
    }

    pub fn rlp_hex(&self) -> String {
        hex::encode_prefixed(self.rlp_unsigned())
    }
}

/// Everything the form needs to show the QR and later forward the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    pub nonce: U256,
    pub tx: QrTransaction,
    /// `0x`-prefixed unsigned RLP.
    pub rlp: String,
    /// Text encoded in the QR code.
    pub value: String,
}

/// The QR text drops the `0x` markers; offline signers expect bare hex.
pub fn build_qr_payload(tx: &TxPayload, fetched_nonce: U256) -> QrPayload {
    let qr_tx = QrTransaction::from_payload(tx, fetched_nonce);
    let rlp = qr_tx.rlp_hex();
    let from = tx.from.to_checksum(None);
    let value = serde_json::json!({
        "from": from.trim_start_matches("0x"),
        "rlp": rlp.trim_start_matches("0x"),
    })
    .to_string();

    QrPayload {
        nonce: qr_tx.nonce,
        tx: qr_tx,
        rlp,
        value,
    }
}

/// Adds the `0x` marker when the scanner returned bare hex. Nothing else is
/// validated here; the confirm sink owns signature checks.
pub fn normalize_signature(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("0x") {
        raw.to_owned()
    } else {
        format!("0x{raw}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedQrTx {
    pub rlp: String,
    pub signature: String,
    pub tx: QrTransaction,
}
