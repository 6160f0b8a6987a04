//! Status derivation for the pending request list.
//!
//! Everything here is a pure function of a [`Request`] and the current chain
//! head; the list view re-runs it on every frame.

use alloy::primitives::{Address, B256, U256};

use crate::domain::{Request, RequestId, SignerContext, TxPayload};

/// Scale of the determinate progress bar.
pub const CONFIRMATION_TARGET: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Error,
    /// Mined; `block_height` is the distance from the chain head.
    Done { block_height: U256 },
    Waiting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Hidden,
    Indeterminate,
    Determinate { value: u32, max: u32 },
}

impl Progress {
    pub fn fraction(&self) -> Option<f32> {
        match self {
            Self::Determinate { value, max } if *max > 0 => Some(*value as f32 / *max as f32),
            Self::Determinate { .. } => Some(1.0),
            Self::Hidden | Self::Indeterminate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusMessage {
    Failed { title: String, text: String },
    Mined { block_number: U256 },
    Sent { hash: B256 },
    Pending,
}

impl StatusMessage {
    pub fn headline(&self) -> String {
        match self {
            Self::Failed { .. } => "An error occurred: ".to_owned(),
            Self::Mined { block_number } => {
                format!("Transaction mined at block #{}", format_grouped(*block_number))
            }
            Self::Sent { .. } => "Transaction sent to network with hash ".to_owned(),
            Self::Pending => "Transaction pending in Signer".to_owned(),
        }
    }

    /// Long value rendered in a scrollable field next to the headline.
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::Failed { text, .. } => Some(text.clone()),
            Self::Sent { hash } => Some(hash.to_string()),
            Self::Mined { .. } | Self::Pending => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub id: RequestId,
    pub from: Address,
    pub state: RequestState,
    pub progress: Progress,
    pub status: StatusMessage,
    pub transaction: TxPayload,
}

/// Error wins over receipt, receipt wins over everything else.
pub fn derive_state(request: &Request, current_block: U256) -> RequestState {
    if request.error.is_some() {
        return RequestState::Error;
    }
    if let Some(receipt) = request.transaction_receipt.as_ref() {
        return RequestState::Done {
            block_height: current_block.saturating_sub(receipt.block_number),
        };
    }
    RequestState::Waiting
}

pub fn progress_for(state: RequestState) -> Progress {
    match state {
        RequestState::Error => Progress::Hidden,
        // A receipt means the transaction is in; the bar is full at any depth.
        RequestState::Done { .. } => Progress::Determinate {
            value: CONFIRMATION_TARGET,
            max: CONFIRMATION_TARGET,
        },
        RequestState::Waiting => Progress::Indeterminate,
    }
}

pub fn status_message(request: &Request) -> StatusMessage {
    if let Some(error) = request.error.as_ref() {
        return StatusMessage::Failed {
            title: error.message.clone(),
            text: error.display_text().to_owned(),
        };
    }
    if let Some(receipt) = request.transaction_receipt.as_ref() {
        return StatusMessage::Mined {
            block_number: receipt.block_number,
        };
    }
    if let Some(hash) = request.transaction_hash {
        return StatusMessage::Sent { hash };
    }
    StatusMessage::Pending
}

pub fn request_row(request: &Request, current_block: U256) -> RequestRow {
    let state = derive_state(request, current_block);
    RequestRow {
        id: request.id,
        from: request.transaction.from,
        state,
        progress: progress_for(state),
        status: status_message(request),
        transaction: request.transaction.clone(),
    }
}

/// Rows in ascending request id order.
pub fn request_rows(ctx: &SignerContext) -> Vec<RequestRow> {
    ctx.requests
        .values()
        .map(|request| request_row(request, ctx.block_number))
        .collect()
}

/// Decimal with `,` thousands separators.
pub fn format_grouped(value: U256) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
