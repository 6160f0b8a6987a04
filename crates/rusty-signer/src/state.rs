use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use rusty_signer_core::{RequestId, SignerContext};

use crate::confirm_view::ConfirmView;

/// Single-value hand-off from a worker thread to the frame loop. A newer
/// value overwrites one that was not taken yet.
pub struct Slot<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(None)),
        }
    }
}

impl<T> Slot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, value: T) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    pub fn take(&self) -> Option<T> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

pub const PREFS_KEY: &str = "rusty-signer-prefs";

/// Settings kept across restarts through eframe storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerPrefs {
    /// Last keyfile that loaded successfully, per account.
    pub keyfile_paths: BTreeMap<Address, String>,
}

#[derive(Default)]
pub struct SignerUiState {
    pub selected: Option<RequestId>,
    /// One confirm view per request that was opened at least once.
    pub views: BTreeMap<RequestId, ConfirmView>,
    /// Requests whose payload was accepted by the sink and that have no
    /// outcome yet.
    pub sending: BTreeSet<RequestId>,
    pub last_error: Option<String>,
    pub last_info: Option<String>,
}

impl SignerUiState {
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.last_info = None;
        self.last_error = Some(message.into());
    }

    pub fn set_info(&mut self, message: impl Into<String>) {
        self.last_error = None;
        self.last_info = Some(message.into());
    }

    pub fn clear_notice(&mut self) {
        self.last_error = None;
        self.last_info = None;
    }

    /// Moves the selection, taking keyboard focus away from the previous form.
    pub fn select(&mut self, id: RequestId) {
        if self.selected == Some(id) {
            return;
        }
        if let Some(previous) = self.selected.and_then(|prev| self.views.get_mut(&prev)) {
            previous.blur();
        }
        self.selected = Some(id);
    }

    /// Drops views of requests that left the store and clears `sending` for
    /// requests that got a hash, a receipt or an error.
    pub fn settle(&mut self, ctx: &SignerContext) {
        self.views.retain(|id, _| ctx.requests.contains_key(id));
        if self
            .selected
            .is_some_and(|id| !ctx.requests.contains_key(&id))
        {
            self.selected = None;
        }
        self.sending.retain(|id| {
            ctx.requests.get(id).is_some_and(|request| {
                request.error.is_none()
                    && request.transaction_hash.is_none()
                    && request.transaction_receipt.is_none()
            })
        });
    }
}
