use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::B256;

use rusty_signer_core::{
    ConfirmPayload, ConfirmSink, PortError, Request, RequestError, RequestId, RequestStorePort,
    TxPayload, TxReceipt,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationRecord {
    pub id: RequestId,
    pub payload: ConfirmPayload,
}

#[derive(Debug, Default)]
struct StoreState {
    next_id: u64,
    requests: BTreeMap<RequestId, Request>,
    confirmations: Vec<ConfirmationRecord>,
}

/// Process-local request queue. Also acts as the confirm sink: payloads are
/// recorded for the signing backend to pick up and the request stays pending.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRequestStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("request store lock poisoned: {e}")))
    }

    /// Queues a new transaction request and returns its id.
    pub fn propose(&self, transaction: TxPayload) -> Result<RequestId, PortError> {
        let mut g = self.lock()?;
        g.next_id = g.next_id.saturating_add(1);
        let id = RequestId(g.next_id);
        g.requests.insert(id, Request::new(id, transaction));
        Ok(id)
    }

    pub fn confirmations(&self) -> Result<Vec<ConfirmationRecord>, PortError> {
        Ok(self.lock()?.confirmations.clone())
    }

    /// Hands over recorded confirmations and forgets them.
    pub fn drain_confirmations(&self) -> Result<Vec<ConfirmationRecord>, PortError> {
        Ok(std::mem::take(&mut self.lock()?.confirmations))
    }

    fn update<F>(&self, id: RequestId, f: F) -> Result<(), PortError>
    where
        F: FnOnce(&mut Request),
    {
        let mut g = self.lock()?;
        let request = g
            .requests
            .get_mut(&id)
            .ok_or_else(|| PortError::NotFound(format!("request {id}")))?;
        f(request);
        Ok(())
    }
}

impl RequestStorePort for InMemoryRequestStore {
    fn snapshot(&self) -> Result<BTreeMap<RequestId, Request>, PortError> {
        Ok(self.lock()?.requests.clone())
    }

    fn upsert(&self, request: Request) -> Result<(), PortError> {
        let mut g = self.lock()?;
        g.next_id = g.next_id.max(request.id.0);
        g.requests.insert(request.id, request);
        Ok(())
    }

    fn remove(&self, id: RequestId) -> Result<Option<Request>, PortError> {
        Ok(self.lock()?.requests.remove(&id))
    }

    fn mark_sent(&self, id: RequestId, hash: B256) -> Result<(), PortError> {
        self.update(id, |request| request.transaction_hash = Some(hash))
    }

    fn mark_mined(&self, id: RequestId, receipt: TxReceipt) -> Result<(), PortError> {
        self.update(id, |request| {
            if request.transaction_hash.is_none() {
                request.transaction_hash = receipt.transaction_hash;
            }
            request.transaction_receipt = Some(receipt);
        })
    }

    fn mark_failed(&self, id: RequestId, error: RequestError) -> Result<(), PortError> {
        self.update(id, |request| request.error = Some(error))
    }
}

impl ConfirmSink for InMemoryRequestStore {
    fn confirm_request(&self, id: RequestId, payload: ConfirmPayload) -> Result<(), PortError> {
        let mut g = self.lock()?;
        let request = g
            .requests
            .get(&id)
            .ok_or_else(|| PortError::NotFound(format!("request {id}")))?;
        if request.error.is_some() || request.transaction_receipt.is_some() {
            return Err(PortError::Validation(format!(
                "request {id} is no longer pending"
            )));
        }
        tracing::info!(%id, "confirmation recorded");
        g.confirmations.push(ConfirmationRecord { id, payload });
        Ok(())
    }
}
