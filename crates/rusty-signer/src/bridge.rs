//! Bridge between the egui shell and the signer workspace crates.
//! This must remain the only shell-facing boundary for adapter access.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{keccak256, Address, U256};
use eyre::WrapErr;

use rusty_signer_adapters::import::read_text;
use rusty_signer_adapters::{
    parse_accounts, parse_requests, AccountBook, InMemoryRequestStore, KeyfileReader,
    NodeAdapter, SignerAdapterConfig,
};
use rusty_signer_core::{
    Account, ConfirmPayload, ConfirmSink, PortError, RequestError, RequestId, RequestStorePort,
    SignerContext, TxReceipt,
};

use crate::demo;

#[derive(Clone)]
pub struct SignerBridge {
    node: NodeAdapter,
    store: InMemoryRequestStore,
    accounts: Arc<AccountBook>,
    keyfiles: KeyfileReader,
    poll_interval: Duration,
}

impl SignerBridge {
    pub fn from_config(config: &SignerAdapterConfig) -> eyre::Result<Self> {
        let node = NodeAdapter::with_config(config.clone());
        let store = InMemoryRequestStore::new();

        let mut accounts = match &config.accounts_path {
            Some(path) => {
                let text = read_text(path)?;
                parse_accounts(&text)
                    .wrap_err_with(|| format!("loading accounts from {}", path.display()))?
            }
            None => AccountBook::default(),
        };

        match &config.requests_path {
            Some(path) => {
                let text = read_text(path)?;
                let requests = parse_requests(&text)
                    .wrap_err_with(|| format!("loading requests from {}", path.display()))?;
                tracing::info!(count = requests.len(), "queued requests from file");
                for request in requests {
                    store.upsert(request)?;
                }
            }
            None if node.is_deterministic() => {
                tracing::info!("no node and no request file, seeding demo requests");
                if accounts.is_empty() {
                    accounts = demo::accounts();
                }
                let head = if config.offline_block_number == 0 {
                    node.debug_set_block_number(U256::from(demo::DEMO_BLOCK))?;
                    U256::from(demo::DEMO_BLOCK)
                } else {
                    U256::from(config.offline_block_number)
                };
                demo::seed(&store, head)?;
            }
            None => {}
        }

        Ok(Self {
            node,
            store,
            accounts: Arc::new(accounts),
            keyfiles: KeyfileReader::new(config.keyfile_max_bytes),
            poll_interval: Duration::from_millis(config.block_poll_interval_ms),
        })
    }

    pub fn context(&self, block_number: U256) -> Result<SignerContext, PortError> {
        Ok(SignerContext::new(block_number, self.store.snapshot()?))
    }

    pub fn account_for(&self, address: Address) -> Account {
        self.accounts.resolve(address)
    }

    pub fn confirm(&self, id: RequestId, payload: ConfirmPayload) -> Result<(), PortError> {
        self.store.confirm_request(id, payload)
    }

    pub fn node(&self) -> NodeAdapter {
        self.node.clone()
    }

    pub fn keyfiles(&self) -> KeyfileReader {
        self.keyfiles
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn is_offline(&self) -> bool {
        self.node.is_deterministic()
    }

    // ----- offline simulation -----

    /// Bumps the deterministic chain head by one block.
    pub fn advance_block(&self, current: U256) -> Result<U256, PortError> {
        let next = current.saturating_add(U256::from(1));
        self.node.debug_set_block_number(next)?;
        Ok(next)
    }

    pub fn simulate_sent(&self, id: RequestId) -> Result<(), PortError> {
        self.offline_only()?;
        self.store.mark_sent(id, keccak256(id.0.to_be_bytes()))
    }

    pub fn simulate_mined(&self, id: RequestId, block_number: U256) -> Result<(), PortError> {
        self.offline_only()?;
        self.store.mark_mined(
            id,
            TxReceipt {
                block_number,
                transaction_hash: Some(keccak256(id.0.to_be_bytes())),
            },
        )
    }

    pub fn simulate_failed(&self, id: RequestId) -> Result<(), PortError> {
        self.offline_only()?;
        self.store.mark_failed(
            id,
            RequestError {
                text: Some("rejected by the offline node".to_owned()),
                ..RequestError::new("Transaction rejected")
            },
        )
    }

    fn offline_only(&self) -> Result<(), PortError> {
        if self.node.is_deterministic() {
            Ok(())
        } else {
            Err(PortError::NotImplemented(
                "request simulation needs the deterministic node",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_signer_core::{request_rows, BlockNumberPort, RequestState};

    #[test]
    fn offline_bridge_starts_with_demo_requests() {
        let bridge = SignerBridge::from_config(&SignerAdapterConfig::default())
            .expect("offline bridge");
        assert!(bridge.is_offline());

        let head = bridge.node().block_number().expect("block number");
        assert_eq!(head, U256::from(demo::DEMO_BLOCK));

        let ctx = bridge.context(head).expect("snapshot");
        let rows = request_rows(&ctx);
        assert!(rows.iter().any(|row| row.state == RequestState::Error));
        assert!(rows.iter().any(|row| matches!(row.state, RequestState::Done { .. })));
        assert!(rows.iter().any(|row| row.state == RequestState::Waiting));
    }

    #[test]
    fn simulation_walks_a_request_to_mined() {
        let bridge = SignerBridge::from_config(&SignerAdapterConfig::default())
            .expect("offline bridge");
        let ctx = bridge.context(U256::ZERO).expect("snapshot");
        let (&id, _) = ctx
            .requests
            .iter()
            .find(|(_, request)| request.transaction_hash.is_none() && request.error.is_none())
            .expect("a pending demo request");

        bridge.simulate_sent(id).expect("sent");
        let head = bridge
            .advance_block(U256::from(demo::DEMO_BLOCK))
            .expect("advance");
        bridge.simulate_mined(id, head).expect("mined");

        let ctx = bridge.context(head).expect("snapshot");
        let request = &ctx.requests[&id];
        assert!(request.transaction_hash.is_some());
        assert_eq!(
            request.transaction_receipt.as_ref().map(|r| r.block_number),
            Some(head)
        );
    }
}
