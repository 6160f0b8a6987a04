pub mod config;
pub mod import;
pub mod keyfile;
pub mod node;
pub mod store;

pub use config::SignerAdapterConfig;
pub use import::{parse_accounts, parse_requests, AccountBook};
pub use keyfile::KeyfileReader;
pub use node::{parse_quantity, NodeAdapter};
pub use store::{ConfirmationRecord, InMemoryRequestStore};
