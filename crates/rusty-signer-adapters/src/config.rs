use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_RPC_URL: &str = "RUSTY_SIGNER_RPC_URL";
pub const ENV_RPC_TIMEOUT_MS: &str = "RUSTY_SIGNER_RPC_TIMEOUT_MS";
pub const ENV_BLOCK_POLL_MS: &str = "RUSTY_SIGNER_BLOCK_POLL_MS";
pub const ENV_KEYFILE_MAX_BYTES: &str = "RUSTY_SIGNER_KEYFILE_MAX_BYTES";
pub const ENV_OFFLINE_NONCE: &str = "RUSTY_SIGNER_OFFLINE_NONCE";
pub const ENV_OFFLINE_BLOCK: &str = "RUSTY_SIGNER_OFFLINE_BLOCK";
pub const ENV_ACCOUNTS_PATH: &str = "RUSTY_SIGNER_ACCOUNTS";
pub const ENV_REQUESTS_PATH: &str = "RUSTY_SIGNER_REQUESTS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerAdapterConfig {
    /// JSON-RPC endpoint. Without one the node adapter runs deterministic.
    pub rpc_url: Option<String>,
    pub rpc_timeout_ms: u64,
    pub block_poll_interval_ms: u64,
    pub keyfile_max_bytes: usize,
    pub offline_nonce: u64,
    pub offline_block_number: u64,
    pub accounts_path: Option<PathBuf>,
    /// Requests queued at startup.
    pub requests_path: Option<PathBuf>,
}

impl Default for SignerAdapterConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            rpc_timeout_ms: 15_000,
            block_poll_interval_ms: 4_000,
            keyfile_max_bytes: 256 * 1024,
            offline_nonce: 0,
            offline_block_number: 0,
            accounts_path: None,
            requests_path: None,
        }
    }
}

impl SignerAdapterConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Unparseable values keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            rpc_url: lookup(ENV_RPC_URL)
                .map(|url| url.trim().to_owned())
                .filter(|url| !url.is_empty()),
            rpc_timeout_ms: parse_or(&lookup, ENV_RPC_TIMEOUT_MS, defaults.rpc_timeout_ms),
            block_poll_interval_ms: parse_or(
                &lookup,
                ENV_BLOCK_POLL_MS,
                defaults.block_poll_interval_ms,
            )
            .max(250),
            keyfile_max_bytes: parse_or(
                &lookup,
                ENV_KEYFILE_MAX_BYTES,
                defaults.keyfile_max_bytes,
            ),
            offline_nonce: parse_or(&lookup, ENV_OFFLINE_NONCE, defaults.offline_nonce),
            offline_block_number: parse_or(
                &lookup,
                ENV_OFFLINE_BLOCK,
                defaults.offline_block_number,
            ),
            accounts_path: path_from(&lookup, ENV_ACCOUNTS_PATH),
            requests_path: path_from(&lookup, ENV_REQUESTS_PATH),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.rpc_url.is_none()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

fn path_from<F>(lookup: &F, key: &str) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| raw.trim().to_owned())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}
