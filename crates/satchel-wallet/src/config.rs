//! Wallet configuration.
//!
//! Defaults, overlaid by environment variables, overlaid by command-line
//! flags in the CLI.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::WalletError;
use crate::keys::KeyStore;
use crate::ledger::HttpLedgerClient;

/// Default ledger endpoint.
pub const DEFAULT_RPC_ENDPOINT: &str = "http://localhost:8080";

/// Default directory for key files, relative to the working directory.
pub const DEFAULT_WALLET_DIR: &str = "./wallets";

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding [`WalletConfig::rpc_endpoint`].
pub const ENV_RPC_ENDPOINT: &str = "SATCHEL_RPC_ENDPOINT";
/// Environment variable overriding [`WalletConfig::wallet_dir`].
pub const ENV_WALLET_DIR: &str = "SATCHEL_WALLET_DIR";
/// Environment variable setting [`WalletConfig::request_timeout`] in seconds.
pub const ENV_TIMEOUT_SECS: &str = "SATCHEL_TIMEOUT_SECS";
/// Environment variable overriding [`WalletConfig::log_level`].
pub const ENV_LOG: &str = "SATCHEL_LOG";

/// Runtime settings for a wallet session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletConfig {
    /// Base URL of the ledger service.
    pub rpc_endpoint: String,
    /// Directory holding `<name>.json` key files.
    pub wallet_dir: PathBuf,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            rpc_endpoint: DEFAULT_RPC_ENDPOINT.to_owned(),
            wallet_dir: PathBuf::from(DEFAULT_WALLET_DIR),
            request_timeout: None,
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}

impl WalletConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, WalletError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Empty values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WalletError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(endpoint) = get(ENV_RPC_ENDPOINT) {
            config.rpc_endpoint = endpoint;
        }
        if let Some(dir) = get(ENV_WALLET_DIR) {
            config.wallet_dir = expand_home(Path::new(&dir));
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.request_timeout = Some(parse_timeout(&secs)?);
        }
        if let Some(level) = get(ENV_LOG) {
            config.log_level = level;
        }
        Ok(config)
    }

    /// Key store over [`wallet_dir`](Self::wallet_dir).
    pub fn key_store(&self) -> KeyStore {
        KeyStore::new(expand_home(&self.wallet_dir))
    }

    /// HTTP ledger client for [`rpc_endpoint`](Self::rpc_endpoint).
    pub fn ledger_client(&self) -> Result<HttpLedgerClient, WalletError> {
        Ok(HttpLedgerClient::with_timeout(
            self.rpc_endpoint.clone(),
            self.request_timeout,
        )?)
    }
}

/// Parse a positive whole number of seconds.
pub fn parse_timeout(secs: &str) -> Result<Duration, WalletError> {
    match secs.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(WalletError::InvalidConfig(format!(
            "{ENV_TIMEOUT_SECS}: expected a positive number of seconds, got {secs:?}"
        ))),
        Ok(n) => Ok(Duration::from_secs(n)),
    }
}

/// Replace a leading `~` with the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
