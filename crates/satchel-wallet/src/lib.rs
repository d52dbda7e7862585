//! # satchel-wallet: single-key UTXO wallet for a remote ledger.
//!
//! Stores one P-256 key per named wallet, asks the ledger which outputs to
//! spend, builds and signs transactions, and submits them over HTTP.
//!
//! # Modules
//!
//! - [`error`]: `WalletError` enum
//! - [`keys`]: PEM/JSON key files on disk
//! - [`coin_selection`]: validation of the ledger's spendable-output answer
//! - [`builder`]: transaction builder with signing
//! - [`ledger`]: blocking HTTP client for the ledger service
//! - [`config`]: endpoint, wallet directory and logging settings
//! - [`wallet`]: high-level wallet composition

pub mod builder;
pub mod coin_selection;
pub mod config;
pub mod error;
pub mod keys;
pub mod ledger;
pub mod wallet;

// Re-exports for convenient access
pub use builder::{Recipient, TransactionBuilder, UnsignedTransaction};
pub use coin_selection::{CoinSelection, CoinSelector};
pub use config::WalletConfig;
pub use error::WalletError;
pub use keys::KeyStore;
pub use ledger::HttpLedgerClient;
pub use wallet::Wallet;
