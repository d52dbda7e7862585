//! Wallet error types.

use satchel_core::error::{AddressError, CryptoError, LedgerError, TransactionError};
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The selected outputs do not cover the amount to send.
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds {
        /// Total value of the selected outputs.
        have: u64,
        /// Amount requested.
        need: u64,
    },

    /// The ledger reported no spendable outputs.
    #[error("no UTXOs available")]
    NoUtxos,

    /// The ledger listed the same output twice.
    #[error("duplicate input: {0}")]
    DuplicateInput(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Key file exists but cannot be decoded.
    #[error("key decode: {0}")]
    KeyDecode(String),

    /// No key file for the named wallet.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// A key file for the named wallet already exists.
    #[error("wallet already exists: {0}")]
    WalletExists(String),

    /// Wallet names become file names and must stay inside the wallet dir.
    #[error("invalid wallet name: {0:?}")]
    InvalidWalletName(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Serialization error.
    #[error("serialization: {0}")]
    Serialization(String),

    /// Cryptographic error from satchel-core.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Transaction encoding error from satchel-core.
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Ledger transport or protocol error.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<AddressError> for WalletError {
    fn from(e: AddressError) -> Self {
        WalletError::InvalidAddress(e.to_string())
    }
}
