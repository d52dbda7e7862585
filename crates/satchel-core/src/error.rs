//! Error types for the Satchel wallet core.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("serialization: {0}")] Serialization(String),
    #[error("value overflow")] ValueOverflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("invalid private key: {0}")] InvalidPrivateKey(String),
    #[error("invalid signature bytes")] InvalidSignature,
    #[error("signature verification failed")] VerificationFailed,
    #[error("input {0} is not signed")] MissingSignature(usize),
    #[error("signing failed: {0}")] SigningFailed(String),
    #[error("input index out of bounds: {index} >= {len}")] InputIndexOutOfBounds { index: usize, len: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58: {0}")] InvalidEncoding(String),
    #[error("invalid checksum")] InvalidChecksum,
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid version: {0}")] InvalidVersion(u8),
}

/// Failures reaching or interpreting the remote ledger service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger unreachable: {0}")] Transport(String),
    #[error("ledger returned {status}: {message}")] Status { status: u16, message: String },
    #[error("malformed ledger response: {0}")] Malformed(String),
}
