//! Trait interfaces for the Satchel wallet.
//!
//! - [`LedgerService`]: the remote ledger/UTXO index. satchel-wallet's
//!   `HttpLedgerClient` implements it over HTTP.

use crate::error::LedgerError;
use crate::types::{PubKeyHash, SpendableOutputs, Transaction, TxOutput};

/// Narrow capability over the remote ledger service.
///
/// The wallet never keeps a UTXO set of its own: every call is a fresh read
/// or a submission. Answers are untrusted input and are validated by the
/// caller.
pub trait LedgerService {
    /// All unspent outputs owned by `pubkey_hash`.
    fn utxos(&self, pubkey_hash: &PubKeyHash) -> Result<Vec<TxOutput>, LedgerError>;

    /// A selection of outputs owned by `pubkey_hash` whose total covers
    /// `amount`, chosen by the ledger.
    fn spendable_utxos(
        &self,
        pubkey_hash: &PubKeyHash,
        amount: u64,
    ) -> Result<SpendableOutputs, LedgerError>;

    /// Hand a finished transaction to the ledger.
    fn submit_transaction(&self, tx: &Transaction) -> Result<(), LedgerError>;

    /// Sum of all unspent output values owned by `pubkey_hash`.
    ///
    /// Default implementation delegates to [`utxos`](Self::utxos).
    fn balance(&self, pubkey_hash: &PubKeyHash) -> Result<u64, LedgerError> {
        self.utxos(pubkey_hash)?
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
            .ok_or_else(|| LedgerError::Malformed("balance overflows u64".into()))
    }
}
