//! Shared test helpers: a UTXO book and an in-memory ledger.

use std::cell::RefCell;
use std::collections::BTreeMap;

use satchel_core::crypto::verify_transaction_input;
use satchel_core::error::LedgerError;
use satchel_core::traits::LedgerService;
use satchel_core::types::{Hash256, OutPoint, PubKeyHash, SpendableOutputs, Transaction, TxOutput};

/// Simple pubkey hash from a seed byte.
pub fn pkh(seed: u8) -> PubKeyHash {
    PubKeyHash([seed; 20])
}

/// Simple txid from a seed byte.
pub fn txid(seed: u8) -> Hash256 {
    Hash256([seed; 32])
}

/// Unspent outputs known to a test ledger, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct UtxoBook {
    entries: Vec<(OutPoint, TxOutput)>,
}

impl UtxoBook {
    /// Empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unspent output.
    pub fn fund(&mut self, txid: Hash256, index: u64, value: u64, owner: PubKeyHash) {
        self.entries.push((
            OutPoint { txid, index },
            TxOutput {
                value,
                pubkey_hash: owner,
            },
        ));
    }

    /// Outputs locked to `owner`.
    pub fn utxos(&self, owner: &PubKeyHash) -> Vec<TxOutput> {
        self.entries
            .iter()
            .filter(|(_, out)| out.pubkey_hash == *owner)
            .map(|(_, out)| out.clone())
            .collect()
    }

    /// Greedy selection in insertion order until `amount` is covered. When
    /// the owner cannot cover it, every owned output is returned.
    pub fn spendable(&self, owner: &PubKeyHash, amount: u64) -> SpendableOutputs {
        let mut total = 0u64;
        let mut spendable: BTreeMap<String, Vec<u64>> = BTreeMap::new();
        for (outpoint, out) in self.entries.iter().filter(|(_, o)| o.pubkey_hash == *owner) {
            if total >= amount && amount > 0 {
                break;
            }
            total += out.value;
            spendable
                .entry(outpoint.txid.to_hex())
                .or_default()
                .push(outpoint.index);
        }
        SpendableOutputs { total, spendable }
    }

    /// Check signatures and inputs, then spend the inputs and add the
    /// outputs under `tx.id`.
    pub fn apply(&mut self, tx: &Transaction) -> Result<(), String> {
        if tx.inputs.is_empty() {
            return Err("transaction has no inputs".into());
        }
        if tx.txid().map_err(|e| e.to_string())? != tx.id {
            return Err("transaction id mismatch".into());
        }
        for (i, input) in tx.inputs.iter().enumerate() {
            if !self.entries.iter().any(|(op, _)| *op == input.previous_output) {
                return Err(format!("input {i} spends unknown output {}", input.previous_output));
            }
            verify_transaction_input(tx, i).map_err(|e| format!("input {i}: {e}"))?;
        }

        self.entries
            .retain(|(op, _)| !tx.inputs.iter().any(|input| input.previous_output == *op));
        for (index, out) in tx.outputs.iter().enumerate() {
            self.entries.push((
                OutPoint {
                    txid: tx.id,
                    index: index as u64,
                },
                out.clone(),
            ));
        }
        Ok(())
    }
}

/// In-memory [`LedgerService`] that validates and applies submissions.
#[derive(Debug, Default)]
pub struct FakeLedger {
    book: RefCell<UtxoBook>,
    submitted: RefCell<Vec<Transaction>>,
    reject: Option<LedgerError>,
}

impl FakeLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger that refuses every submission with `error`.
    pub fn rejecting(error: LedgerError) -> Self {
        Self {
            reject: Some(error),
            ..Self::default()
        }
    }

    /// Add an unspent output.
    pub fn fund(&self, txid: Hash256, index: u64, value: u64, owner: PubKeyHash) {
        self.book.borrow_mut().fund(txid, index, value, owner);
    }

    /// Transactions accepted so far.
    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.borrow().clone()
    }
}

impl LedgerService for FakeLedger {
    fn utxos(&self, pubkey_hash: &PubKeyHash) -> Result<Vec<TxOutput>, LedgerError> {
        Ok(self.book.borrow().utxos(pubkey_hash))
    }

    fn spendable_utxos(
        &self,
        pubkey_hash: &PubKeyHash,
        amount: u64,
    ) -> Result<SpendableOutputs, LedgerError> {
        Ok(self.book.borrow().spendable(pubkey_hash, amount))
    }

    fn submit_transaction(&self, tx: &Transaction) -> Result<(), LedgerError> {
        if let Some(e) = &self.reject {
            return Err(e.clone());
        }
        self.book
            .borrow_mut()
            .apply(tx)
            .map_err(|message| LedgerError::Status {
                status: 400,
                message,
            })?;
        self.submitted.borrow_mut().push(tx.clone());
        Ok(())
    }
}
