//! Coin selection delegated to the ledger.
//!
//! The ledger decides which outputs cover an amount; the wallet only turns
//! its answer into an ordered list of outpoints and rejects answers that
//! cannot be spent as-is.

use std::collections::HashSet;

use satchel_core::error::LedgerError;
use satchel_core::traits::LedgerService;
use satchel_core::types::{Hash256, OutPoint, PubKeyHash, SpendableOutputs};

use crate::error::WalletError;

/// Result of coin selection: which outputs to spend and their total value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// Outpoints to spend, txids in ascending hex order.
    pub outpoints: Vec<OutPoint>,
    /// Total value of the selected outputs, as reported by the ledger.
    pub total: u64,
}

impl CoinSelection {
    /// Value left over after sending `amount`.
    pub fn change(&self, amount: u64) -> u64 {
        self.total.saturating_sub(amount)
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.outpoints.is_empty()
    }
}

/// Asks the ledger for spendable outputs and validates the answer.
pub struct CoinSelector;

impl CoinSelector {
    /// Select outputs owned by `pubkey_hash` covering `target`.
    ///
    /// Does not check `total >= target`; that is the builder's job so the
    /// shortfall can be reported with both numbers.
    pub fn select(
        ledger: &dyn LedgerService,
        pubkey_hash: &PubKeyHash,
        target: u64,
    ) -> Result<CoinSelection, WalletError> {
        let answer = ledger.spendable_utxos(pubkey_hash, target)?;
        let selection = Self::from_spendable(answer)?;

        if target > 0 && selection.is_empty() {
            return Err(WalletError::NoUtxos);
        }

        tracing::debug!(
            inputs = selection.outpoints.len(),
            total = selection.total,
            target,
            "coin selection"
        );
        Ok(selection)
    }

    /// Convert a ledger answer into a selection.
    pub fn from_spendable(answer: SpendableOutputs) -> Result<CoinSelection, WalletError> {
        let mut outpoints = Vec::new();
        let mut seen = HashSet::new();

        // BTreeMap iteration gives ascending txid order.
        for (txid_hex, indices) in &answer.spendable {
            let txid = Hash256::from_hex(txid_hex).map_err(|e| {
                LedgerError::Malformed(format!("bad txid {txid_hex:?}: {e}"))
            })?;
            for &index in indices {
                let outpoint = OutPoint { txid, index };
                if !seen.insert(outpoint.clone()) {
                    return Err(WalletError::DuplicateInput(outpoint.to_string()));
                }
                outpoints.push(outpoint);
            }
        }

        Ok(CoinSelection {
            outpoints,
            total: answer.total,
        })
    }
}
