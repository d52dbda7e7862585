//! Transaction builder with signing.
//!
//! Building a payment takes two steps:
//! 1. Build an unsigned transaction from a coin selection and a recipient.
//!    Change goes back to the sender's own address.
//! 2. Sign every input with the sender's key.

use std::collections::HashSet;

use satchel_core::address::Address;
use satchel_core::crypto::{sign_transaction_inputs, PrivateKey, PublicKey};
use satchel_core::types::{Hash256, Transaction, TxInput, TxOutput};

use crate::coin_selection::CoinSelection;
use crate::error::WalletError;

/// A transaction recipient: address and amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Destination address.
    pub address: Address,
    /// Amount to send.
    pub amount: u64,
}

/// An unsigned transaction ready for signing.
#[derive(Debug, Clone)]
pub struct UnsignedTransaction {
    /// The transaction with its identifier assigned and no signatures.
    pub tx: Transaction,
    /// Positions of the inputs that still need a signature.
    pub inputs_to_sign: Vec<usize>,
}

/// Builds payments spending outputs owned by a single public key.
///
/// # Example
/// ```ignore
/// let builder = TransactionBuilder::new(key.public_key());
/// let selection = CoinSelector::select(&ledger, &builder.change_address().pubkey_hash(), 120)?;
/// let tx = builder.build_signed(&selection, &Recipient { address, amount: 120 }, &key)?;
/// ```
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    sender: PublicKey,
    change_address: Address,
}

impl TransactionBuilder {
    /// Builder for payments from `sender`.
    pub fn new(sender: PublicKey) -> Self {
        let change_address = Address::from_public_key(&sender);
        Self {
            sender,
            change_address,
        }
    }

    /// The sender's own address, which receives change.
    pub fn change_address(&self) -> &Address {
        &self.change_address
    }

    /// Build an unsigned transaction spending every outpoint in `selection`.
    ///
    /// Fails without producing a transaction when `recipient.amount` is zero,
    /// an outpoint repeats, or the selection does not cover the amount. A
    /// change output is added only when the selection exceeds the amount.
    pub fn build(
        &self,
        selection: &CoinSelection,
        recipient: &Recipient,
    ) -> Result<UnsignedTransaction, WalletError> {
        let amount = recipient.amount;
        if amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }
        let mut seen = HashSet::with_capacity(selection.outpoints.len());
        if let Some(dup) = selection.outpoints.iter().find(|op| !seen.insert(*op)) {
            return Err(WalletError::DuplicateInput(dup.to_string()));
        }
        if selection.total < amount {
            return Err(WalletError::InsufficientFunds {
                have: selection.total,
                need: amount,
            });
        }
        if selection.is_empty() {
            return Err(WalletError::NoUtxos);
        }

        let sender_key = self.sender.to_bytes().to_vec();
        let inputs: Vec<TxInput> = selection
            .outpoints
            .iter()
            .map(|outpoint| TxInput {
                previous_output: outpoint.clone(),
                signature: None,
                public_key: sender_key.clone(),
            })
            .collect();
        let inputs_to_sign = (0..inputs.len()).collect();

        let mut outputs = Vec::with_capacity(2);
        outputs.push(TxOutput {
            value: amount,
            pubkey_hash: recipient.address.pubkey_hash(),
        });
        let change = selection.change(amount);
        if change > 0 {
            outputs.push(TxOutput {
                value: change,
                pubkey_hash: self.change_address.pubkey_hash(),
            });
        }

        let mut tx = Transaction {
            id: Hash256::ZERO,
            inputs,
            outputs,
            is_coinbase: false,
        };
        tx.id = tx.txid()?;

        Ok(UnsignedTransaction { tx, inputs_to_sign })
    }

    /// Sign every recorded input of `unsigned` with `key`.
    pub fn sign(unsigned: UnsignedTransaction, key: &PrivateKey) -> Result<Transaction, WalletError> {
        let mut tx = unsigned.tx;
        sign_transaction_inputs(&mut tx, &unsigned.inputs_to_sign, key)?;
        Ok(tx)
    }

    /// Build and sign in one step, paying `recipient.amount`.
    pub fn build_signed(
        &self,
        selection: &CoinSelection,
        recipient: &Recipient,
        key: &PrivateKey,
    ) -> Result<Transaction, WalletError> {
        let unsigned = self.build(selection, recipient)?;
        Self::sign(unsigned, key)
    }
}
