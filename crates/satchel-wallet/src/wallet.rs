//! Wallet composition: one named key, its address, and payments.
//!
//! The [`Wallet`] keeps no UTXO state. Balances and coin selection are
//! fresh ledger reads on every call.

use std::fmt;

use satchel_core::address::Address;
use satchel_core::crypto::{PrivateKey, PublicKey};
use satchel_core::traits::LedgerService;
use satchel_core::types::{Hash256, PubKeyHash, Transaction};

use crate::builder::{Recipient, TransactionBuilder};
use crate::coin_selection::CoinSelector;
use crate::error::WalletError;
use crate::keys::KeyStore;

/// A single-key wallet.
pub struct Wallet {
    name: String,
    key: PrivateKey,
    builder: TransactionBuilder,
}

impl Wallet {
    /// Generate a fresh key and save it as `name`. Never overwrites.
    pub fn create(store: &KeyStore, name: &str) -> Result<Self, WalletError> {
        let key = PrivateKey::generate();
        let path = store.save(name, &key)?;
        let wallet = Self::from_key(name, key);
        tracing::info!(name, path = %path.display(), address = %wallet.address(), "wallet created");
        Ok(wallet)
    }

    /// Load wallet `name` from `store`.
    pub fn open(store: &KeyStore, name: &str) -> Result<Self, WalletError> {
        let key = store.load(name)?;
        let wallet = Self::from_key(name, key);
        tracing::info!(name, address = %wallet.address(), "wallet opened");
        Ok(wallet)
    }

    /// Wrap an existing key without touching disk.
    pub fn from_key(name: impl Into<String>, key: PrivateKey) -> Self {
        let builder = TransactionBuilder::new(key.public_key());
        Self {
            name: name.into(),
            key,
            builder,
        }
    }

    /// Wallet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public key of the wallet's key.
    pub fn public_key(&self) -> PublicKey {
        self.key.public_key()
    }

    /// Hash locking outputs owned by this wallet.
    pub fn pubkey_hash(&self) -> PubKeyHash {
        self.builder.change_address().pubkey_hash()
    }

    /// The wallet's receive address.
    pub fn address(&self) -> Address {
        self.builder.change_address().clone()
    }

    /// Sum of all unspent outputs owned by this wallet.
    pub fn balance(&self, ledger: &dyn LedgerService) -> Result<u64, WalletError> {
        Ok(ledger.balance(&self.pubkey_hash())?)
    }

    /// Select coins, build and sign a payment of `amount` to `to`.
    pub fn build_transaction(
        &self,
        ledger: &dyn LedgerService,
        to: &str,
        amount: u64,
    ) -> Result<Transaction, WalletError> {
        if amount == 0 {
            return Err(WalletError::InvalidAmount("amount must be non-zero".into()));
        }
        let recipient = Recipient {
            address: Address::decode(to)?,
            amount,
        };
        let selection = CoinSelector::select(ledger, &self.pubkey_hash(), amount)?;
        self.builder.build_signed(&selection, &recipient, &self.key)
    }

    /// Build a payment and submit it. Returns the accepted transaction's ID.
    pub fn send(
        &self,
        ledger: &dyn LedgerService,
        to: &str,
        amount: u64,
    ) -> Result<Hash256, WalletError> {
        let tx = self.build_transaction(ledger, to, amount)?;
        ledger.submit_transaction(&tx)?;
        tracing::info!(name = %self.name, txid = %tx.id, amount, to, "payment submitted");
        Ok(tx.id)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("name", &self.name)
            .field("address", &self.address().to_string())
            .finish_non_exhaustive()
    }
}
