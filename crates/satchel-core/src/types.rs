//! Core wallet types: hashes, outpoints, inputs, outputs, transactions.
//!
//! JSON field names follow the ledger node's wire format (`ID`, `Vin`,
//! `Vout`, `IsCoinbase`, ...). Byte strings travel as standard base64.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::PUBKEY_HASH_LEN;
use crate::error::TransactionError;

/// A 32-byte SHA-256 digest, used for transaction IDs and signing digests.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash. A transaction's `id` holds this until it is assigned.
    pub const ZERO: Self = Self([0u8; 32]);

    /// SHA-256 of `data`.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Lowercase hex form, as used in ledger query maps.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse exactly 64 hex characters.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        b64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = b64::deserialize(deserializer)?;
        // The node sends an empty ID for transactions it has not hashed yet.
        if bytes.is_empty() {
            return Ok(Self::ZERO);
        }
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| serde::de::Error::invalid_length(v.len(), &"32 bytes"))?;
        Ok(Self(arr))
    }
}

/// RIPEMD-160 of the SHA-256 of a raw public key.
///
/// This is the payload of an [`Address`](crate::address::Address) and the
/// lock on every [`TxOutput`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    bincode::Encode, bincode::Decode,
)]
pub struct PubKeyHash(pub [u8; PUBKEY_HASH_LEN]);

impl PubKeyHash {
    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; PUBKEY_HASH_LEN] {
        &self.0
    }

    /// Lowercase hex form, as sent in the `pubKeyHash` query parameter.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PubKeyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; PUBKEY_HASH_LEN]> for PubKeyHash {
    fn from(bytes: [u8; PUBKEY_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for PubKeyHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        b64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for PubKeyHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = b64::deserialize(deserializer)?;
        let arr: [u8; PUBKEY_HASH_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            serde::de::Error::invalid_length(v.len(), &"20 bytes")
        })?;
        Ok(Self(arr))
    }
}

/// Reference to a specific output of a previous transaction.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord,
    bincode::Encode, bincode::Decode,
)]
pub struct OutPoint {
    /// Transaction ID containing the referenced output.
    #[serde(rename = "Txid")]
    pub txid: Hash256,
    /// Index of the output within the transaction.
    #[serde(rename = "OutIndex")]
    pub index: u64,
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// A transaction input, spending a previous output.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxInput {
    /// The outpoint being spent.
    #[serde(flatten)]
    pub previous_output: OutPoint,
    /// Raw `r || s` ECDSA signature (64 bytes). `None` until signed.
    #[serde(rename = "Signature", with = "b64::option")]
    pub signature: Option<Vec<u8>>,
    /// Raw `X || Y` public key of the spender (64 bytes).
    #[serde(rename = "PubKey", with = "b64::vec")]
    pub public_key: Vec<u8>,
}

impl TxInput {
    /// Whether a non-empty signature has been attached.
    pub fn is_signed(&self) -> bool {
        self.signature.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// A transaction output, creating a new UTXO.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct TxOutput {
    /// Amount carried by this output.
    #[serde(rename = "Value", alias = "value")]
    pub value: u64,
    /// Hash of the recipient's public key (the decoded recipient address).
    #[serde(rename = "PubKeyHash", alias = "pubKeyHash")]
    pub pubkey_hash: PubKeyHash,
}

/// A transaction transferring value between addresses.
#[derive(
    Serialize, Deserialize, Clone, Debug, PartialEq, Eq,
    bincode::Encode, bincode::Decode,
)]
pub struct Transaction {
    /// Canonical identifier, see [`Transaction::txid`].
    #[serde(rename = "ID")]
    pub id: Hash256,
    /// Inputs consuming previous outputs.
    #[serde(rename = "Vin")]
    pub inputs: Vec<TxInput>,
    /// New outputs created by this transaction.
    #[serde(rename = "Vout")]
    pub outputs: Vec<TxOutput>,
    /// Block reward marker. Always false for wallet transactions.
    #[serde(rename = "IsCoinbase")]
    pub is_coinbase: bool,
}

impl Transaction {
    /// Copy of this transaction with every signature cleared and the
    /// identifier zeroed. Public keys and all outputs are kept.
    pub fn trimmed_copy(&self) -> Transaction {
        Transaction {
            id: Hash256::ZERO,
            inputs: self
                .inputs
                .iter()
                .map(|input| TxInput {
                    previous_output: input.previous_output.clone(),
                    signature: None,
                    public_key: input.public_key.clone(),
                })
                .collect(),
            outputs: self.outputs.clone(),
            is_coinbase: self.is_coinbase,
        }
    }

    /// SHA-256 over the bincode (standard config) encoding of the trimmed copy.
    ///
    /// This is the message every input signature attests to.
    pub fn signing_digest(&self) -> Result<Hash256, TransactionError> {
        let encoded = bincode::encode_to_vec(self.trimmed_copy(), bincode::config::standard())
            .map_err(|e| TransactionError::Serialization(e.to_string()))?;
        Ok(Hash256::digest(&encoded))
    }

    /// Compute the transaction ID.
    ///
    /// The ID excludes signatures and the `id` field itself, so it is the
    /// same value as [`signing_digest`](Self::signing_digest) and does not
    /// change when inputs are signed.
    pub fn txid(&self) -> Result<Hash256, TransactionError> {
        self.signing_digest()
    }

    /// Sum of all output values.
    pub fn total_output_value(&self) -> Result<u64, TransactionError> {
        self.outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.value))
            .ok_or(TransactionError::ValueOverflow)
    }

    /// Whether every input carries a signature.
    pub fn is_fully_signed(&self) -> bool {
        !self.inputs.is_empty() && self.inputs.iter().all(TxInput::is_signed)
    }
}

/// Ledger answer to a spendable-output query.
///
/// `spendable` maps hex txids to output indices. A `BTreeMap` keeps the
/// resulting input order stable.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SpendableOutputs {
    /// Aggregate value of the listed outputs, as reported by the ledger.
    pub total: u64,
    /// `txid-hex -> [output index, ...]`.
    pub spendable: BTreeMap<String, Vec<u64>>,
}

/// Base64 (standard alphabet) helpers for byte fields.
mod b64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD.decode(s).map_err(serde::de::Error::custom)
    }

    pub mod vec {
        use serde::{Deserializer, Serializer};

        pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
            super::serialize(bytes, serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
            super::deserialize(deserializer)
        }
    }

    pub mod option {
        use base64::Engine;
        use base64::engine::general_purpose::STANDARD;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            bytes: &Option<Vec<u8>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match bytes {
                Some(b) => serializer.serialize_str(&STANDARD.encode(b)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Vec<u8>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(s) => STANDARD
                    .decode(s)
                    .map(Some)
                    .map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
