//! Base58Check address encoding.
//!
//! An address is `base58(version || pubkey_hash || checksum)` where the
//! version byte is `0x00`, `pubkey_hash` is the 20-byte RIPEMD-160 of the
//! SHA-256 of the raw public key, and `checksum` is the first 4 bytes of the
//! double SHA-256 of `version || pubkey_hash`. Any corrupted byte in the
//! decoded string fails the checksum.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{ADDRESS_VERSION, PUBKEY_HASH_LEN};
use crate::crypto::PublicKey;
use crate::error::AddressError;
use crate::types::PubKeyHash;

/// A versioned, checksummed encoding of a public key hash.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    pubkey_hash: PubKeyHash,
}

impl Address {
    /// Create an address from a pubkey hash.
    pub fn from_pubkey_hash(pubkey_hash: PubKeyHash) -> Self {
        Self {
            version: ADDRESS_VERSION,
            pubkey_hash,
        }
    }

    /// Create an address from a public key.
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        Self::from_pubkey_hash(public_key.pubkey_hash())
    }

    /// The pubkey hash encoded in this address.
    pub fn pubkey_hash(&self) -> PubKeyHash {
        self.pubkey_hash
    }

    /// The address version byte.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Encode this address as a Base58Check string.
    pub fn encode(&self) -> String {
        bs58::encode(self.pubkey_hash.as_bytes())
            .with_check_version(self.version)
            .into_string()
    }

    /// Decode and validate a Base58Check address string.
    pub fn decode(s: &str) -> Result<Self, AddressError> {
        let decoded = bs58::decode(s.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| match e {
                bs58::decode::Error::InvalidChecksum { .. } => AddressError::InvalidChecksum,
                bs58::decode::Error::NoChecksum => AddressError::InvalidLength(0),
                other => AddressError::InvalidEncoding(other.to_string()),
            })?;

        // `into_vec` keeps the version byte and drops the checksum.
        let (&version, payload) = decoded
            .split_first()
            .ok_or(AddressError::InvalidLength(0))?;
        if version != ADDRESS_VERSION {
            return Err(AddressError::InvalidVersion(version));
        }
        let hash: [u8; PUBKEY_HASH_LEN] = payload
            .try_into()
            .map_err(|_| AddressError::InvalidLength(payload.len()))?;

        Ok(Self {
            version,
            pubkey_hash: PubKeyHash(hash),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::decode(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::PrivateKey;
    use proptest::prelude::*;

    fn sample_hash() -> PubKeyHash {
        PubKeyHash([0xAA; 20])
    }

    /// Raw Base58 (no check) bytes of an encoded address.
    fn raw_bytes(addr: &str) -> Vec<u8> {
        bs58::decode(addr).into_vec().unwrap()
    }

    // --- Encoding ---

    #[test]
    fn encode_known_vector() {
        // Version 0x00 with the all-zero hash is the well-known burn address.
        let addr = Address::from_pubkey_hash(PubKeyHash([0u8; 20]));
        assert_eq!(addr.encode(), "1111111111111111111114oLvT2");
    }

    #[test]
    fn encode_starts_with_one() {
        // A leading 0x00 byte always encodes as '1'.
        let addr = Address::from_pubkey_hash(sample_hash());
        assert!(addr.encode().starts_with('1'));
    }

    #[test]
    fn encode_deterministic() {
        let addr = Address::from_pubkey_hash(sample_hash());
        assert_eq!(addr.encode(), addr.encode());
    }

    #[test]
    fn encode_different_hashes_differ() {
        let a1 = Address::from_pubkey_hash(PubKeyHash([0xAA; 20]));
        let a2 = Address::from_pubkey_hash(PubKeyHash([0xBB; 20]));
        assert_ne!(a1.encode(), a2.encode());
    }

    #[test]
    fn encoded_payload_layout() {
        let addr = Address::from_pubkey_hash(sample_hash());
        let raw = raw_bytes(&addr.encode());
        assert_eq!(raw.len(), 1 + 20 + 4);
        assert_eq!(raw[0], ADDRESS_VERSION);
        assert_eq!(&raw[1..21], sample_hash().as_bytes());
    }

    // --- Decoding ---

    #[test]
    fn decode_roundtrip() {
        let original = Address::from_pubkey_hash(sample_hash());
        let decoded = Address::decode(&original.encode()).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(decoded.version(), ADDRESS_VERSION);
        assert_eq!(decoded.pubkey_hash(), sample_hash());
    }

    #[test]
    fn decode_trims_whitespace() {
        let original = Address::from_pubkey_hash(sample_hash());
        let padded = format!("  {}\n", original.encode());
        assert_eq!(Address::decode(&padded).unwrap(), original);
    }

    #[test]
    fn decode_invalid_character() {
        // '0', 'O', 'I' and 'l' are not in the Base58 alphabet.
        let err = Address::decode("1O0Il").unwrap_err();
        assert!(matches!(err, AddressError::InvalidEncoding(_)));
    }

    #[test]
    fn decode_empty_fails() {
        assert!(Address::decode("").is_err());
    }

    #[test]
    fn decode_mutated_checksum_fails() {
        let addr = Address::from_pubkey_hash(sample_hash());
        let mut raw = raw_bytes(&addr.encode());
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        let corrupted = bs58::encode(raw).into_string();
        assert_eq!(Address::decode(&corrupted).unwrap_err(), AddressError::InvalidChecksum);
    }

    #[test]
    fn decode_wrong_version_fails() {
        let encoded = bs58::encode([0x42u8; 20])
            .with_check_version(0x05)
            .into_string();
        assert_eq!(Address::decode(&encoded).unwrap_err(), AddressError::InvalidVersion(0x05));
    }

    #[test]
    fn decode_wrong_length_fails() {
        let encoded = bs58::encode([0x42u8; 32])
            .with_check_version(ADDRESS_VERSION)
            .into_string();
        assert_eq!(Address::decode(&encoded).unwrap_err(), AddressError::InvalidLength(32));
    }

    // --- Traits ---

    #[test]
    fn display_matches_encode() {
        let addr = Address::from_pubkey_hash(sample_hash());
        assert_eq!(addr.to_string(), addr.encode());
    }

    #[test]
    fn from_str_parses() {
        let addr = Address::from_pubkey_hash(sample_hash());
        let parsed: Address = addr.encode().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn serde_as_string() {
        let addr = Address::from_pubkey_hash(sample_hash());
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.encode()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn serde_rejects_corrupted() {
        assert!(serde_json::from_str::<Address>("\"1111111111111111111114oLvT3\"").is_err());
    }

    #[test]
    fn from_public_key_uses_pubkey_hash() {
        let key = PrivateKey::generate();
        let pk = key.public_key();
        assert_eq!(Address::from_public_key(&pk).pubkey_hash(), pk.pubkey_hash());
    }

    proptest! {
        #[test]
        fn key_address_roundtrip(secret in any::<[u8; 32]>()) {
            let key = PrivateKey::from_secret_bytes(&secret);
            prop_assume!(key.is_ok());
            let key = key.unwrap();
            let pkh = key.public_key().pubkey_hash();
            let decoded = Address::decode(&Address::from_pubkey_hash(pkh).encode()).unwrap();
            prop_assert_eq!(decoded.pubkey_hash(), pkh);
        }

        #[test]
        fn any_single_byte_flip_is_rejected(
            hash in any::<[u8; 20]>(),
            position in 0usize..25,
            mask in 1u8..=255,
        ) {
            let addr = Address::from_pubkey_hash(PubKeyHash(hash));
            let mut raw = raw_bytes(&addr.encode());
            raw[position] ^= mask;
            let corrupted = bs58::encode(raw).into_string();
            prop_assert!(Address::decode(&corrupted).is_err());
        }
    }
}
