//! ECDSA P-256 cryptographic operations for the Satchel wallet.
//!
//! Provides key generation, PEM import/export, public key hashing, and the
//! per-input signing protocol.
//!
//! # Signing scheme
//!
//! Every input signs the same message: the [`signing_digest`] of the
//! transaction, which is the SHA-256 of its trimmed copy (signatures cleared,
//! identifier zeroed). Signatures therefore never cover each other, and the
//! transaction identifier, which is the same digest, is unaffected by
//! signing. Nonces are random, so two signatures over the same digest differ
//! byte-wise while both verify.
//!
//! [`signing_digest`]: crate::types::Transaction::signing_digest

use p256::ecdsa::signature::hazmat::{PrehashVerifier, RandomizedPrehashSigner};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::zeroize::Zeroizing;
use p256::pkcs8::{DecodePrivateKey, LineEnding};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};
use std::fmt;

use crate::constants::{PUBLIC_KEY_LEN, PUBKEY_HASH_LEN, SIGNATURE_LEN};
use crate::error::CryptoError;
use crate::types::{Hash256, PubKeyHash, Transaction};

/// SEC1 label, written by [`PrivateKey::to_pem`].
const SEC1_PEM_LABEL: &str = "EC PRIVATE KEY";

/// PKCS#8 label. Older wallet files also use it around a SEC1 body.
const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// P-256 private key that signs transaction inputs.
///
/// The scalar is zeroized on drop by the underlying library and never shows
/// up in `Debug` output.
pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    /// Generate a random key using the OS cryptographic RNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: SigningKey::random(&mut csprng),
        }
    }

    /// Create a key from a 32-byte big-endian scalar.
    ///
    /// Fails for zero or for values not below the curve order.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key = SigningKey::from_slice(bytes)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        Ok(Self { signing_key })
    }

    /// Encode as a SEC1 `EC PRIVATE KEY` PEM document.
    pub fn to_pem(&self) -> Result<Zeroizing<String>, CryptoError> {
        let secret = p256::SecretKey::from_bytes(&self.signing_key.to_bytes())
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        secret
            .to_sec1_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))
    }

    /// Decode a PEM private key.
    ///
    /// Accepts SEC1 (`EC PRIVATE KEY`), PKCS#8 (`PRIVATE KEY`), and a SEC1
    /// body under a `PRIVATE KEY` label as written by older wallet files.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let (label, der) = p256::pkcs8::der::pem::decode_vec(pem.trim().as_bytes())
            .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?;
        let der = Zeroizing::new(der);

        let secret = match label {
            SEC1_PEM_LABEL => p256::SecretKey::from_sec1_der(&der)
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?,
            PKCS8_PEM_LABEL => p256::SecretKey::from_pkcs8_der(&der)
                .or_else(|_| p256::SecretKey::from_sec1_der(&der))
                .map_err(|e| CryptoError::InvalidPrivateKey(e.to_string()))?,
            other => {
                return Err(CryptoError::InvalidPrivateKey(format!(
                    "unexpected PEM label: {other}"
                )));
            }
        };

        Ok(Self {
            signing_key: SigningKey::from(secret),
        })
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key().clone(),
        }
    }

    /// Sign a 32-byte digest with a fresh random nonce, returning `r || s`.
    pub fn sign_digest(&self, digest: &Hash256) -> Result<[u8; SIGNATURE_LEN], CryptoError> {
        let mut csprng = rand::rngs::OsRng;
        let signature: Signature = self
            .signing_key
            .sign_prehash_with_rng(&mut csprng, digest.as_bytes())
            .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;
        let mut out = [0u8; SIGNATURE_LEN];
        out.copy_from_slice(&signature.to_bytes());
        Ok(out)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// P-256 public key for verifying signatures and deriving addresses.
///
/// The raw form is the uncompressed point without its SEC1 tag:
/// `X || Y`, 32 bytes each.
#[derive(Clone)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Parse a raw 64-byte `X || Y` public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != PUBLIC_KEY_LEN {
            return Err(CryptoError::InvalidPublicKey);
        }
        let mut sec1 = [0u8; PUBLIC_KEY_LEN + 1];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(bytes);
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self { verifying_key })
    }

    /// Raw `X || Y` bytes.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        let point = self.verifying_key.to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LEN];
        // Skip the 0x04 uncompressed tag.
        out.copy_from_slice(&point.as_bytes()[1..]);
        out
    }

    /// Compute the pubkey hash used in transaction outputs and addresses.
    pub fn pubkey_hash(&self) -> PubKeyHash {
        pubkey_hash(&self.to_bytes())
    }

    /// Verify a raw `r || s` signature over a 32-byte digest.
    pub fn verify_digest(&self, digest: &Hash256, signature: &[u8]) -> Result<(), CryptoError> {
        let sig = Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)?;
        self.verifying_key
            .verify_prehash(digest.as_bytes(), &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(self.to_bytes()))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.to_bytes()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for PublicKey {}

/// `RIPEMD160(SHA256(pubkey_bytes))`.
pub fn pubkey_hash(pubkey_bytes: &[u8]) -> PubKeyHash {
    let sha = Sha256::digest(pubkey_bytes);
    let ripe = Ripemd160::digest(sha);
    let mut out = [0u8; PUBKEY_HASH_LEN];
    out.copy_from_slice(&ripe);
    PubKeyHash(out)
}

/// Sign the given inputs of `tx` in place.
///
/// All indices are checked before anything is written, so a bad index
/// leaves the transaction unsigned. Only `signature` fields change; the
/// identifier is left as assigned.
pub fn sign_transaction_inputs(
    tx: &mut Transaction,
    input_indices: &[usize],
    key: &PrivateKey,
) -> Result<(), CryptoError> {
    let len = tx.inputs.len();
    if let Some(&index) = input_indices.iter().find(|&&i| i >= len) {
        return Err(CryptoError::InputIndexOutOfBounds { index, len });
    }

    let digest = tx
        .signing_digest()
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    for &index in input_indices {
        let signature = key.sign_digest(&digest)?;
        tx.inputs[index].signature = Some(signature.to_vec());
    }
    Ok(())
}

/// Verify one input's signature against its embedded public key and the
/// transaction's signing digest.
pub fn verify_transaction_input(tx: &Transaction, input_index: usize) -> Result<(), CryptoError> {
    let input = tx
        .inputs
        .get(input_index)
        .ok_or(CryptoError::InputIndexOutOfBounds {
            index: input_index,
            len: tx.inputs.len(),
        })?;

    let signature = input
        .signature
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(CryptoError::MissingSignature(input_index))?;
    let pk = PublicKey::from_bytes(&input.public_key)?;

    let digest = tx
        .signing_digest()
        .map_err(|_| CryptoError::VerificationFailed)?;
    pk.verify_digest(&digest, signature)
}
