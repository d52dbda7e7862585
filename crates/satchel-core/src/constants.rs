//! Protocol constants shared by the wallet and its ledger contract.

/// Base58Check version byte prepended to every address payload.
pub const ADDRESS_VERSION: u8 = 0x00;

/// Length of a public key hash (RIPEMD-160 output).
pub const PUBKEY_HASH_LEN: usize = 20;

/// Length of one P-256 field element in bytes.
pub const COORDINATE_LEN: usize = 32;

/// Length of the raw public key `X || Y`.
pub const PUBLIC_KEY_LEN: usize = 2 * COORDINATE_LEN;

/// Length of a raw `r || s` ECDSA signature.
pub const SIGNATURE_LEN: usize = 64;

/// Length of the Base58Check checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Endpoint listing every unspent output owned by a pubkey hash.
pub const UTXOS_PATH: &str = "/utxos";

/// Endpoint returning a selection of outputs covering an amount.
pub const SPENDABLE_UTXOS_PATH: &str = "/spendable_utxos";

/// Endpoint accepting finished transactions.
pub const TRANSACTION_PATH: &str = "/transaction";
