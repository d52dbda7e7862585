//! # satchel-core
//! Foundation types and traits for the Satchel wallet.

pub mod address;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod traits;
pub mod types;
