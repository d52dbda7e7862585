//! Integration test suite for Satchel.
//!
//! Provides two ledger doubles shared by the tests under `tests/`:
//! an in-memory [`helpers::FakeLedger`] and an HTTP [`server::MockLedgerServer`]
//! that exercises the real `HttpLedgerClient`.

pub mod helpers;
pub mod server;
