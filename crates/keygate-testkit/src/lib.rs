//! Keygate Testkit
//!
//! Shared fixtures for Keygate tests. Everything here is deterministic: clocks
//! start at [`TEST_EPOCH_MS`] and keys derive from single-byte seeds.

#![allow(missing_docs)]

pub mod clock;
pub mod did_key;
pub mod ucan;
pub mod wallet;

pub use clock::{SimulatedClock, TEST_EPOCH_MS};
pub use did_key::{did_key_from_public, DidKeySigner, ED25519_MULTICODEC};
pub use ucan::{siwe_statement_message, RootProofBuilder, UcanBuilder};
pub use wallet::TestWallet;

/// One minute in milliseconds
pub const MINUTE_MS: u64 = 60_000;

/// One hour in milliseconds
pub const HOUR_MS: u64 = 60 * MINUTE_MS;
