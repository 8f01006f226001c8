//! Signature primitives shared across Keygate crates

pub mod wallet;

pub use wallet::{
    address_from_verifying_key, personal_message_hash, recover_address, verify_wallet_signature,
};
