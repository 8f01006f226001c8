//! Wallet signature recovery against independently produced signatures

use assert_matches::assert_matches;
use keygate_core::crypto::{recover_address, verify_wallet_signature};
use keygate_core::AuthError;
use keygate_testkit::TestWallet;

#[test]
fn private_key_one_has_known_address() {
    let mut key = [0u8; 32];
    key[31] = 1;
    let wallet = TestWallet::from_private_key(&key);
    assert_eq!(wallet.address(), "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
}

#[test]
fn recovers_signer_of_personal_message() {
    let wallet = TestWallet::from_seed(7);
    let message = "Sign to login\n\nAddress: someone";
    let signature = wallet.sign_message(message);

    assert_eq!(recover_address(message, &signature).unwrap(), wallet.address());
    assert!(verify_wallet_signature(message, &signature, &wallet.address_upper()));
}

#[test]
fn accepts_zero_based_recovery_byte() {
    let wallet = TestWallet::from_seed(9);
    let signature = wallet.sign_message("hello");
    let v = u8::from_str_radix(&signature[signature.len() - 2..], 16).unwrap();
    let raw_v = format!("{}{:02x}", &signature[..signature.len() - 2], v - 27);

    assert_eq!(recover_address("hello", &raw_v).unwrap(), wallet.address());
}

#[test]
fn different_message_recovers_different_address() {
    let wallet = TestWallet::from_seed(3);
    let signature = wallet.sign_message("original");

    match recover_address("tampered", &signature) {
        Ok(address) => assert_ne!(address, wallet.address()),
        Err(err) => assert_eq!(err, AuthError::InvalidSignature),
    }
    assert!(!verify_wallet_signature("tampered", &signature, &wallet.address()));
}

#[test]
fn wrong_signer_fails_verification() {
    let alice = TestWallet::from_seed(1);
    let bob = TestWallet::from_seed(2);
    let signature = alice.sign_message("login");

    assert!(!verify_wallet_signature("login", &signature, &bob.address()));
    assert_matches!(recover_address("login", "0xzz"), Err(AuthError::InvalidSignature));
}
