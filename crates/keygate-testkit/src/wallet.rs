//! secp256k1 test wallet producing `personal_sign` signatures

use k256::ecdsa::SigningKey;
use keygate_core::crypto::{address_from_verifying_key, personal_message_hash};

/// Wallet with a deterministic private key
#[derive(Clone)]
pub struct TestWallet {
    key: SigningKey,
}

impl TestWallet {
    /// Wallet whose private key is 32 copies of `seed` (`seed` must be non-zero)
    pub fn from_seed(seed: u8) -> Self {
        Self::from_private_key(&[seed; 32])
    }

    /// Wallet from raw private key bytes
    ///
    /// # Panics
    ///
    /// Panics if the bytes are not a valid secp256k1 scalar.
    #[allow(clippy::expect_used)]
    pub fn from_private_key(bytes: &[u8]) -> Self {
        let key = SigningKey::from_slice(bytes).expect("valid secp256k1 scalar");
        Self { key }
    }

    /// Lower-case `0x` address
    pub fn address(&self) -> String {
        address_from_verifying_key(self.key.verifying_key())
    }

    /// EIP-55 style upper-cased address, handy for normalization tests
    pub fn address_upper(&self) -> String {
        let address = self.address();
        format!("0x{}", address[2..].to_uppercase())
    }

    /// Sign `message` as `personal_sign` would, returning `0x r || s || v`
    ///
    /// # Panics
    ///
    /// Panics if signing fails, which does not happen for valid keys.
    #[allow(clippy::expect_used)]
    pub fn sign_message(&self, message: &str) -> String {
        let digest = personal_message_hash(message.as_bytes());
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&digest)
            .expect("prehash signing");
        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(bytes))
    }
}

impl std::fmt::Debug for TestWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestWallet")
            .field("address", &self.address())
            .finish()
    }
}
