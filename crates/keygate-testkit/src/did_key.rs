//! Ed25519 session keys addressed as `did:key`

use ed25519_dalek::{Signer, SigningKey};

/// Multicodec prefix for an Ed25519 public key
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Encode raw Ed25519 public key bytes as a `did:key`
pub fn did_key_from_public(raw: &[u8; 32]) -> String {
    let mut bytes = Vec::with_capacity(34);
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(raw);
    format!("did:key:z{}", bs58::encode(bytes).into_string())
}

/// Ed25519 signer with a deterministic seed
#[derive(Clone)]
pub struct DidKeySigner {
    key: SigningKey,
}

impl DidKeySigner {
    /// Signer whose secret key is 32 copies of `seed`
    pub fn from_seed(seed: u8) -> Self {
        Self {
            key: SigningKey::from_bytes(&[seed; 32]),
        }
    }

    /// Raw public key bytes
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// `did:key` identifier of this signer
    pub fn did(&self) -> String {
        did_key_from_public(&self.public_key())
    }

    /// Raw 64-byte Ed25519 signature over `message`
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for DidKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DidKeySigner").field("did", &self.did()).finish()
    }
}
