//! `did:key` resolution for Ed25519 issuers
//!
//! Only the base58btc multibase form (`z` prefix) with the Ed25519 multicodec
//! (`0xed 0x01`) is accepted.

use ed25519_dalek::VerifyingKey;
use keygate_core::{AuthError, AuthResult};

/// Scheme, method and multibase prefix every resolvable DID starts with
pub const DID_KEY_PREFIX: &str = "did:key:z";

/// Multicodec varint for an Ed25519 public key
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Decode a `did:key` into raw Ed25519 public key bytes
pub fn resolve(did: &str) -> AuthResult<[u8; 32]> {
    let encoded = did
        .strip_prefix(DID_KEY_PREFIX)
        .ok_or_else(|| AuthError::malformed_did("expected did:key:z prefix"))?;

    let decoded = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| AuthError::malformed_did(format!("invalid base58: {e}")))?;

    let raw = decoded
        .strip_prefix(&ED25519_MULTICODEC[..])
        .ok_or_else(|| AuthError::malformed_did("unsupported key type"))?;

    raw.try_into().map_err(|_| {
        AuthError::malformed_did(format!("expected 32 key bytes, found {}", raw.len()))
    })
}

/// Wrap raw bytes as an Ed25519 verifying key
pub fn to_verifying_key(raw: &[u8; 32]) -> AuthResult<VerifyingKey> {
    VerifyingKey::from_bytes(raw).map_err(|_| AuthError::malformed_did("not an Ed25519 point"))
}

/// Resolve a `did:key` straight to a verifying key
pub fn resolve_verifying_key(did: &str) -> AuthResult<VerifyingKey> {
    to_verifying_key(&resolve(did)?)
}

/// Encode raw Ed25519 public key bytes as a `did:key`
pub fn encode(raw: &[u8; 32]) -> String {
    let mut bytes = Vec::with_capacity(ED25519_MULTICODEC.len() + raw.len());
    bytes.extend_from_slice(&ED25519_MULTICODEC);
    bytes.extend_from_slice(raw);
    format!("{DID_KEY_PREFIX}{}", bs58::encode(bytes).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    #[test]
    fn resolves_testkit_signer() {
        let signer = keygate_testkit::DidKeySigner::from_seed(3);
        assert_eq!(resolve(&signer.did()).unwrap(), signer.public_key());
        assert!(resolve_verifying_key(&signer.did()).is_ok());
    }

    #[test]
    fn rejects_other_methods_and_codecs() {
        assert_matches!(
            resolve("did:pkh:eth:0xabc"),
            Err(AuthError::MalformedDid { .. })
        );
        assert_matches!(resolve("did:key:z0OIl"), Err(AuthError::MalformedDid { .. }));

        // secp256k1 multicodec (0xe7 0x01)
        let mut secp = vec![0xe7, 0x01];
        secp.extend_from_slice(&[2u8; 33]);
        let did = format!("did:key:z{}", bs58::encode(secp).into_string());
        assert_matches!(resolve(&did), Err(AuthError::MalformedDid { .. }));
    }

    #[test]
    fn rejects_truncated_key() {
        let mut short = ED25519_MULTICODEC.to_vec();
        short.extend_from_slice(&[9u8; 31]);
        let did = format!("did:key:z{}", bs58::encode(short).into_string());
        assert_matches!(resolve(&did), Err(AuthError::MalformedDid { .. }));
    }

    proptest! {
        #[test]
        fn encode_is_inverse_of_resolve(raw in any::<[u8; 32]>()) {
            prop_assert_eq!(resolve(&encode(&raw)).unwrap(), raw);
        }

        #[test]
        fn arbitrary_input_never_panics(input in ".{0,80}") {
            let _ = resolve(&input);
            let _ = resolve(&format!("did:key:z{input}"));
        }
    }
}
