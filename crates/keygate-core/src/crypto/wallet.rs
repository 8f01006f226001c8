//! Wallet signature recovery
//!
//! Recovers the Ethereum address that produced an EIP-191 `personal_sign`
//! signature. This proves WHO signed a message; it knows nothing about what the
//! signer is allowed to do.

use crate::{normalize_address, AuthError, AuthResult};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

/// Length of an `r || s || v` recoverable signature
const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Keccak-256 of the EIP-191 framed message
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Lower-case `0x` address for a secp256k1 public key
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 SEC1 tag; the address is the tail of keccak(x || y)
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Split a hex `r || s || v` signature into its ECDSA and recovery parts
fn parse_recoverable_signature(signature: &str) -> AuthResult<(Signature, RecoveryId)> {
    let trimmed = signature.trim();
    let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_part).map_err(|_| AuthError::InvalidSignature)?;
    if bytes.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(AuthError::InvalidSignature);
    }

    let v = match bytes[64] {
        27 | 28 => bytes[64] - 27,
        0 | 1 => bytes[64],
        _ => return Err(AuthError::InvalidSignature),
    };

    let sig = Signature::from_slice(&bytes[..64]).map_err(|_| AuthError::InvalidSignature)?;
    let recovery_id = RecoveryId::from_byte(v).ok_or(AuthError::InvalidSignature)?;
    Ok((sig, recovery_id))
}

/// Recover the signer address of a `personal_sign` signature
///
/// Returns the normalized address, or `InvalidSignature` when the bytes are
/// malformed or no public key can be recovered.
pub fn recover_address(message: &str, signature: &str) -> AuthResult<String> {
    let (sig, recovery_id) = parse_recoverable_signature(signature)?;
    let digest = personal_message_hash(message.as_bytes());
    let key = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id)
        .map_err(|_| AuthError::InvalidSignature)?;
    Ok(address_from_verifying_key(&key))
}

/// Check that `signature` over `message` was produced by `expected_address`
///
/// Comparison is case-insensitive. Recovery failures are reported as `false`.
pub fn verify_wallet_signature(message: &str, signature: &str, expected_address: &str) -> bool {
    match recover_address(message, signature) {
        Ok(recovered) => recovered == normalize_address(expected_address),
        Err(err) => {
            tracing::debug!(error = %err, "wallet signature recovery failed");
            false
        }
    }
}
