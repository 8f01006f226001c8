//! Three-segment capability token decoding
//!
//! Untrusted segments decode into typed structs. Required fields are
//! enforced, known fields are strictly typed, extension fields are ignored.

use crate::capability::Capability;
use crate::did;
use crate::root::RootProof;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use ed25519_dalek::{Signature, Verifier};
use keygate_core::{normalize_epoch_millis, AuthError, AuthResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// The only signature algorithm accepted for capability tokens
pub const EDDSA: &str = "EdDSA";

/// base64url that tolerates both padded and unpadded input
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Token header
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UcanHeader {
    /// Signature algorithm
    pub alg: String,
    /// Token type hint
    #[serde(default)]
    pub typ: Option<String>,
}

/// One element of a `prf` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Proof {
    /// Encoded delegation token
    Delegation(String),
    /// Wallet-signed root of the chain
    Root(Box<RootProof>),
}

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UcanPayload {
    /// Issuer `did:key`
    pub iss: String,
    /// Audience DID
    pub aud: String,
    /// Granted capabilities
    #[serde(default)]
    pub cap: Vec<Capability>,
    /// Expiry, seconds or milliseconds
    #[serde(default)]
    pub exp: Option<u64>,
    /// Not-before, seconds or milliseconds
    #[serde(default)]
    pub nbf: Option<u64>,
    /// Proofs authorizing this token
    #[serde(default)]
    pub prf: Vec<Proof>,
}

impl UcanPayload {
    /// Expiry in epoch milliseconds
    pub fn expiry_ms(&self) -> Option<u64> {
        self.exp.map(normalize_epoch_millis)
    }

    /// Not-before in epoch milliseconds
    pub fn not_before_ms(&self) -> Option<u64> {
        self.nbf.map(normalize_epoch_millis)
    }

    /// Check `now_ms` against the `[nbf, exp]` window
    pub fn check_window(&self, now_ms: u64) -> AuthResult<()> {
        if self.not_before_ms().is_some_and(|nbf| now_ms < nbf) {
            return Err(AuthError::TokenNotYetValid);
        }
        if self.expiry_ms().is_some_and(|exp| now_ms > exp) {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }
}

/// Token split into its parts, signature not yet checked
#[derive(Debug, Clone)]
pub struct DecodedUcan {
    /// Decoded header
    pub header: UcanHeader,
    /// Decoded payload
    pub payload: UcanPayload,
    signing_input: String,
    signature: String,
}

fn decode_segment<T: DeserializeOwned>(segment: &str, what: &str) -> AuthResult<T> {
    let bytes = URL_SAFE_LENIENT
        .decode(segment)
        .map_err(|_| AuthError::malformed(format!("{what} is not base64url")))?;
    serde_json::from_slice(&bytes).map_err(|e| AuthError::malformed(format!("{what}: {e}")))
}

impl DecodedUcan {
    /// Split and decode a token, rejecting any algorithm but EdDSA
    pub fn decode(token: &str) -> AuthResult<Self> {
        let token = token.trim();
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::malformed("expected three segments"));
        };

        let decoded_header: UcanHeader = decode_segment(header, "header")?;
        if decoded_header.alg != EDDSA {
            return Err(AuthError::UnsupportedAlgorithm {
                alg: decoded_header.alg,
            });
        }
        let decoded_payload: UcanPayload = decode_segment(payload, "payload")?;

        Ok(Self {
            header: decoded_header,
            payload: decoded_payload,
            signing_input: format!("{header}.{payload}"),
            signature: signature.to_string(),
        })
    }

    /// Verify the Ed25519 signature against the issuer's `did:key`
    pub fn verify_signature(&self) -> AuthResult<()> {
        let key = did::resolve_verifying_key(&self.payload.iss)?;
        let bytes = URL_SAFE_LENIENT
            .decode(&self.signature)
            .map_err(|_| AuthError::InvalidSignature)?;
        let signature =
            Signature::from_slice(&bytes).map_err(|_| AuthError::InvalidSignature)?;
        key.verify(self.signing_input.as_bytes(), &signature)
            .map_err(|_| AuthError::InvalidSignature)
    }

    /// Decode, verify the signature and check the validity window
    pub fn verify(token: &str, now_ms: u64) -> AuthResult<Self> {
        let decoded = Self::decode(token)?;
        decoded.verify_signature()?;
        decoded.payload.check_window(now_ms)?;
        Ok(decoded)
    }
}

/// Decode only the header segment, tolerating missing fields
pub(crate) fn peek_header(token: &str) -> Option<serde_json::Value> {
    let first = token.trim().split('.').next()?;
    decode_segment(first, "header").ok()
}
