//! Signed session token encoding
//!
//! Access and refresh tokens are HS256 JWTs. Expiry is deliberately not
//! checked by `jsonwebtoken` (it reads the system clock); callers compare the
//! decoded `exp` against the injected [`ClockSource`](keygate_core::ClockSource).

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use keygate_core::{AuthError, AuthResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Discriminates the two session token kinds via the `typ` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer token
    Access,
    /// Single-use rotation token
    Refresh,
}

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Normalized owner address
    pub address: String,
    /// Always [`TokenKind::Access`]
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Refresh id of the session that minted this token
    #[serde(rename = "sid")]
    pub session_id: String,
    /// Expiry, epoch seconds
    #[serde(rename = "exp")]
    pub expiry: u64,
    /// Issue time, epoch seconds
    #[serde(rename = "iat")]
    pub issued_at: u64,
}

/// Claims carried by a refresh token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Normalized owner address
    pub address: String,
    /// Always [`TokenKind::Refresh`]
    #[serde(rename = "typ")]
    pub kind: TokenKind,
    /// Refresh session id
    #[serde(rename = "jti")]
    pub refresh_id: String,
    /// Expiry, epoch seconds
    #[serde(rename = "exp")]
    pub expiry: u64,
    /// Issue time, epoch seconds
    #[serde(rename = "iat")]
    pub issued_at: u64,
}

/// Common view over both claim sets
pub trait SessionClaims: DeserializeOwned {
    /// Declared token kind
    fn kind(&self) -> TokenKind;
    /// Expiry, epoch seconds
    fn expiry(&self) -> u64;

    /// Whether the token is past its expiry at `now_ms`
    fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expiry().saturating_mul(1000)
    }
}

impl SessionClaims for AccessTokenClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
    fn expiry(&self) -> u64 {
        self.expiry
    }
}

impl SessionClaims for RefreshTokenClaims {
    fn kind(&self) -> TokenKind {
        self.kind
    }
    fn expiry(&self) -> u64 {
        self.expiry
    }
}

/// Paired access and refresh tokens handed to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBundle {
    /// Normalized owner address
    pub address: String,
    /// Bearer token for protected endpoints
    pub access_token: String,
    /// Access token expiry, epoch milliseconds
    pub access_expires_at: u64,
    /// Rotation token, delivered as an HTTP-only cookie
    pub refresh_token: String,
    /// Refresh token expiry, epoch milliseconds
    pub refresh_expires_at: u64,
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            AuthError::UnsupportedAlgorithm {
                alg: "non-HS256".to_string(),
            }
        }
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
        _ => AuthError::malformed(err.to_string()),
    }
}

/// HS256 signer/verifier for session tokens
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Codec keyed by a shared secret
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::from(["exp".to_string()]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact JWT
    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Verify the signature and decode claims of the expected kind
    ///
    /// Expiry is left to the caller.
    pub fn decode<T: SessionClaims>(&self, token: &str, expected: TokenKind) -> AuthResult<T> {
        let data = decode::<T>(token.trim(), &self.decoding, &self.validation)
            .map_err(map_jwt_error)?;
        if data.claims.kind() != expected {
            return Err(AuthError::malformed("unexpected token type"));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn access(expiry: u64) -> AccessTokenClaims {
        AccessTokenClaims {
            address: "0xabc".into(),
            kind: TokenKind::Access,
            session_id: "sid-1".into(),
            expiry,
            issued_at: 1,
        }
    }

    #[test]
    fn decodes_own_tokens() {
        let codec = TokenCodec::new(b"secret");
        let token = codec.sign(&access(10)).unwrap();
        let claims: AccessTokenClaims = codec.decode(&token, TokenKind::Access).unwrap();
        assert_eq!(claims, access(10));
    }

    #[test]
    fn expiry_is_not_judged_by_system_clock() {
        // exp of 10 seconds after the epoch is long past on the real clock
        let codec = TokenCodec::new(b"secret");
        let token = codec.sign(&access(10)).unwrap();
        assert!(codec.decode::<AccessTokenClaims>(&token, TokenKind::Access).is_ok());
        assert!(access(10).is_expired(10_001));
        assert!(!access(10).is_expired(10_000));
    }

    #[test]
    fn foreign_secret_is_invalid_signature() {
        let token = TokenCodec::new(b"one").sign(&access(10)).unwrap();
        let result = TokenCodec::new(b"two").decode::<AccessTokenClaims>(&token, TokenKind::Access);
        assert_matches!(result, Err(AuthError::InvalidSignature));
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let codec = TokenCodec::new(b"secret");
        let refresh = RefreshTokenClaims {
            address: "0xabc".into(),
            kind: TokenKind::Refresh,
            refresh_id: "r1".into(),
            expiry: 10,
            issued_at: 1,
        };
        let token = codec.sign(&refresh).unwrap();
        assert_matches!(
            codec.decode::<AccessTokenClaims>(&token, TokenKind::Access),
            Err(AuthError::TokenMalformed { .. })
        );
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = TokenCodec::new(b"secret");
        assert_matches!(
            codec.decode::<AccessTokenClaims>("a.b", TokenKind::Access),
            Err(AuthError::TokenMalformed { .. })
        );
    }
}
