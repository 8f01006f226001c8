//! Unified verification error for Keygate
//!
//! Every public verification entry point reports failure with one of these
//! reasons. Decoding and cryptographic errors from underlying crates are folded
//! into the matching variant at the boundary where they occur, so no foreign
//! error type ever reaches a caller.

use serde::Serialize;

/// Reason a credential, challenge or proof was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthError {
    /// The login challenge for this address has expired
    #[error("Challenge expired")]
    ChallengeExpired,

    /// No live login challenge exists for this address
    #[error("Challenge not found")]
    ChallengeAbsent,

    /// Signature bytes were malformed or did not verify
    #[error("Invalid signature")]
    InvalidSignature,

    /// Token structure could not be decoded
    #[error("Malformed token: {reason}")]
    TokenMalformed {
        /// What part of the token failed to decode
        reason: String,
    },

    /// A `did:key` identifier could not be resolved to an Ed25519 key
    #[error("Malformed DID: {reason}")]
    MalformedDid {
        /// Structural violation found while decoding
        reason: String,
    },

    /// Token is past its expiry
    #[error("Token expired")]
    TokenExpired,

    /// Token is not yet inside its validity window
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Audience does not chain to the expected identity
    #[error("Audience mismatch: expected {expected}, found {found}")]
    AudienceMismatch {
        /// DID the link was required to address
        expected: String,
        /// DID the link actually addressed
        found: String,
    },

    /// Held capabilities do not cover the required ones
    #[error("Capability denied")]
    CapabilityDenied,

    /// A delegation proof expires before the token it authorizes
    #[error("Proof expires before the token it authorizes")]
    ProofExpired,

    /// Delegated token carries no proofs leading to a root
    #[error("Missing proof chain")]
    MissingProofChain,

    /// Signed root statement disagrees with the root's top-level claims
    #[error("Root claim mismatch: {field}")]
    RootClaimMismatch {
        /// Claim that disagreed or was missing from the signed statement
        field: &'static str,
    },

    /// Root issuer does not match the recovered signer
    #[error("Root issuer mismatch")]
    RootIssuerMismatch,

    /// Root proof expired, or expires before the chain requires
    #[error("Root proof expired")]
    RootExpired,

    /// Token header names an algorithm other than EdDSA
    #[error("Unsupported algorithm: {alg}")]
    UnsupportedAlgorithm {
        /// Algorithm named by the token header
        alg: String,
    },

    /// Proof chain is longer than the configured bound
    #[error("Proof chain exceeds {max} links")]
    ChainTooDeep {
        /// Configured maximum number of links
        max: usize,
    },
}

impl AuthError {
    /// Create a malformed-token error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::TokenMalformed {
            reason: reason.into(),
        }
    }

    /// Create a malformed-DID error
    pub fn malformed_did(reason: impl Into<String>) -> Self {
        Self::MalformedDid {
            reason: reason.into(),
        }
    }

    /// Create an audience mismatch error
    pub fn audience_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::AudienceMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Stable machine-readable tag for logs and metrics labels
    pub fn code(&self) -> &'static str {
        match self {
            Self::ChallengeExpired => "challenge_expired",
            Self::ChallengeAbsent => "challenge_absent",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenMalformed { .. } => "token_malformed",
            Self::MalformedDid { .. } => "malformed_did",
            Self::TokenExpired => "token_expired",
            Self::TokenNotYetValid => "token_not_yet_valid",
            Self::AudienceMismatch { .. } => "audience_mismatch",
            Self::CapabilityDenied => "capability_denied",
            Self::ProofExpired => "proof_expired",
            Self::MissingProofChain => "missing_proof_chain",
            Self::RootClaimMismatch { .. } => "root_claim_mismatch",
            Self::RootIssuerMismatch => "root_issuer_mismatch",
            Self::RootExpired => "root_expired",
            Self::UnsupportedAlgorithm { .. } => "unsupported_algorithm",
            Self::ChainTooDeep { .. } => "chain_too_deep",
        }
    }
}

/// Result alias for verification operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;
