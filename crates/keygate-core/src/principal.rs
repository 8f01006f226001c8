//! Resolved caller identity handed to downstream collaborators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of a `did:pkh` identifier for an Ethereum address
pub const PKH_ETH_PREFIX: &str = "did:pkh:eth:";

/// Lower-case and trim a wallet address for use as a map key or comparison
pub fn normalize_address(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Render the `did:pkh:eth:` identifier for an address
pub fn pkh_did(address: &str) -> String {
    format!("{PKH_ETH_PREFIX}{}", normalize_address(address))
}

/// How the caller proved their identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Session access token issued after a signed login challenge
    Jwt,
    /// Capability invocation rooted in a signed login message
    Ucan,
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::Jwt => write!(f, "jwt"),
            AuthMethod::Ucan => write!(f, "ucan"),
        }
    }
}

/// Identity the core resolved for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedPrincipal {
    /// Normalized wallet address of the caller
    pub address: String,
    /// Invoking DID for capability invocations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Credential kind that was verified
    pub method: AuthMethod,
}

impl AuthenticatedPrincipal {
    /// Principal resolved from a session access token
    pub fn from_session(address: impl AsRef<str>) -> Self {
        Self {
            address: normalize_address(address.as_ref()),
            issuer: None,
            method: AuthMethod::Jwt,
        }
    }

    /// Principal resolved from a capability invocation
    pub fn from_invocation(address: impl AsRef<str>, issuer: impl Into<String>) -> Self {
        Self {
            address: normalize_address(address.as_ref()),
            issuer: Some(issuer.into()),
            method: AuthMethod::Ucan,
        }
    }
}
