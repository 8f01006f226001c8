//! Keygate UCAN
//!
//! Verification of capability invocation tokens: Ed25519-signed, `did:key`
//! issued delegation tokens whose proof chain terminates in a wallet-signed
//! SIWE root.
//!
//! - [`did`]: `did:key` resolution
//! - [`capability`]: pattern matching and attenuation
//! - [`token`]: strict three-segment decoding
//! - [`root`]: SIWE root proofs and their `UCAN-AUTH` statement
//! - [`UcanVerifier`]: the chain walk
//! - [`BearerCredential`]: routing a bearer value to the right verifier

pub mod capability;
pub mod classify;
pub mod did;
pub mod root;
pub mod token;
pub mod verifier;

pub use capability::{matches, satisfies, Capability};
pub use classify::{bearer_token, is_ucan_token, BearerCredential};
pub use root::{RootProof, RootStatement, VerifiedRoot};
pub use token::{DecodedUcan, Proof, UcanHeader, UcanPayload};
pub use verifier::{UcanVerifier, DEFAULT_MAX_CHAIN_DEPTH};
