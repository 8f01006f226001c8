//! Capability invocation verification
//!
//! An invocation is a token addressed to this server. Its `prf` list is walked
//! link by link towards a wallet-signed root, checking at each step that the
//! audience chains to the previous issuer, capabilities only narrow, and
//! expiry never extends past what the parent allows.

use crate::capability::{satisfies, Capability};
use crate::token::{DecodedUcan, Proof};
use keygate_core::{AuthError, AuthResult, AuthenticatedPrincipal, ClockSource, UcanConfig};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Default bound on proof links walked per invocation
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 16;

/// What the link being authorized demands of its proof
struct ChainState {
    current_did: String,
    required_caps: Vec<Capability>,
    required_exp: Option<u64>,
    proofs: VecDeque<Proof>,
}

/// Verifies invocations addressed to one server DID
pub struct UcanVerifier {
    server_did: String,
    required: Vec<Capability>,
    max_depth: usize,
    clock: Arc<dyn ClockSource>,
}

impl UcanVerifier {
    /// Verifier requiring `required` on every invocation
    pub fn new(
        server_did: impl Into<String>,
        required: Vec<Capability>,
        clock: Arc<dyn ClockSource>,
    ) -> Self {
        Self {
            server_did: server_did.into(),
            required,
            max_depth: DEFAULT_MAX_CHAIN_DEPTH,
            clock,
        }
    }

    /// Verifier built from the `[ucan]` config section
    pub fn from_config(config: &UcanConfig, clock: Arc<dyn ClockSource>) -> Self {
        Self::new(
            config.audience.clone(),
            vec![Capability::new(&config.resource, &config.action)],
            clock,
        )
        .with_max_depth(config.max_chain_depth)
    }

    /// Override the proof chain bound
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// DID invocations must be addressed to
    pub fn server_did(&self) -> &str {
        &self.server_did
    }

    /// Verify an invocation and resolve the wallet that rooted it
    pub fn verify_invocation(&self, token: &str) -> AuthResult<AuthenticatedPrincipal> {
        let result = self.verify_inner(token);
        if let Err(err) = &result {
            debug!(reason = %err, code = err.code(), "Capability invocation rejected");
        }
        result
    }

    fn verify_inner(&self, token: &str) -> AuthResult<AuthenticatedPrincipal> {
        let now = self.clock.now_ms();
        let invocation = DecodedUcan::decode(token)?;
        invocation.verify_signature()?;

        let payload = invocation.payload;
        if payload.aud != self.server_did {
            return Err(AuthError::audience_mismatch(&self.server_did, &payload.aud));
        }
        payload.check_window(now)?;
        if !satisfies(&payload.cap, &self.required) {
            return Err(AuthError::CapabilityDenied);
        }

        let required_exp = payload.expiry_ms();
        let state = ChainState {
            current_did: payload.iss.clone(),
            required_caps: payload.cap,
            required_exp,
            proofs: payload.prf.into(),
        };
        let address = self.walk_chain(state, now)?;

        Ok(AuthenticatedPrincipal::from_invocation(address, payload.iss))
    }

    /// Follow proofs until a root terminates the chain, returning its signer
    fn walk_chain(&self, mut state: ChainState, now: u64) -> AuthResult<String> {
        let mut depth = 0;
        loop {
            let proof = state
                .proofs
                .pop_front()
                .ok_or(AuthError::MissingProofChain)?;
            depth += 1;
            if depth > self.max_depth {
                return Err(AuthError::ChainTooDeep {
                    max: self.max_depth,
                });
            }

            match proof {
                Proof::Delegation(token) => {
                    let link = DecodedUcan::verify(&token, now)?.payload;
                    if link.aud != state.current_did {
                        return Err(AuthError::audience_mismatch(&state.current_did, &link.aud));
                    }
                    if !satisfies(&link.cap, &state.required_caps) {
                        return Err(AuthError::CapabilityDenied);
                    }
                    let link_exp = link.expiry_ms();
                    if let (Some(exp), Some(required)) = (link_exp, state.required_exp) {
                        if exp < required {
                            return Err(AuthError::ProofExpired);
                        }
                    }

                    state.current_did = link.iss;
                    state.required_caps = link.cap;
                    state.required_exp = link_exp.max(state.required_exp);
                    if !link.prf.is_empty() {
                        state.proofs = link.prf.into();
                    }
                }
                Proof::Root(root) => {
                    let root = root.verify()?;
                    if root.audience != state.current_did {
                        return Err(AuthError::audience_mismatch(
                            &state.current_did,
                            &root.audience,
                        ));
                    }
                    if !satisfies(&root.capabilities, &state.required_caps) {
                        return Err(AuthError::CapabilityDenied);
                    }
                    if state.required_exp.is_some_and(|required| root.expires_at < required) {
                        return Err(AuthError::RootExpired);
                    }
                    root.check_window(now)?;
                    return Ok(root.address);
                }
            }
        }
    }
}
