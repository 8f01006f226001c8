//! Single entry point for protected-request authentication

use keygate_core::{AuthResult, AuthenticatedPrincipal};
use keygate_session::SessionTokenService;
use keygate_ucan::{BearerCredential, UcanVerifier};
use std::sync::Arc;

/// Routes a bearer credential to the verifier that understands it
pub struct Authenticator {
    sessions: Arc<SessionTokenService>,
    capabilities: UcanVerifier,
}

impl Authenticator {
    /// Combine the session service and capability verifier
    pub fn new(sessions: Arc<SessionTokenService>, capabilities: UcanVerifier) -> Self {
        Self {
            sessions,
            capabilities,
        }
    }

    /// Verify an already classified credential
    pub fn authenticate(&self, credential: BearerCredential<'_>) -> AuthResult<AuthenticatedPrincipal> {
        match credential {
            BearerCredential::Session(token) => self
                .sessions
                .check_access(token)
                .map(|claims| AuthenticatedPrincipal::from_session(claims.address)),
            BearerCredential::Capability(token) => self.capabilities.verify_invocation(token),
        }
    }

    /// Classify and verify a raw token
    pub fn authenticate_token(&self, token: &str) -> AuthResult<AuthenticatedPrincipal> {
        self.authenticate(BearerCredential::classify(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_core::{AuthError, AuthMethod, SessionConfig, UcanConfig};
    use keygate_testkit::{
        DidKeySigner, RootProofBuilder, SimulatedClock, TestWallet, UcanBuilder, HOUR_MS,
        TEST_EPOCH_MS,
    };

    fn authenticator() -> (Authenticator, Arc<SessionTokenService>) {
        let clock = Arc::new(SimulatedClock::default());
        let sessions = Arc::new(SessionTokenService::new(
            &SessionConfig::default(),
            clock.clone(),
        ));
        let verifier = UcanVerifier::from_config(&UcanConfig::default(), clock);
        (Authenticator::new(sessions.clone(), verifier), sessions)
    }

    #[test]
    fn session_token_resolves_jwt_principal() {
        let (auth, sessions) = authenticator();
        let bundle = sessions.issue_bundle("0xAbC").unwrap();

        let principal = auth.authenticate_token(&bundle.access_token).unwrap();
        assert_eq!(principal, AuthenticatedPrincipal::from_session("0xabc"));
    }

    #[test]
    fn capability_token_resolves_ucan_principal() {
        let (auth, _) = authenticator();
        let wallet = TestWallet::from_seed(21);
        let session_key = DidKeySigner::from_seed(21);
        let audience = UcanConfig::default().audience;

        let root = RootProofBuilder::new(&wallet, session_key.did(), TEST_EPOCH_MS + HOUR_MS)
            .capability("profile", "read")
            .build();
        let token = UcanBuilder::new(&session_key, audience)
            .capability("profile", "read")
            .proof_root(root)
            .build();

        let principal = auth.authenticate_token(&token).unwrap();
        assert_eq!(principal.method, AuthMethod::Ucan);
        assert_eq!(principal.address, wallet.address());
    }

    #[test]
    fn undecodable_token_fails_closed() {
        let (auth, _) = authenticator();
        assert!(matches!(
            auth.authenticate_token("not.a.token"),
            Err(AuthError::TokenMalformed { .. })
        ));
    }
}
