//! Shared handler state

use crate::authenticator::Authenticator;
use keygate_core::{AuthConfig, ClockSource, CookieConfig};
use keygate_session::SessionTokenService;
use keygate_ucan::UcanVerifier;
use std::sync::Arc;

/// Services handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Login, rotation and revocation
    pub sessions: Arc<SessionTokenService>,
    /// Bearer credential verification
    pub authenticator: Arc<Authenticator>,
    /// Refresh cookie attributes
    pub cookie: Arc<CookieConfig>,
    /// Time source shared by every service
    pub clock: Arc<dyn ClockSource>,
}

impl AppState {
    /// Build all services from configuration
    pub fn from_config(config: &AuthConfig, clock: Arc<dyn ClockSource>) -> Self {
        let sessions = Arc::new(SessionTokenService::new(&config.session, clock.clone()));
        let verifier = UcanVerifier::from_config(&config.ucan, clock.clone());
        Self {
            authenticator: Arc::new(Authenticator::new(sessions.clone(), verifier)),
            sessions,
            cookie: Arc::new(config.cookie.clone()),
            clock,
        }
    }
}
