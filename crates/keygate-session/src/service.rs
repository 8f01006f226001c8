//! Wallet login and session token lifecycle
//!
//! `NoSession -> ChallengeIssued -> Verified -> ActiveSession`, then either
//! rotation back into `ActiveSession` or revocation/expiry back to `NoSession`.

use crate::challenge::{Challenge, ChallengeStore};
use crate::refresh::{RefreshSession, RefreshSessionStore};
use crate::tokens::{
    AccessTokenClaims, RefreshTokenClaims, SessionClaims, TokenBundle, TokenCodec, TokenKind,
};
use keygate_core::crypto::verify_wallet_signature;
use keygate_core::{normalize_address, AuthError, ClockSource, SessionConfig};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Failure from a login attempt
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The challenge or signature was rejected
    #[error(transparent)]
    Rejected(#[from] AuthError),

    /// Tokens could not be signed
    #[error("Failed to sign session token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for SessionError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SessionError::Signing(err.to_string())
    }
}

/// Challenge issuance, login verification and refresh rotation
pub struct SessionTokenService {
    challenges: ChallengeStore,
    sessions: RefreshSessionStore,
    codec: TokenCodec,
    clock: Arc<dyn ClockSource>,
    access_ttl_ms: u64,
    refresh_ttl_ms: u64,
}

impl SessionTokenService {
    /// Service over in-memory stores
    pub fn new(config: &SessionConfig, clock: Arc<dyn ClockSource>) -> Self {
        let challenges = ChallengeStore::new(
            clock.clone(),
            config.challenge_ttl_ms,
            config.challenge_title.clone(),
        );
        let sessions = RefreshSessionStore::new(clock.clone());
        Self::with_stores(config, clock, challenges, sessions)
    }

    /// Service over caller-built stores
    pub fn with_stores(
        config: &SessionConfig,
        clock: Arc<dyn ClockSource>,
        challenges: ChallengeStore,
        sessions: RefreshSessionStore,
    ) -> Self {
        Self {
            challenges,
            sessions,
            codec: TokenCodec::new(config.jwt_secret.as_bytes()),
            clock,
            access_ttl_ms: config.access_ttl_ms,
            refresh_ttl_ms: config.refresh_ttl_ms,
        }
    }

    /// Challenge store backing this service
    pub fn challenges(&self) -> &ChallengeStore {
        &self.challenges
    }

    /// Refresh session store backing this service
    pub fn sessions(&self) -> &RefreshSessionStore {
        &self.sessions
    }

    /// Issue a login challenge for `address`
    pub fn issue_challenge(&self, address: &str) -> Challenge {
        let challenge = self.challenges.issue(address);
        info!(address = %challenge.address, expires_at = challenge.expires_at, "Issued login challenge");
        challenge
    }

    /// Check a signed challenge and start a session
    pub fn verify_and_issue(
        &self,
        address: &str,
        signature: &str,
    ) -> Result<TokenBundle, SessionError> {
        let address = normalize_address(address);

        let challenge = self.challenges.get(&address).ok_or_else(|| {
            debug!(%address, "Login rejected: no challenge");
            AuthError::ChallengeAbsent
        })?;

        if challenge.is_expired(self.clock.now_ms()) {
            // leave a challenge issued since `get` in place
            self.challenges.take_matching(&address, &challenge.nonce);
            debug!(%address, "Login rejected: challenge expired");
            return Err(AuthError::ChallengeExpired.into());
        }

        if !verify_wallet_signature(&challenge.challenge_text, signature, &address) {
            debug!(%address, "Login rejected: signature does not recover to address");
            return Err(AuthError::InvalidSignature.into());
        }

        // A concurrent verifier may have consumed or replaced it since `get`
        if self
            .challenges
            .take_matching(&address, &challenge.nonce)
            .is_none()
        {
            debug!(%address, "Login rejected: challenge consumed concurrently");
            return Err(AuthError::ChallengeAbsent.into());
        }

        let bundle = self.issue_bundle(&address)?;
        info!(%address, "Wallet login succeeded");
        Ok(bundle)
    }

    /// Mint a fresh access/refresh pair and record the refresh session
    pub fn issue_bundle(&self, address: &str) -> Result<TokenBundle, SessionError> {
        let address = normalize_address(address);
        let now = self.clock.now_ms();
        let refresh_id = Uuid::new_v4().to_string();
        let access_expires_at = now.saturating_add(self.access_ttl_ms);
        let refresh_expires_at = now.saturating_add(self.refresh_ttl_ms);

        let access_token = self.codec.sign(&AccessTokenClaims {
            address: address.clone(),
            kind: TokenKind::Access,
            session_id: refresh_id.clone(),
            expiry: access_expires_at / 1000,
            issued_at: now / 1000,
        })?;
        let refresh_token = self.codec.sign(&RefreshTokenClaims {
            address: address.clone(),
            kind: TokenKind::Refresh,
            refresh_id: refresh_id.clone(),
            expiry: refresh_expires_at / 1000,
            issued_at: now / 1000,
        })?;

        self.sessions.insert(RefreshSession {
            refresh_id,
            address: address.clone(),
            expires_at: refresh_expires_at,
        });

        Ok(TokenBundle {
            address,
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Claims of a live access token, or the reason it was rejected
    pub fn check_access(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        let claims: AccessTokenClaims = self
            .codec
            .decode(token, TokenKind::Access)
            .map_err(|err| {
                debug!(reason = %err, "Access token rejected");
                err
            })?;
        if claims.is_expired(self.clock.now_ms()) {
            debug!(address = %claims.address, "Access token rejected: expired");
            return Err(AuthError::TokenExpired);
        }
        Ok(claims)
    }

    /// Claims of a live access token, or `None` for anything else
    pub fn verify_access(&self, token: &str) -> Option<AccessTokenClaims> {
        self.check_access(token).ok()
    }

    /// Exchange a refresh token for a new bundle, invalidating the old one
    pub fn rotate_refresh(&self, refresh_token: &str) -> Option<TokenBundle> {
        let now = self.clock.now_ms();
        let claims: RefreshTokenClaims = match self.codec.decode(refresh_token, TokenKind::Refresh)
        {
            Ok(claims) => claims,
            Err(err) => {
                debug!(reason = %err, "Refresh token rejected");
                return None;
            }
        };
        if claims.is_expired(now) {
            debug!(address = %claims.address, "Refresh token rejected: expired");
            return None;
        }

        let Some(session) = self.sessions.consume(&claims.refresh_id) else {
            warn!(address = %claims.address, "Refresh token has no live session; possible replay");
            return None;
        };
        if session.address != claims.address {
            warn!(address = %claims.address, "Refresh session belongs to another address");
            return None;
        }
        if now > session.expires_at {
            debug!(address = %claims.address, "Refresh session expired");
            return None;
        }

        match self.issue_bundle(&session.address) {
            Ok(bundle) => {
                info!(address = %bundle.address, "Rotated refresh token");
                Some(bundle)
            }
            Err(err) => {
                warn!(error = %err, "Failed to issue rotated bundle");
                None
            }
        }
    }

    /// Drop the refresh session behind a token; never fails
    ///
    /// Expired tokens are still honored so stale rows can be cleaned.
    pub fn revoke(&self, refresh_token: &str) {
        match self
            .codec
            .decode::<RefreshTokenClaims>(refresh_token, TokenKind::Refresh)
        {
            Ok(claims) => {
                if self.sessions.revoke(&claims.refresh_id) {
                    info!(address = %claims.address, "Revoked refresh session");
                }
            }
            Err(err) => debug!(reason = %err, "Ignoring unverifiable token on revoke"),
        }
    }

    /// Sweep expired challenges and refresh sessions
    pub fn prune_expired(&self) -> (usize, usize) {
        let challenges = self.challenges.prune_expired();
        let sessions = self.sessions.prune_expired();
        if challenges + sessions > 0 {
            debug!(challenges, sessions, "Pruned expired session state");
        }
        (challenges, sessions)
    }
}
