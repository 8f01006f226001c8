//! Keygate Session
//!
//! Wallet-signed login and the session tokens that follow it:
//! - [`ChallengeStore`]: single-use login challenges bound to an address
//! - [`RefreshSessionStore`]: server-side rows that make refresh tokens revocable
//! - [`SessionTokenService`]: verification, issuance, rotation and revocation
//!
//! Both stores sit on a [`SessionBackend`]; the in-memory backend is the
//! default, and any shared cache with atomic take semantics can replace it.

pub mod backend;
pub mod challenge;
pub mod refresh;
pub mod service;
pub mod tokens;

pub use backend::{MemoryBackend, SessionBackend};
pub use challenge::{render_challenge_message, Challenge, ChallengeStore};
pub use refresh::{RefreshSession, RefreshSessionStore};
pub use service::{SessionError, SessionTokenService};
pub use tokens::{
    AccessTokenClaims, RefreshTokenClaims, SessionClaims, TokenBundle, TokenCodec, TokenKind,
};
