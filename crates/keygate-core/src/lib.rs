//! Keygate Core
//!
//! Foundation shared by the session and capability crates:
//! - [`AuthError`]: the single failure vocabulary every verifier reports in
//! - [`ClockSource`]: injectable wall-clock time
//! - [`AuthenticatedPrincipal`]: what collaborators receive after verification
//! - [`crypto`]: wallet signature recovery for signed login messages
//! - [`config`]: layered TOML + environment configuration

pub mod config;
pub mod crypto;
pub mod errors;
pub mod principal;
pub mod time;

pub use config::{AuthConfig, ConfigError, CookieConfig, SameSite, ServerConfig, SessionConfig, UcanConfig};
pub use errors::{AuthError, AuthResult};
pub use principal::{normalize_address, pkh_did, AuthMethod, AuthenticatedPrincipal, PKH_ETH_PREFIX};
pub use time::{normalize_epoch_millis, ClockSource, SystemClock};
