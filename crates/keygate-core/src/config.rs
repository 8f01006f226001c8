//! Layered configuration for Keygate
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! environment variables, then explicit overrides from the command line.
//! [`AuthConfig::validate`] runs last.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Secret used when nothing else is configured
pub const DEFAULT_JWT_SECRET: &str = "replace-this-in-production";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment variable or override could not be parsed
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable or key name
        key: String,
        /// Rejected raw value
        value: String,
    },

    /// Loaded values violate a constraint
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Session token and login challenge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// HMAC secret for access and refresh tokens
    pub jwt_secret: String,
    /// Access token lifetime in milliseconds
    pub access_ttl_ms: u64,
    /// Refresh token lifetime in milliseconds
    pub refresh_ttl_ms: u64,
    /// Login challenge lifetime in milliseconds
    pub challenge_ttl_ms: u64,
    /// First line of the challenge message shown in the wallet
    pub challenge_title: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_ttl_ms: 15 * 60 * 1000,
            refresh_ttl_ms: 7 * 24 * 60 * 60 * 1000,
            challenge_ttl_ms: 5 * 60 * 1000,
            challenge_title: "Sign to login".to_string(),
        }
    }
}

/// Capability invocation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UcanConfig {
    /// DID this server answers to as an invocation audience
    pub audience: String,
    /// Resource every invocation must be allowed to touch
    pub resource: String,
    /// Action every invocation must be allowed to perform
    pub action: String,
    /// Upper bound on proof links walked per invocation
    pub max_chain_depth: usize,
}

impl Default for UcanConfig {
    fn default() -> Self {
        Self {
            audience: "did:web:localhost:8001".to_string(),
            resource: "profile".to_string(),
            action: "read".to_string(),
            max_chain_depth: 16,
        }
    }
}

/// `SameSite` attribute for the refresh cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    /// Sent on top-level navigations
    #[default]
    Lax,
    /// Never sent cross-site
    Strict,
    /// Always sent; requires `Secure`
    None,
}

impl FromStr for SameSite {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(SameSite::Lax),
            "strict" => Ok(SameSite::Strict),
            "none" => Ok(SameSite::None),
            _ => Err(ConfigError::InvalidValue {
                key: "same_site".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Lax => write!(f, "Lax"),
            SameSite::Strict => write!(f, "Strict"),
            SameSite::None => write!(f, "None"),
        }
    }
}

/// Refresh cookie settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Cookie name carrying the refresh token
    pub name: String,
    /// `SameSite` attribute
    pub same_site: SameSite,
    /// Whether to mark the cookie `Secure`
    pub secure: bool,
    /// Cookie path; should cover the auth routes
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            same_site: SameSite::Lax,
            secure: false,
            path: "/auth".to_string(),
        }
    }
}

/// Listener settings for the server binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub bind: String,
    /// Seconds between sweeps of expired challenges and sessions
    pub prune_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8001".to_string(),
            prune_interval_secs: 60,
        }
    }
}

/// Complete Keygate configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session tokens and challenges
    pub session: SessionConfig,
    /// Capability invocations
    pub ucan: UcanConfig,
    /// Refresh cookie
    pub cookie: CookieConfig,
    /// Listener
    pub server: ServerConfig,
}

fn parse_env<T: FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value,
        })
}

impl AuthConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// Empty values are ignored so an exported-but-blank variable keeps the
    /// file or default value.
    pub fn merge_with_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("JWT_SECRET") {
            self.session.jwt_secret = v;
        }
        if let Some(v) = var("ACCESS_TTL_MS") {
            self.session.access_ttl_ms = parse_env("ACCESS_TTL_MS", v)?;
        }
        if let Some(v) = var("REFRESH_TTL_MS") {
            self.session.refresh_ttl_ms = parse_env("REFRESH_TTL_MS", v)?;
        }
        if let Some(v) = var("AUTH_CHALLENGE_TTL_MS") {
            self.session.challenge_ttl_ms = parse_env("AUTH_CHALLENGE_TTL_MS", v)?;
        }
        if let Some(v) = var("UCAN_AUD") {
            self.ucan.audience = v;
        }
        if let Some(v) = var("UCAN_RESOURCE") {
            self.ucan.resource = v;
        }
        if let Some(v) = var("UCAN_ACTION") {
            self.ucan.action = v;
        }
        if let Some(v) = var("AUTH_REFRESH_COOKIE_NAME") {
            self.cookie.name = v;
        }
        if let Some(v) = var("COOKIE_SAMESITE") {
            self.cookie.same_site = v.parse()?;
        }
        if let Some(v) = var("COOKIE_SECURE") {
            self.cookie.secure = parse_env("COOKIE_SECURE", v.to_ascii_lowercase())?;
        }
        if let Some(v) = var("APP_BIND") {
            self.server.bind = v;
        }
        Ok(())
    }

    /// Check constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let session = &self.session;
        if session.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("session.jwt_secret is empty".into()));
        }
        for (name, ttl) in [
            ("session.access_ttl_ms", session.access_ttl_ms),
            ("session.refresh_ttl_ms", session.refresh_ttl_ms),
            ("session.challenge_ttl_ms", session.challenge_ttl_ms),
        ] {
            if ttl == 0 {
                return Err(ConfigError::Invalid(format!("{name} must be positive")));
            }
        }
        if self.ucan.audience.trim().is_empty() {
            return Err(ConfigError::Invalid("ucan.audience is empty".into()));
        }
        if self.ucan.resource.is_empty() || self.ucan.action.is_empty() {
            return Err(ConfigError::Invalid(
                "ucan.resource and ucan.action must be set".into(),
            ));
        }
        if self.ucan.max_chain_depth == 0 {
            return Err(ConfigError::Invalid(
                "ucan.max_chain_depth must be at least 1".into(),
            ));
        }
        if self.cookie.name.is_empty() {
            return Err(ConfigError::Invalid("cookie.name is empty".into()));
        }
        if self.cookie.same_site == SameSite::None && !self.cookie.secure {
            tracing::warn!("cookie.same_site = none without cookie.secure; browsers will drop it");
        }
        if session.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("session.jwt_secret is the built-in default; set JWT_SECRET");
        }
        Ok(())
    }
}
