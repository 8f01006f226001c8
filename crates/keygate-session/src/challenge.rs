//! One-time login challenges
//!
//! A challenge binds a random nonce to an address for a short window. At most
//! one challenge is live per address; issuing again replaces the old one.

use crate::backend::{MemoryBackend, SessionBackend};
use chrono::{DateTime, SecondsFormat, Utc};
use keygate_core::{normalize_address, ClockSource};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Issued login challenge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    /// Normalized address the challenge was issued for
    pub address: String,
    /// Message the wallet must sign
    #[serde(rename = "challenge")]
    pub challenge_text: String,
    /// Random hex nonce embedded in the message
    pub nonce: String,
    /// Issue time, epoch milliseconds
    pub issued_at: u64,
    /// Expiry time, epoch milliseconds
    pub expires_at: u64,
}

impl Challenge {
    /// Whether the challenge is past its expiry at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }
}

fn iso_millis(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

/// Render the human-readable message a wallet signs
pub fn render_challenge_message(
    title: &str,
    address: &str,
    nonce: &str,
    issued_at: u64,
    expires_at: u64,
) -> String {
    [
        title.to_string(),
        String::new(),
        format!("Address: {address}"),
        format!("Nonce: {nonce}"),
        format!("Issued At: {}", iso_millis(issued_at)),
        format!("Expires At: {}", iso_millis(expires_at)),
    ]
    .join("\n")
}

/// Issues and consumes challenges keyed by normalized address
pub struct ChallengeStore {
    backend: Arc<dyn SessionBackend<Challenge>>,
    clock: Arc<dyn ClockSource>,
    ttl_ms: u64,
    title: String,
}

impl ChallengeStore {
    /// Store over an in-memory backend
    pub fn new(clock: Arc<dyn ClockSource>, ttl_ms: u64, title: impl Into<String>) -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()), clock, ttl_ms, title)
    }

    /// Store over a caller-supplied backend
    pub fn with_backend(
        backend: Arc<dyn SessionBackend<Challenge>>,
        clock: Arc<dyn ClockSource>,
        ttl_ms: u64,
        title: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            clock,
            ttl_ms,
            title: title.into(),
        }
    }

    /// Issue a fresh challenge, replacing any live one for the address
    pub fn issue(&self, address: &str) -> Challenge {
        let address = normalize_address(address);
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let nonce = hex::encode(nonce);

        let issued_at = self.clock.now_ms();
        let expires_at = issued_at.saturating_add(self.ttl_ms);
        let challenge = Challenge {
            challenge_text: render_challenge_message(
                &self.title,
                &address,
                &nonce,
                issued_at,
                expires_at,
            ),
            address: address.clone(),
            nonce,
            issued_at,
            expires_at,
        };

        self.backend.put(address, challenge.clone());
        challenge
    }

    /// Live or expired challenge for the address, if any
    pub fn get(&self, address: &str) -> Option<Challenge> {
        self.backend.get(&normalize_address(address))
    }

    /// Forget the challenge for the address
    pub fn delete(&self, address: &str) {
        self.backend.take(&normalize_address(address));
    }

    /// Remove and return the challenge for the address
    pub fn take(&self, address: &str) -> Option<Challenge> {
        self.backend.take(&normalize_address(address))
    }

    /// Remove and return the challenge, but only if it still carries `nonce`
    ///
    /// Concurrent consumers race here; exactly one observes `Some`.
    pub fn take_matching(&self, address: &str, nonce: &str) -> Option<Challenge> {
        self.backend
            .take_if(&normalize_address(address), &|c: &Challenge| c.nonce == nonce)
    }

    /// Drop expired challenges, returning how many were removed
    pub fn prune_expired(&self) -> usize {
        let now = self.clock.now_ms();
        self.backend.retain(&|c: &Challenge| !c.is_expired(now))
    }

    /// Number of stored challenges
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Whether no challenges are stored
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }
}
