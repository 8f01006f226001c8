//! Wallet-signed root proofs
//!
//! A root proof carries a SIWE message and its `personal_sign` signature. The
//! message must contain a `UCAN-AUTH {json}` line; that signed statement is the
//! only source of the root's audience, capabilities and validity window. Any
//! unsigned top-level copies must agree with it.

use crate::capability::Capability;
use keygate_core::crypto::recover_address;
use keygate_core::{normalize_epoch_millis, pkh_did, AuthError, AuthResult};
use serde::Deserialize;

/// Marker that starts the signed statement line
pub const STATEMENT_MARKER: &str = "UCAN-AUTH";

/// Only supported root proof type
pub const SIWE_ROOT_TYPE: &str = "siwe";

/// Signed message and its signature
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SiweEnvelope {
    /// Full text the wallet signed
    pub message: String,
    /// `0x`-prefixed 65-byte signature
    pub signature: String,
}

/// Root proof as it appears in a `prf` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RootProof {
    /// Proof type, must be `siwe`
    #[serde(rename = "type")]
    pub kind: String,
    /// Claimed `did:pkh:eth` issuer, the anchor the signer must recover to
    pub iss: String,
    /// Unsigned copy of the audience
    #[serde(default)]
    pub aud: Option<String>,
    /// Unsigned copy of the capabilities
    #[serde(default)]
    pub cap: Option<Vec<Capability>>,
    /// Unsigned copy of the expiry
    #[serde(default)]
    pub exp: Option<u64>,
    /// Unsigned copy of the not-before time
    #[serde(default)]
    pub nbf: Option<u64>,
    /// Signed material
    pub siwe: SiweEnvelope,
}

/// Claims embedded in the `UCAN-AUTH` line
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RootStatement {
    /// Delegated audience
    #[serde(default)]
    pub aud: Option<String>,
    /// Delegated capabilities
    #[serde(default)]
    pub cap: Option<Vec<Capability>>,
    /// Expiry, seconds or milliseconds
    #[serde(default)]
    pub exp: Option<u64>,
    /// Not-before, seconds or milliseconds
    #[serde(default)]
    pub nbf: Option<u64>,
}

/// Root proof whose signature and statement have been checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedRoot {
    /// Lower-case address recovered from the signature
    pub address: String,
    /// `did:pkh:eth` form of `address`
    pub issuer: String,
    /// Audience from the signed statement
    pub audience: String,
    /// Capabilities from the signed statement
    pub capabilities: Vec<Capability>,
    /// Expiry, epoch milliseconds
    pub expires_at: u64,
    /// Not-before, epoch milliseconds
    pub not_before: Option<u64>,
}

impl VerifiedRoot {
    /// Check `now_ms` against the signed `[nbf, exp]` window
    pub fn check_window(&self, now_ms: u64) -> AuthResult<()> {
        if self.not_before.is_some_and(|nbf| now_ms < nbf) {
            return Err(AuthError::TokenNotYetValid);
        }
        if now_ms > self.expires_at {
            return Err(AuthError::RootExpired);
        }
        Ok(())
    }
}

/// JSON text of the first `UCAN-AUTH` line, if any
pub fn extract_statement(message: &str) -> Option<&str> {
    message.lines().find_map(|line| {
        line.trim()
            .strip_prefix(STATEMENT_MARKER)
            .map(|rest| rest.trim_start_matches(|c: char| c == ':' || c.is_whitespace()))
    })
}

/// Parse the signed statement out of a SIWE message
pub fn parse_statement(message: &str) -> AuthResult<RootStatement> {
    let json = extract_statement(message).ok_or(AuthError::RootClaimMismatch {
        field: "statement",
    })?;
    serde_json::from_str(json)
        .map_err(|e| AuthError::malformed(format!("{STATEMENT_MARKER} statement: {e}")))
}

fn agree<T: PartialEq>(unsigned: Option<&T>, signed: &T, field: &'static str) -> AuthResult<()> {
    match unsigned {
        Some(value) if value != signed => Err(AuthError::RootClaimMismatch { field }),
        _ => Ok(()),
    }
}

impl RootProof {
    /// Check the statement against top-level claims and recover the signer
    ///
    /// Chain position and validity window are left to the caller.
    pub fn verify(&self) -> AuthResult<VerifiedRoot> {
        if self.kind != SIWE_ROOT_TYPE {
            return Err(AuthError::malformed(format!(
                "unsupported root proof type {:?}",
                self.kind
            )));
        }

        let statement = parse_statement(&self.siwe.message)?;
        let audience = statement
            .aud
            .ok_or(AuthError::RootClaimMismatch { field: "aud" })?;
        let capabilities = statement
            .cap
            .ok_or(AuthError::RootClaimMismatch { field: "cap" })?;
        let expires_at = statement
            .exp
            .map(normalize_epoch_millis)
            .ok_or(AuthError::RootClaimMismatch { field: "exp" })?;
        let not_before = statement.nbf.map(normalize_epoch_millis);

        agree(self.aud.as_ref(), &audience, "aud")?;
        agree(self.cap.as_ref(), &capabilities, "cap")?;
        agree(
            self.exp.map(normalize_epoch_millis).as_ref(),
            &expires_at,
            "exp",
        )?;
        if let Some(nbf) = self.nbf.map(normalize_epoch_millis) {
            if Some(nbf) != not_before {
                return Err(AuthError::RootClaimMismatch { field: "nbf" });
            }
        }

        let address = recover_address(&self.siwe.message, &self.siwe.signature)?;
        let issuer = pkh_did(&address);
        if !self.iss.eq_ignore_ascii_case(&issuer) {
            return Err(AuthError::RootIssuerMismatch);
        }

        Ok(VerifiedRoot {
            address,
            issuer,
            audience,
            capabilities,
            expires_at,
            not_before,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use keygate_testkit::{RootProofBuilder, TestWallet, TEST_EPOCH_MS};
    use serde_json::json;

    const DELEGATE: &str = "did:key:z6MkDelegate";

    fn root(builder: RootProofBuilder) -> RootProof {
        serde_json::from_value(builder.build()).unwrap()
    }

    #[test]
    fn statement_line_variants() {
        assert_eq!(extract_statement("a\nUCAN-AUTH {\"x\":1}\nb"), Some("{\"x\":1}"));
        assert_eq!(extract_statement("  UCAN-AUTH: {}"), Some("{}"));
        assert_eq!(extract_statement("a\r\nUCAN-AUTH {}\r\n"), Some("{}"));
        assert_eq!(extract_statement("no statement here"), None);
    }

    #[test]
    fn verifies_builder_root() {
        let wallet = TestWallet::from_seed(5);
        let verified = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                .capability("profile", "read"),
        )
        .verify()
        .unwrap();

        assert_eq!(verified.address, wallet.address());
        assert_eq!(verified.issuer, format!("did:pkh:eth:{}", wallet.address()));
        assert_eq!(verified.audience, DELEGATE);
        assert_eq!(verified.expires_at, TEST_EPOCH_MS + 60_000);
    }

    #[test]
    fn statement_only_root_is_accepted() {
        let wallet = TestWallet::from_seed(5);
        let proof = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS / 1000 + 60)
                .capability("profile", "read")
                .statement_only(),
        );
        assert!(proof.aud.is_none());
        assert_eq!(proof.verify().unwrap().expires_at, TEST_EPOCH_MS + 60_000);
    }

    #[test]
    fn top_level_must_agree_with_signed_statement() {
        let wallet = TestWallet::from_seed(5);
        let mut proof = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                .capability("profile", "read"),
        );
        proof.aud = Some("did:key:z6MkSomeoneElse".into());
        assert_matches!(
            proof.verify(),
            Err(AuthError::RootClaimMismatch { field: "aud" })
        );
    }

    #[test]
    fn every_top_level_copy_is_checked() {
        let wallet = TestWallet::from_seed(5);
        let signed = || {
            root(
                RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                    .capability("profile", "read")
                    .not_before(TEST_EPOCH_MS),
            )
        };

        let mut proof = signed();
        proof.cap = Some(vec![Capability::new("profile", "write")]);
        assert_matches!(
            proof.verify(),
            Err(AuthError::RootClaimMismatch { field: "cap" })
        );

        let mut proof = signed();
        proof.exp = Some(TEST_EPOCH_MS + 120_000);
        assert_matches!(
            proof.verify(),
            Err(AuthError::RootClaimMismatch { field: "exp" })
        );

        let mut proof = signed();
        proof.nbf = Some(TEST_EPOCH_MS - 60_000);
        assert_matches!(
            proof.verify(),
            Err(AuthError::RootClaimMismatch { field: "nbf" })
        );

        // same instants in seconds still agree
        let mut proof = signed();
        proof.exp = Some(TEST_EPOCH_MS / 1000 + 60);
        proof.nbf = Some(TEST_EPOCH_MS / 1000);
        assert!(proof.verify().is_ok());
    }

    #[test]
    fn issuer_is_required() {
        let wallet = TestWallet::from_seed(5);
        let mut value = RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
            .capability("profile", "read")
            .build();
        value.as_object_mut().unwrap().remove("iss");
        assert!(serde_json::from_value::<RootProof>(value).is_err());
    }

    #[test]
    fn checksummed_issuer_matches_signer() {
        let wallet = TestWallet::from_seed(5);
        let proof = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                .capability("profile", "read")
                .claimed_issuer(format!("did:pkh:eth:{}", wallet.address_upper())),
        );
        assert_eq!(proof.verify().unwrap().address, wallet.address());
    }

    #[test]
    fn statement_must_carry_core_claims() {
        let wallet = TestWallet::from_seed(5);
        let proof = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                .signed_statement(json!({ "aud": DELEGATE, "exp": TEST_EPOCH_MS + 60_000 })),
        );
        assert_matches!(
            proof.verify(),
            Err(AuthError::RootClaimMismatch { field: "cap" })
        );
    }

    #[test]
    fn claimed_issuer_must_match_signer() {
        let wallet = TestWallet::from_seed(5);
        let other = TestWallet::from_seed(6);
        let proof = root(
            RootProofBuilder::new(&wallet, DELEGATE, TEST_EPOCH_MS + 60_000)
                .capability("profile", "read")
                .claimed_issuer(format!("did:pkh:eth:{}", other.address())),
        );
        assert_matches!(proof.verify(), Err(AuthError::RootIssuerMismatch));
    }

    #[test]
    fn window_uses_root_specific_expiry_error() {
        let verified = VerifiedRoot {
            address: "0xabc".into(),
            issuer: "did:pkh:eth:0xabc".into(),
            audience: DELEGATE.into(),
            capabilities: Vec::new(),
            expires_at: 2_000,
            not_before: Some(1_000),
        };
        assert_matches!(verified.check_window(999), Err(AuthError::TokenNotYetValid));
        assert!(verified.check_window(2_000).is_ok());
        assert_matches!(verified.check_window(2_001), Err(AuthError::RootExpired));
    }
}
