//! Builders for capability invocation tokens and SIWE root proofs
//!
//! These produce wire-format values independently of the verifier crate, so
//! tests exercise the same bytes a browser client would send.

use crate::{DidKeySigner, TestWallet};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::{json, Value};

fn capability(resource: &str, action: &str) -> Value {
    json!({ "resource": resource, "action": action })
}

fn encode_segment(value: &Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

/// Render a SIWE-style login message embedding a `UCAN-AUTH` statement
pub fn siwe_statement_message(address: &str, statement: &Value) -> String {
    [
        "localhost wants you to sign in with your Ethereum account:".to_string(),
        address.to_string(),
        String::new(),
        format!("UCAN-AUTH {statement}"),
        String::new(),
        "URI: http://localhost".to_string(),
        "Version: 1".to_string(),
        "Chain ID: 1".to_string(),
        "Nonce: 8f2c4a1e".to_string(),
        "Issued At: 2024-01-01T00:00:00.000Z".to_string(),
    ]
    .join("\n")
}

/// Builder for a signed three-segment capability token
#[derive(Debug, Clone)]
pub struct UcanBuilder {
    signer: DidKeySigner,
    header: Value,
    issuer: Option<String>,
    audience: String,
    capabilities: Vec<Value>,
    expiry: Option<u64>,
    not_before: Option<u64>,
    proofs: Vec<Value>,
}

impl UcanBuilder {
    /// Token issued and signed by `signer`, addressed to `audience`
    pub fn new(signer: &DidKeySigner, audience: impl Into<String>) -> Self {
        Self {
            signer: signer.clone(),
            header: json!({ "alg": "EdDSA", "typ": "JWT" }),
            issuer: None,
            audience: audience.into(),
            capabilities: Vec::new(),
            expiry: None,
            not_before: None,
            proofs: Vec::new(),
        }
    }

    /// Grant a capability
    pub fn capability(mut self, resource: &str, action: &str) -> Self {
        self.capabilities.push(capability(resource, action));
        self
    }

    /// Set `exp` (milliseconds or seconds, written as given)
    pub fn expires_at(mut self, exp: u64) -> Self {
        self.expiry = Some(exp);
        self
    }

    /// Set `nbf`
    pub fn not_before(mut self, nbf: u64) -> Self {
        self.not_before = Some(nbf);
        self
    }

    /// Append a delegation token proof
    pub fn proof_token(mut self, token: impl Into<String>) -> Self {
        self.proofs.push(Value::String(token.into()));
        self
    }

    /// Append a root proof object
    pub fn proof_root(mut self, root: Value) -> Self {
        self.proofs.push(root);
        self
    }

    /// Replace the header object
    pub fn header(mut self, header: Value) -> Self {
        self.header = header;
        self
    }

    /// Claim an `iss` other than the signer's DID
    pub fn claimed_issuer(mut self, did: impl Into<String>) -> Self {
        self.issuer = Some(did.into());
        self
    }

    /// Payload object as it will be encoded
    pub fn payload(&self) -> Value {
        let mut payload = json!({
            "iss": self.issuer.clone().unwrap_or_else(|| self.signer.did()),
            "aud": self.audience,
            "cap": self.capabilities,
        });
        if let Some(exp) = self.expiry {
            payload["exp"] = json!(exp);
        }
        if let Some(nbf) = self.not_before {
            payload["nbf"] = json!(nbf);
        }
        if !self.proofs.is_empty() {
            payload["prf"] = Value::Array(self.proofs.clone());
        }
        payload
    }

    /// Encode and sign the token
    pub fn build(&self) -> String {
        let signing_input = format!(
            "{}.{}",
            encode_segment(&self.header),
            encode_segment(&self.payload())
        );
        let signature = self.signer.sign(signing_input.as_bytes());
        format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature))
    }
}

/// Builder for a wallet-signed root proof
#[derive(Debug, Clone)]
pub struct RootProofBuilder {
    wallet: TestWallet,
    audience: String,
    capabilities: Vec<Value>,
    expiry: u64,
    not_before: Option<u64>,
    top_level_claims: bool,
    statement: Option<Value>,
    issuer: Option<String>,
}

impl RootProofBuilder {
    /// Root signed by `wallet`, delegating to `audience` until `expiry`
    pub fn new(wallet: &TestWallet, audience: impl Into<String>, expiry: u64) -> Self {
        Self {
            wallet: wallet.clone(),
            audience: audience.into(),
            capabilities: Vec::new(),
            expiry,
            not_before: None,
            top_level_claims: true,
            statement: None,
            issuer: None,
        }
    }

    /// Grant a capability
    pub fn capability(mut self, resource: &str, action: &str) -> Self {
        self.capabilities.push(capability(resource, action));
        self
    }

    /// Set `nbf` in the signed statement
    pub fn not_before(mut self, nbf: u64) -> Self {
        self.not_before = Some(nbf);
        self
    }

    /// Omit `aud`/`cap`/`exp` from the unsigned top level
    pub fn statement_only(mut self) -> Self {
        self.top_level_claims = false;
        self
    }

    /// Sign this statement instead of the one derived from the builder
    pub fn signed_statement(mut self, statement: Value) -> Self {
        self.statement = Some(statement);
        self
    }

    /// Claim an `iss` other than the signer's `did:pkh`
    pub fn claimed_issuer(mut self, did: impl Into<String>) -> Self {
        self.issuer = Some(did.into());
        self
    }

    /// Statement embedded in the signed message
    pub fn statement(&self) -> Value {
        if let Some(statement) = &self.statement {
            return statement.clone();
        }
        let mut statement = json!({
            "aud": self.audience,
            "cap": self.capabilities,
            "exp": self.expiry,
        });
        if let Some(nbf) = self.not_before {
            statement["nbf"] = json!(nbf);
        }
        statement
    }

    /// Sign the message and assemble the root proof object
    pub fn build(&self) -> Value {
        let address = self.wallet.address();
        let message = siwe_statement_message(&address, &self.statement());
        let signature = self.wallet.sign_message(&message);

        let mut root = json!({
            "type": "siwe",
            "iss": self
                .issuer
                .clone()
                .unwrap_or_else(|| format!("did:pkh:eth:{address}")),
            "siwe": { "message": message, "signature": signature },
        });
        if self.top_level_claims {
            root["aud"] = json!(self.audience);
            root["cap"] = Value::Array(self.capabilities.clone());
            root["exp"] = json!(self.expiry);
        }
        root
    }
}
