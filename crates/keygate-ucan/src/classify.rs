//! Bearer credential classification
//!
//! A bearer value is either a session access token or a capability
//! invocation. Classification only inspects the header; anything that does not
//! positively look like a capability token is treated as a session token and
//! left for session verification to reject.

use crate::token::{peek_header, EDDSA};

/// Header `typ` some clients set on capability tokens
pub const UCAN_TYP: &str = "UCAN";

/// Credential presented on a protected request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BearerCredential<'a> {
    /// HS256 session access token
    Session(&'a str),
    /// Capability invocation token
    Capability(&'a str),
}

impl<'a> BearerCredential<'a> {
    /// Classify a raw token
    pub fn classify(token: &'a str) -> Self {
        let token = token.trim();
        if is_ucan_token(token) {
            BearerCredential::Capability(token)
        } else {
            BearerCredential::Session(token)
        }
    }

    /// Classify the value of an `Authorization` header
    ///
    /// `Bearer <token>` and a bare token are both accepted.
    pub fn from_authorization(header: &'a str) -> Option<Self> {
        bearer_token(header).map(Self::classify)
    }

    /// Underlying token text
    pub fn token(&self) -> &'a str {
        match self {
            BearerCredential::Session(t) | BearerCredential::Capability(t) => t,
        }
    }
}

/// Strip an optional `Bearer` scheme; `None` when no token remains
pub fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    if header.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => header,
    };
    (!token.is_empty()).then_some(token)
}

/// Whether the header marks the token as a capability invocation
pub fn is_ucan_token(token: &str) -> bool {
    let Some(header) = peek_header(token) else {
        return false;
    };
    header.get("typ").and_then(|v| v.as_str()) == Some(UCAN_TYP)
        || header.get("alg").and_then(|v| v.as_str()) == Some(EDDSA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keygate_testkit::{DidKeySigner, UcanBuilder};
    use serde_json::json;

    #[test]
    fn eddsa_or_ucan_typ_is_capability() {
        let signer = DidKeySigner::from_seed(1);
        let token = UcanBuilder::new(&signer, "did:web:x").build();
        assert!(is_ucan_token(&token));
        assert_eq!(
            BearerCredential::classify(&token),
            BearerCredential::Capability(token.as_str())
        );

        let typed = UcanBuilder::new(&signer, "did:web:x")
            .header(json!({ "alg": "ES256", "typ": "UCAN" }))
            .build();
        assert!(is_ucan_token(&typed));
    }

    #[test]
    fn hs256_and_garbage_are_session() {
        // {"alg":"HS256","typ":"JWT"}
        let jwt = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.e30.sig";
        assert!(!is_ucan_token(jwt));
        assert!(!is_ucan_token("%%%"));
        assert!(!is_ucan_token(""));
        assert_eq!(BearerCredential::classify("%%%"), BearerCredential::Session("%%%"));
    }

    #[test]
    fn authorization_header_forms() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer   abc "), Some("abc"));
        assert_eq!(bearer_token("abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
        assert_eq!(
            BearerCredential::from_authorization("Bearer abc").map(|c| c.token()),
            Some("abc")
        );
    }
}
