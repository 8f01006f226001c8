//! Resource/action capabilities and attenuation checks

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission to perform `action` on `resource`
///
/// Either field may be `*` or end in `*` to act as a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Capability {
    /// Resource literal or pattern
    pub resource: String,
    /// Action literal or pattern
    pub action: String,
}

impl Capability {
    /// Create a capability
    pub fn new(resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            action: action.into(),
        }
    }

    /// Whether this capability, read as a pattern, covers `other`
    pub fn covers(&self, other: &Capability) -> bool {
        matches(&self.resource, &other.resource) && matches(&self.action, &other.action)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.action)
    }
}

/// Match a single pattern against a value
pub fn matches(pattern: &str, value: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some("") => true,
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

/// Whether `held` covers every capability in `required`
///
/// An empty `held` set never satisfies anything, including an empty `required`.
pub fn satisfies(held: &[Capability], required: &[Capability]) -> bool {
    !held.is_empty() && required.iter().all(|r| held.iter().any(|h| h.covers(r)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cap(resource: &str, action: &str) -> Capability {
        Capability::new(resource, action)
    }

    #[test]
    fn wildcard_and_prefix_patterns() {
        assert!(matches("*", "anything"));
        assert!(matches("*", ""));
        assert!(matches("profile*", "profile/settings"));
        assert!(matches("profile*", "profile"));
        assert!(!matches("profile*", "wallet"));
        assert!(matches("read", "read"));
        assert!(!matches("read", "reader"));
        // only a trailing star is special
        assert!(!matches("pro*file", "profile"));
    }

    #[test]
    fn prefix_grant_covers_nested_resource() {
        assert!(satisfies(
            &[cap("profile*", "read")],
            &[cap("profile/settings", "read")]
        ));
    }

    #[test]
    fn unrelated_resource_is_denied() {
        assert!(!satisfies(&[cap("profile", "read")], &[cap("wallet", "read")]));
        assert!(!satisfies(&[cap("profile", "read")], &[cap("profile", "write")]));
    }

    #[test]
    fn every_requirement_needs_cover() {
        let held = [cap("profile", "read"), cap("wallet", "*")];
        assert!(satisfies(&held, &[cap("profile", "read"), cap("wallet", "sign")]));
        assert!(!satisfies(&held, &[cap("profile", "read"), cap("audit", "read")]));
    }

    #[test]
    fn empty_sets() {
        assert!(!satisfies(&[], &[cap("profile", "read")]));
        assert!(!satisfies(&[], &[]));
        assert!(satisfies(&[cap("profile", "read")], &[]));
    }

    proptest! {
        #[test]
        fn star_covers_everything(resource in "[a-z/]{0,16}", action in "[a-z]{0,8}") {
            prop_assert!(satisfies(&[cap("*", "*")], &[cap(&resource, &action)]));
        }

        #[test]
        fn literal_covers_only_itself(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            prop_assert_eq!(matches(&a, &b), a == b);
        }

        #[test]
        fn prefix_pattern_is_starts_with(prefix in "[a-z]{0,6}", value in "[a-z]{0,10}") {
            let pattern = format!("{prefix}*");
            prop_assert_eq!(matches(&pattern, &value), value.starts_with(&prefix));
        }
    }
}
