//! # Deterministic Names
//!
//! Name-based (UUIDv5) identifiers for resources that Resource Manager requires the
//! caller to name: role assignments and custom role definitions.
//!
//! The same inputs always produce the same id, so re-running the workflow updates the
//! existing resource instead of creating a duplicate.

use uuid::Uuid;

/// UUIDv5 of `parts` joined with `|` under `namespace`
#[must_use]
pub fn stable_id(namespace: &Uuid, parts: &[&str]) -> Uuid {
    Uuid::new_v5(namespace, parts.join("|").as_bytes())
}

/// Generator bound to one namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StableIdGenerator {
    namespace: Uuid,
}

impl Default for StableIdGenerator {
    fn default() -> Self {
        Self {
            namespace: Uuid::NAMESPACE_URL,
        }
    }
}

impl StableIdGenerator {
    #[must_use]
    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }

    /// Namespace scoped to a subscription
    ///
    /// Subscription ids are UUIDs and are used as-is. Anything else is hashed into the
    /// URL namespace so the result is still stable.
    #[must_use]
    pub fn for_subscription(subscription_id: &str) -> Self {
        let subscription_id = subscription_id.trim();
        let namespace = Uuid::parse_str(subscription_id)
            .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_URL, subscription_id.as_bytes()));
        Self { namespace }
    }

    #[must_use]
    pub fn namespace(&self) -> Uuid {
        self.namespace
    }

    #[must_use]
    pub fn id(&self, parts: &[&str]) -> Uuid {
        stable_id(&self.namespace, parts)
    }

    /// Role assignment name for `principal` holding `role_definition_id` at `scope`
    #[must_use]
    pub fn role_assignment_id(&self, scope: &str, role_definition_id: &str, principal: &str) -> Uuid {
        self.id(&[scope, role_definition_id, principal])
    }
}
