//! Role definitions and assignments (Cosmos SQL RBAC and Azure RBAC share the shape).

use std::collections::BTreeSet;

/// Assignment of a role to a principal at a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// Assignment name (a deterministic UUID)
    pub id: String,
    pub scope: String,
    /// Fully-qualified role definition id
    pub role_definition_id: String,
    pub principal_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleDefinitionType {
    BuiltIn,
    Custom,
}

impl RoleDefinitionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RoleDefinitionType::BuiltIn => "BuiltInRole",
            RoleDefinitionType::Custom => "CustomRole",
        }
    }

    /// Parse the service's `type`/`roleType` value; anything unknown is custom
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("BuiltInRole") {
            RoleDefinitionType::BuiltIn
        } else {
            RoleDefinitionType::Custom
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDefinition {
    /// Role definition name (UUID), not the full resource id
    pub id: String,
    pub name: String,
    pub kind: RoleDefinitionType,
    pub assignable_scopes: BTreeSet<String>,
    pub data_actions: BTreeSet<String>,
}

/// Result of creating an assignment that may already exist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    Created(String),
    /// The service reported a conflict; carries the existing assignment id when known
    AlreadyExists(Option<String>),
}

impl AssignmentOutcome {
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            AssignmentOutcome::Created(id) => Some(id),
            AssignmentOutcome::AlreadyExists(id) => id.as_deref(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentOutcome::Created(_) => "created",
            AssignmentOutcome::AlreadyExists(_) => "already_exists",
        }
    }
}
