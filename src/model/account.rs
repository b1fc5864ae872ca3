//! Cosmos DB account descriptor and read model.

use std::collections::{BTreeMap, BTreeSet};

/// Authentication methods the account accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthMode {
    /// Whether account keys are accepted in addition to Entra ID tokens
    pub local_auth_enabled: bool,
}

impl AuthMode {
    /// Entra ID (RBAC) only, keys disabled
    #[must_use]
    pub fn entra_id_only() -> Self {
        Self {
            local_auth_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicNetworkAccess {
    Enabled,
    Disabled,
}

impl PublicNetworkAccess {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PublicNetworkAccess::Enabled => "Enabled",
            PublicNetworkAccess::Disabled => "Disabled",
        }
    }
}

/// Desired state of a Cosmos DB (NoSQL) account with a single write region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDescriptor {
    pub name: String,
    pub location: String,
    pub capabilities: BTreeSet<String>,
    pub auth: AuthMode,
    pub tags: BTreeMap<String, String>,
    pub public_network_access: PublicNetworkAccess,
    pub zone_redundant: bool,
}

impl AccountDescriptor {
    #[must_use]
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

/// Account as reported by the control plane after an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub provisioning_state: Option<String>,
    pub document_endpoint: Option<String>,
}
