//! # Data Model
//!
//! Desired-state descriptors and read models exchanged with the control plane.
//!
//! Descriptors carry no wire concerns; the Resource Manager client maps them onto the
//! REST payloads.

pub mod account;
pub mod container;
pub mod rbac;
pub mod throughput;

pub use account::{AccountDescriptor, AccountInfo, AuthMode, PublicNetworkAccess};
pub use container::{
    ComputedProperty, ConflictResolution, ConflictResolutionMode, ContainerDescriptor,
    DistanceFunction, IndexingMode, IndexingPolicy, PartitionKind, TtlPolicy, VectorDataType,
    VectorEmbedding, VectorEmbeddingPolicy, VectorIndex, VectorIndexType,
};
pub use rbac::{AssignmentOutcome, RoleAssignment, RoleDefinition, RoleDefinitionType};
pub use throughput::{ThroughputSetting, ThroughputSettings};

/// Principal the workflow runs as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalIdentity {
    pub object_id: String,
    /// Sign-in name when the token carries one (users, not service principals)
    pub display_name: Option<String>,
}

/// Desired SQL database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseDescriptor {
    pub name: String,
    pub location: String,
}

/// Id and name of a resource returned by the control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub id: String,
    pub name: String,
}

/// Subscription read during pre-flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionInfo {
    pub id: String,
    pub display_name: Option<String>,
    pub state: Option<String>,
}

/// Optional container features the control plane can provision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub vector_search: bool,
    pub computed_properties: bool,
}

impl ProviderCapabilities {
    #[must_use]
    pub fn full() -> Self {
        Self {
            vector_search: true,
            computed_properties: true,
        }
    }

    #[must_use]
    pub fn minimal() -> Self {
        Self {
            vector_search: false,
            computed_properties: false,
        }
    }
}
