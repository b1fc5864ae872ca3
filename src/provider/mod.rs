//! # Control Plane
//!
//! The collaborator that owns all Azure resource mutations.
//!
//! The workflow only talks to [`ControlPlane`]; the Resource Manager REST implementation
//! lives in [`arm`]. Tests substitute a recording fake.
//!
//! Every method takes a [`ResourcePath`] addressing either the resource itself or its
//! parent, as noted per method.

use async_trait::async_trait;
use thiserror::Error;

use crate::arm::{PathError, ResourcePath};
use crate::model::{
    AccountDescriptor, AccountInfo, AssignmentOutcome, ContainerDescriptor, DatabaseDescriptor,
    ProviderCapabilities, ResourceRef, RoleAssignment, RoleDefinition, SubscriptionInfo,
    ThroughputSetting, ThroughputSettings,
};

// Common utilities shared across provider implementations
pub mod common;

// Provider implementations
pub mod arm;

pub use arm::ArmClient;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{resource} not found: {message}")]
    NotFound { resource: String, message: String },

    #[error("{resource} conflicts with an existing resource: {message}")]
    Conflict { resource: String, message: String },

    #[error("{resource}: HTTP {status} {code}: {message}")]
    Status {
        resource: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to acquire access token: {0}")]
    Credential(#[source] azure_core::Error),

    #[error("failed to decode response for {resource}: {message}")]
    Decode { resource: String, message: String },

    #[error("operation on {resource} finished as {status}: {message}")]
    OperationFailed {
        resource: String,
        status: String,
        message: String,
    },

    #[error("operation on {resource} did not finish within {timeout_secs}s")]
    Timeout { resource: String, timeout_secs: u64 },

    #[error(transparent)]
    InvalidPath(#[from] PathError),
}

impl ProviderError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProviderError::Conflict { .. })
    }

    /// HTTP status behind the error, when there was one
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::NotFound { .. } => Some(404),
            ProviderError::Conflict { .. } => Some(409),
            ProviderError::Status { status, .. } => Some(*status),
            ProviderError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Azure control-plane operations used by the workflow
///
/// All mutations are create-or-update (PUT) and therefore idempotent. Implementations
/// wait for long-running operations to finish before returning.
#[async_trait]
pub trait ControlPlane: Send + Sync {
    /// Optional container features this control plane can provision
    fn capabilities(&self) -> ProviderCapabilities;

    async fn get_subscription(&self, subscription_id: &str)
        -> Result<SubscriptionInfo, ProviderError>;

    /// `path` addresses the resource group
    async fn get_resource_group(&self, path: &ResourcePath) -> Result<ResourceRef, ProviderError>;

    /// `path` addresses the resource group that holds the account
    async fn create_or_update_account(
        &self,
        path: &ResourcePath,
        account: &AccountDescriptor,
    ) -> Result<AccountInfo, ProviderError>;

    /// `path` addresses the account
    async fn delete_account(&self, path: &ResourcePath) -> Result<(), ProviderError>;

    /// `path` addresses the account that holds the database
    async fn create_or_update_database(
        &self,
        path: &ResourcePath,
        database: &DatabaseDescriptor,
    ) -> Result<ResourceRef, ProviderError>;

    /// `path` addresses the database that holds the container
    async fn create_or_update_container(
        &self,
        path: &ResourcePath,
        container: &ContainerDescriptor,
    ) -> Result<ResourceRef, ProviderError>;

    /// `path` addresses the container. [`ProviderError::NotFound`] means the container has
    /// no dedicated throughput.
    async fn get_container_throughput(
        &self,
        path: &ResourcePath,
    ) -> Result<ThroughputSettings, ProviderError>;

    /// `path` addresses the container
    async fn update_container_throughput(
        &self,
        path: &ResourcePath,
        location: &str,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSettings, ProviderError>;

    /// `path` addresses the account; `role_definition_id` is the definition name (UUID)
    async fn get_sql_role_definition(
        &self,
        path: &ResourcePath,
        role_definition_id: &str,
    ) -> Result<RoleDefinition, ProviderError>;

    /// `path` addresses the account
    async fn create_or_update_sql_role_definition(
        &self,
        path: &ResourcePath,
        definition: &RoleDefinition,
    ) -> Result<RoleDefinition, ProviderError>;

    /// `path` addresses the account
    async fn create_or_update_sql_role_assignment(
        &self,
        path: &ResourcePath,
        assignment: &RoleAssignment,
    ) -> Result<RoleAssignment, ProviderError>;

    /// Full id of the Azure RBAC role definition named `role_name`, visible at `scope`
    async fn find_role_definition_by_name(
        &self,
        scope: &str,
        role_name: &str,
    ) -> Result<Option<String>, ProviderError>;

    /// Create an Azure RBAC assignment; a conflict is reported as
    /// [`AssignmentOutcome::AlreadyExists`], not as an error
    async fn create_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> Result<AssignmentOutcome, ProviderError>;
}
