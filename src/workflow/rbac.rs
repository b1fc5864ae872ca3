//! Role stages: Azure RBAC on the account, Cosmos SQL RBAC on the database and the
//! custom SQL role definition with its account-scope assignment.
//!
//! Assignment names come from [`crate::naming`] so a re-run updates the same assignment.

use tracing::info;

use super::desired::custom_role_definition;
use super::{Orchestrator, Stage};
use crate::arm::ScopeLevel;
use crate::constants::{
    BUILT_IN_DATA_CONTRIBUTOR_ROLE_ID, COSMOS_DB_OPERATOR_ROLE_NAME, CUSTOM_ROLE_NAME,
};
use crate::error::WorkflowError;
use crate::model::{AssignmentOutcome, RoleAssignment, RoleDefinition};
use crate::provider::ProviderError;

impl Orchestrator {
    /// Grant the current principal "Cosmos DB Operator" on the account
    ///
    /// An existing assignment is reported as [`AssignmentOutcome::AlreadyExists`].
    ///
    /// # Errors
    /// - [`WorkflowError::ClaimsUnavailable`] when the principal cannot be determined
    /// - [`WorkflowError::ProviderOperationFailed`] when the role is unknown or the
    ///   assignment fails
    pub async fn assign_control_plane_role(&self) -> Result<AssignmentOutcome, WorkflowError> {
        self.stage(Stage::AzureRbac, async {
            let principal_id = self.principal.current_principal_object_id().await?;
            let subscription_scope = self.path.scope(ScopeLevel::Subscription);
            let account_scope = self.path.scope(ScopeLevel::Account);

            let role_definition_id = self
                .control_plane
                .find_role_definition_by_name(&subscription_scope, COSMOS_DB_OPERATOR_ROLE_NAME)
                .await
                .map_err(WorkflowError::provider(
                    "find_role_definition_by_name",
                    COSMOS_DB_OPERATOR_ROLE_NAME,
                ))?
                .ok_or_else(|| {
                    WorkflowError::provider("find_role_definition_by_name", &subscription_scope)(
                        ProviderError::NotFound {
                            resource: COSMOS_DB_OPERATOR_ROLE_NAME.to_string(),
                            message: "no role definition with this name".to_string(),
                        },
                    )
                })?;

            let assignment = RoleAssignment {
                id: self
                    .ids
                    .role_assignment_id(&account_scope, &role_definition_id, &principal_id)
                    .to_string(),
                scope: account_scope,
                role_definition_id,
                principal_id,
            };
            info!(
                "Assigning {} to {} at {}",
                COSMOS_DB_OPERATOR_ROLE_NAME, assignment.principal_id, assignment.scope
            );

            let outcome = self
                .control_plane
                .create_role_assignment(&assignment)
                .await
                .map_err(WorkflowError::provider(
                    "create_role_assignment",
                    &assignment.scope,
                ))?;
            match &outcome {
                AssignmentOutcome::Created(id) => info!("Azure RBAC role assignment created: {}", id),
                AssignmentOutcome::AlreadyExists(Some(id)) => {
                    info!("Azure RBAC role assignment already exists: {}", id);
                }
                AssignmentOutcome::AlreadyExists(None) => {
                    info!("Azure RBAC role assignment already exists");
                }
            }
            Ok(outcome)
        })
        .await
    }

    /// Grant the current principal the built-in Data Contributor role on the database
    ///
    /// # Errors
    /// - [`WorkflowError::ClaimsUnavailable`] when the principal cannot be determined
    /// - [`WorkflowError::ProviderOperationFailed`] on any control-plane failure
    pub async fn assign_data_plane_role(&self) -> Result<RoleAssignment, WorkflowError> {
        self.stage(Stage::CosmosRbac, async {
            let principal_id = self.principal.current_principal_object_id().await?;
            let account = &self.config.account_name;

            let definition = self
                .control_plane
                .get_sql_role_definition(&self.path, BUILT_IN_DATA_CONTRIBUTOR_ROLE_ID)
                .await
                .map_err(WorkflowError::provider(
                    "get_sql_role_definition",
                    BUILT_IN_DATA_CONTRIBUTOR_ROLE_ID,
                ))?;
            let role_definition_id = self
                .path
                .sql_role_definition_id(&definition.id)
                .map_err(|e| WorkflowError::provider("get_sql_role_definition", account)(e.into()))?;

            let scope = self.path.scope(ScopeLevel::Database);
            self.put_sql_role_assignment(&definition.name, role_definition_id, scope, principal_id)
                .await
        })
        .await
    }

    /// Create or update the custom "data contributor except delete" SQL role
    ///
    /// # Errors
    /// [`WorkflowError::ProviderOperationFailed`] on any control-plane failure.
    pub async fn create_custom_role_definition(&self) -> Result<RoleDefinition, WorkflowError> {
        self.stage(Stage::CustomRole, async {
            let account_scope = self.path.scope(ScopeLevel::Account);
            let id = self.ids.id(&[account_scope.as_str(), CUSTOM_ROLE_NAME]).to_string();
            let definition = custom_role_definition(id, &account_scope);

            info!("Creating or updating custom role definition {}", definition.name);
            let created = self
                .control_plane
                .create_or_update_sql_role_definition(&self.path, &definition)
                .await
                .map_err(WorkflowError::provider(
                    "create_or_update_sql_role_definition",
                    CUSTOM_ROLE_NAME,
                ))?;
            info!("Custom role definition ready: {}", created.id);
            Ok(created)
        })
        .await
    }

    /// Grant the current principal a SQL role definition created by
    /// [`Self::create_custom_role_definition`] at account scope
    ///
    /// # Errors
    /// - [`WorkflowError::ClaimsUnavailable`] when the principal cannot be determined
    /// - [`WorkflowError::ProviderOperationFailed`] on any control-plane failure
    pub async fn assign_custom_role(
        &self,
        definition: &RoleDefinition,
    ) -> Result<RoleAssignment, WorkflowError> {
        self.stage(Stage::CustomRoleAssignment, async {
            let principal_id = self.principal.current_principal_object_id().await?;
            let role_definition_id = self
                .path
                .sql_role_definition_id(&definition.id)
                .map_err(|e| {
                    WorkflowError::provider("create_or_update_sql_role_assignment", &definition.name)(
                        e.into(),
                    )
                })?;
            let scope = self.path.scope(ScopeLevel::Account);
            self.put_sql_role_assignment(&definition.name, role_definition_id, scope, principal_id)
                .await
        })
        .await
    }

    async fn put_sql_role_assignment(
        &self,
        role_name: &str,
        role_definition_id: String,
        scope: String,
        principal_id: String,
    ) -> Result<RoleAssignment, WorkflowError> {
        let assignment = RoleAssignment {
            id: self
                .ids
                .role_assignment_id(&scope, &role_definition_id, &principal_id)
                .to_string(),
            scope,
            role_definition_id,
            principal_id,
        };
        info!(
            "Assigning Cosmos SQL role {} to {} at {}",
            role_name, assignment.principal_id, assignment.scope
        );

        let assigned = self
            .control_plane
            .create_or_update_sql_role_assignment(&self.path, &assignment)
            .await
            .map_err(WorkflowError::provider(
                "create_or_update_sql_role_assignment",
                &assignment.scope,
            ))?;
        info!("Cosmos SQL role assignment ready: {}", assigned.id);
        Ok(assigned)
    }
}
