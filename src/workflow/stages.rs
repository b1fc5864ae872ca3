//! Resource stages: pre-flight, account, database, container and throughput.

use tracing::{info, warn};

use super::desired::{desired_account, desired_container, desired_database};
use super::throughput::{self, ThroughputReport};
use super::{Orchestrator, Stage};
use crate::error::WorkflowError;
use crate::model::{AccountInfo, ResourceRef, SubscriptionInfo};

/// Result of the container upsert, including settings the control plane could not take
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerReport {
    pub resource: ResourceRef,
    pub dropped_settings: Vec<&'static str>,
}

impl Orchestrator {
    /// Check that the subscription and resource group are reachable
    ///
    /// # Errors
    /// [`WorkflowError::ProviderOperationFailed`] when either read fails.
    pub async fn preflight(&self) -> Result<SubscriptionInfo, WorkflowError> {
        self.stage(Stage::Preflight, async {
            let subscription_id = &self.config.subscription_id;
            let subscription = self
                .control_plane
                .get_subscription(subscription_id)
                .await
                .map_err(WorkflowError::provider("get_subscription", subscription_id))?;
            info!(
                "Using subscription {} ({})",
                subscription.id,
                subscription.display_name.as_deref().unwrap_or("no display name")
            );

            let group = &self.config.resource_group_name;
            self.control_plane
                .get_resource_group(&self.path)
                .await
                .map_err(WorkflowError::provider("get_resource_group", group))?;
            info!("Resource group {} exists", group);

            Ok(subscription)
        })
        .await
    }

    /// Create or update the account and wait for provisioning to finish
    ///
    /// # Errors
    /// [`WorkflowError::ProviderOperationFailed`] on any control-plane failure.
    pub async fn upsert_account(&self) -> Result<AccountInfo, WorkflowError> {
        self.stage(Stage::Account, async {
            let owner = self.principal.current_user_email_best_effort().await;
            if owner.is_none() {
                info!("No email claim available; account will not carry an owner tag");
            }
            let account = desired_account(&self.config, owner.as_deref());

            info!(
                "Creating or updating Cosmos DB account {} in {}",
                account.name, account.location
            );
            let info = self
                .control_plane
                .create_or_update_account(&self.path, &account)
                .await
                .map_err(WorkflowError::provider(
                    "create_or_update_account",
                    &account.name,
                ))?;
            info!(
                "Account {} ready (provisioning state: {})",
                info.name,
                info.provisioning_state.as_deref().unwrap_or("unknown")
            );
            Ok(info)
        })
        .await
    }

    /// # Errors
    /// [`WorkflowError::ProviderOperationFailed`] on any control-plane failure.
    pub async fn upsert_database(&self) -> Result<ResourceRef, WorkflowError> {
        self.stage(Stage::Database, async {
            let database = desired_database(&self.config);
            info!("Creating or updating database {}", database.name);
            let resource = self
                .control_plane
                .create_or_update_database(&self.path, &database)
                .await
                .map_err(WorkflowError::provider(
                    "create_or_update_database",
                    &database.name,
                ))?;
            info!("Database ready: {}", resource.id);
            Ok(resource)
        })
        .await
    }

    /// Create or update the container
    ///
    /// Vector and computed-property settings are removed, with a warning, when the
    /// control plane reports it cannot provision them.
    ///
    /// # Errors
    /// [`WorkflowError::ProviderOperationFailed`] on any control-plane failure.
    pub async fn upsert_container(&self) -> Result<ContainerReport, WorkflowError> {
        self.stage(Stage::Container, async {
            let mut container = desired_container(&self.config);
            let capabilities = self.control_plane.capabilities();
            let mut dropped_settings = Vec::new();

            if !capabilities.vector_search && container.strip_vector_settings() {
                warn!(
                    "Control plane does not support vector search; container {} is created without its vector embedding policy and vector indexes",
                    container.name
                );
                dropped_settings.push("vectorEmbeddingPolicy");
            }
            if !capabilities.computed_properties && container.strip_computed_properties() {
                warn!(
                    "Control plane does not support computed properties; container {} is created without them",
                    container.name
                );
                dropped_settings.push("computedProperties");
            }

            info!("Creating or updating container {}", container.name);
            let resource = self
                .control_plane
                .create_or_update_container(&self.path, &container)
                .await
                .map_err(WorkflowError::provider(
                    "create_or_update_container",
                    &container.name,
                ))?;
            info!("Container ready: {}", resource.id);

            Ok(ContainerReport {
                resource,
                dropped_settings,
            })
        })
        .await
    }

    /// Add `delta` to the container throughput
    ///
    /// # Errors
    /// See [`throughput::adjust_throughput`].
    pub async fn adjust_throughput(&self, delta: i64) -> Result<ThroughputReport, WorkflowError> {
        self.stage(Stage::Throughput, async {
            let report = throughput::adjust_throughput(
                self.control_plane.as_ref(),
                &self.path,
                &self.config.location,
                delta,
                self.config.max_autoscale_throughput,
            )
            .await?;
            info!("Throughput updated: {}", report);
            Ok(report)
        })
        .await
    }
}
