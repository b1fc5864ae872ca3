//! # Workflow
//!
//! Orchestrates the provisioning stages against a [`ControlPlane`].
//!
//! ## Stages
//!
//! A full run executes, strictly in order:
//!
//! 1. Pre-flight: subscription and resource group must be readable
//! 2. Account upsert (vector search on, key auth off, owner tag)
//! 3. Azure RBAC: "Cosmos DB Operator" at account scope (optional)
//! 4. Database upsert
//! 5. Container upsert (features the control plane cannot provision are dropped with a warning)
//! 6. Throughput adjustment
//! 7. Cosmos SQL RBAC: built-in Data Contributor at database scope
//! 8. Account deletion, behind the [`DeletionGate`]
//!
//! The first failing stage aborts the run. Cancellation is checked between stages only,
//! so a stage that has started always runs to completion.

mod desired;
mod gate;
mod rbac;
mod stages;
mod throughput;

pub use desired::{
    custom_role_definition, desired_account, desired_container, desired_database,
    CUSTOM_ROLE_DATA_ACTIONS, OWNER_TAG,
};
pub use gate::{
    Confirmation, DeletionGate, DeletionPrompt, FixedAnswer, LinePrompt, Unattended,
};
pub use stages::ContainerReport;
pub use throughput::{
    adjust_throughput, plan_throughput_update, AmbiguousThroughput, ThroughputPlan,
    ThroughputReport,
};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{field, info, info_span, warn, Instrument};

use crate::arm::ResourcePath;
use crate::config::{Configuration, RuntimeOptions};
use crate::error::WorkflowError;
use crate::identity::PrincipalResolver;
use crate::model::{AccountInfo, AssignmentOutcome, ResourceRef, RoleAssignment, SubscriptionInfo};
use crate::naming::StableIdGenerator;
use crate::observability::metrics;
use crate::provider::ControlPlane;

/// One step of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Account,
    AzureRbac,
    Database,
    Container,
    Throughput,
    CosmosRbac,
    CustomRole,
    CustomRoleAssignment,
    Delete,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Preflight => "preflight",
            Stage::Account => "account",
            Stage::AzureRbac => "azure_rbac",
            Stage::Database => "database",
            Stage::Container => "container",
            Stage::Throughput => "throughput",
            Stage::CosmosRbac => "cosmos_rbac",
            Stage::CustomRole => "custom_role",
            Stage::CustomRoleAssignment => "custom_role_assignment",
            Stage::Delete => "delete",
        }
    }
}

/// What happened at the deletion gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    NotRequested,
    Declined(String),
    Deleted,
}

/// Summary of a full run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub subscription: SubscriptionInfo,
    pub account: AccountInfo,
    pub control_plane_role: Option<AssignmentOutcome>,
    pub database: ResourceRef,
    pub container: ContainerReport,
    pub throughput: ThroughputReport,
    pub data_plane_role: RoleAssignment,
    pub deletion: DeletionOutcome,
}

/// Returned by [`Orchestrator::begin_action`]; clears the activity flag on drop
#[derive(Debug)]
pub struct ActiveAction(Arc<AtomicBool>);

impl Drop for ActiveAction {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs workflow stages for one [`Configuration`]
#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<Configuration>,
    control_plane: Arc<dyn ControlPlane>,
    principal: PrincipalResolver,
    ids: StableIdGenerator,
    options: RuntimeOptions,
    path: ResourcePath,
    cancelled: Arc<AtomicBool>,
    active: Arc<AtomicBool>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("principal", &self.principal)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        config: Arc<Configuration>,
        control_plane: Arc<dyn ControlPlane>,
        principal: PrincipalResolver,
        options: RuntimeOptions,
    ) -> Self {
        let ids = StableIdGenerator::for_subscription(&config.subscription_id);
        let path = ResourcePath::from_configuration(&config);
        Self {
            config,
            control_plane,
            principal,
            ids,
            options,
            path,
            cancelled: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    #[must_use]
    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    /// Flag that stops the run before the next stage once set
    #[must_use]
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear a pending cancellation; returns whether one was pending
    pub fn reset_cancellation(&self) -> bool {
        self.cancelled.swap(false, Ordering::SeqCst)
    }

    /// Flag that is set while an action runs
    #[must_use]
    pub fn activity_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark an action as running until the guard is dropped
    #[must_use]
    pub fn begin_action(&self) -> ActiveAction {
        self.active.store(true, Ordering::SeqCst);
        ActiveAction(Arc::clone(&self.active))
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run `work` as `stage`: cancellation check, span and stage metric
    async fn stage<T, F>(&self, stage: Stage, work: F) -> Result<T, WorkflowError>
    where
        F: Future<Output = Result<T, WorkflowError>>,
    {
        if self.is_cancelled() {
            metrics::record_stage(stage.as_str(), "cancelled");
            return Err(WorkflowError::Cancelled);
        }

        let span = info_span!(
            "cosmos.stage",
            stage = stage.as_str(),
            account = %self.config.account_name,
            outcome = field::Empty,
        );
        let result = work.instrument(span.clone()).await;

        let outcome = match &result {
            Ok(_) => "succeeded",
            Err(e) if e.is_user_cancellation() => "cancelled",
            Err(_) => "failed",
        };
        span.record("outcome", outcome);
        metrics::record_stage(stage.as_str(), outcome);
        result
    }

    /// Every stage in order, stopping at the first failure
    ///
    /// A declined deletion is part of a successful run and shows up in
    /// [`RunReport::deletion`].
    ///
    /// # Errors
    /// The error of the first stage that failed, or [`WorkflowError::Cancelled`].
    pub async fn run_full(
        &self,
        prompt: &mut dyn DeletionPrompt,
    ) -> Result<RunReport, WorkflowError> {
        info!(
            "Starting full run for account {} in {}",
            self.config.account_name, self.config.resource_group_name
        );

        let subscription = self.preflight().await?;
        let account = self.upsert_account().await?;
        let control_plane_role = if self.options.assign_azure_rbac {
            Some(self.assign_control_plane_role().await?)
        } else {
            info!("Skipping Azure RBAC assignment (COSMOS_ASSIGN_AZURE_RBAC=false)");
            None
        };
        let database = self.upsert_database().await?;
        let container = self.upsert_container().await?;
        let throughput = self.adjust_throughput(self.options.throughput_delta).await?;
        let data_plane_role = self.assign_data_plane_role().await?;

        let deletion = if self.options.delete_account_opt_in {
            match self.delete_account(true, prompt).await {
                Ok(()) => DeletionOutcome::Deleted,
                Err(WorkflowError::DeletionNotConfirmed { reason }) => {
                    warn!("Account deletion declined: {}", reason);
                    DeletionOutcome::Declined(reason)
                }
                Err(e) => return Err(e),
            }
        } else {
            info!("Keeping account {} (COSMOS_SAMPLE_DELETE_ACCOUNT is not true)", self.config.account_name);
            DeletionOutcome::NotRequested
        };

        info!("Full run complete for account {}", self.config.account_name);
        Ok(RunReport {
            subscription,
            account,
            control_plane_role,
            database,
            container,
            throughput,
            data_plane_role,
            deletion,
        })
    }

    /// Delete the account if `opted_in` and the prompt confirms
    ///
    /// # Errors
    /// [`WorkflowError::DeletionNotConfirmed`] when the gate is closed, or the provider
    /// failure.
    pub async fn delete_account(
        &self,
        opted_in: bool,
        prompt: &mut dyn DeletionPrompt,
    ) -> Result<(), WorkflowError> {
        let account = self.config.account_name.clone();
        self.stage(Stage::Delete, async {
            DeletionGate::new(opted_in).authorize(&account, prompt)?;
            warn!("Deleting Cosmos DB account {}", account);
            self.control_plane
                .delete_account(&self.path)
                .await
                .map_err(WorkflowError::provider("delete_account", &account))?;
            info!("Deleted Cosmos DB account {}", account);
            Ok(())
        })
        .await
    }
}
