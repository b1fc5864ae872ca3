//! # Workflow Errors
//!
//! Error taxonomy surfaced by the orchestrator and mapped to process exit codes.
//!
//! - Configuration problems are fatal and exit with code 2
//! - Operator cancellation (declined delete, Ctrl-C) exits with code 0
//! - Everything else exits with code 1

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::identity::ClaimsError;
use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("could not determine the current principal: {0}")]
    ClaimsUnavailable(#[from] ClaimsError),

    #[error(
        "{resource} has no dedicated throughput; it may be on a serverless account or use shared database throughput"
    )]
    NoDedicatedThroughput { resource: String },

    #[error("{resource} reported neither autoscale nor manual throughput")]
    AmbiguousThroughputState { resource: String },

    #[error("{operation} failed for {resource}: {source}")]
    ProviderOperationFailed {
        operation: &'static str,
        resource: String,
        #[source]
        source: ProviderError,
    },

    #[error("account deletion not performed: {reason}")]
    DeletionNotConfirmed { reason: String },

    #[error("cancelled by operator")]
    Cancelled,
}

impl WorkflowError {
    /// Wrap a control-plane failure with the operation and resource it concerned
    pub fn provider(
        operation: &'static str,
        resource: impl Into<String>,
    ) -> impl FnOnce(ProviderError) -> Self {
        let resource = resource.into();
        move |source| WorkflowError::ProviderOperationFailed {
            operation,
            resource,
            source,
        }
    }

    /// True when the operator chose not to continue; not a failure
    #[must_use]
    pub fn is_user_cancellation(&self) -> bool {
        matches!(
            self,
            WorkflowError::DeletionNotConfirmed { .. } | WorkflowError::Cancelled
        )
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkflowError::Configuration(_) => 2,
            e if e.is_user_cancellation() => 0,
            _ => 1,
        }
    }

    /// Follow-up hint for the operator, when one exists
    #[must_use]
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            WorkflowError::NoDedicatedThroughput { .. } => Some(
                "Serverless accounts have no provisioned throughput. For shared database \
                 throughput, adjust the database instead of the container.",
            ),
            WorkflowError::ClaimsUnavailable(_) => Some(
                "Set AZURE_PRINCIPAL_OBJECT_ID to the object id of the identity running the workflow.",
            ),
            WorkflowError::DeletionNotConfirmed { .. } => Some(
                "Set COSMOS_SAMPLE_DELETE_ACCOUNT=true and type DELETE to remove the account.",
            ),
            _ => None,
        }
    }
}
