//! # Prelude
//!
//! Re-exports commonly used types and traits for convenience.
//!
//! ## Usage
//!
//! ```rust
//! use cosmos_mgmt::prelude::*;
//! ```
//!
//! This brings into scope:
//! - Configuration types (`Configuration`, `ConfigSources`, `RuntimeOptions`)
//! - The control-plane trait and its Resource Manager implementation
//! - The orchestrator and its deletion prompts
//! - Error types

// Configuration
pub use crate::config::{ConfigSources, Configuration, ConfigurationError, RuntimeOptions};

// Control plane
pub use crate::arm::{ResourcePath, ScopeLevel};
pub use crate::provider::{ArmClient, ControlPlane, ProviderError};

// Identity
pub use crate::identity::{build_credential, CredentialKind, PrincipalResolver};

// Workflow
pub use crate::workflow::{
    DeletionOutcome, DeletionPrompt, FixedAnswer, Orchestrator, RunReport, Stage, Unattended,
};

// Errors
pub use crate::error::WorkflowError;
