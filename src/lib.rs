//! Cosmos DB Management Library
//!
//! Idempotent Azure Cosmos DB control-plane provisioning over Azure Resource Manager.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cosmos_mgmt::prelude::*;
//! ```
//!
//! The workflow resolves a [`config::Configuration`], builds one [`provider::ControlPlane`]
//! per run and hands both to a [`workflow::Orchestrator`], which executes the stages in a
//! fixed order: account → Azure RBAC → database → container → throughput → Cosmos SQL RBAC
//! → (gated) delete.

pub mod arm;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod model;
pub mod naming;
pub mod observability;
pub mod prelude;
pub mod provider;
pub mod workflow;
