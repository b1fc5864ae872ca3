//! # Resource Manager Addressing
//!
//! Resource ids and RBAC scopes for the subscription → resource group → account →
//! database → container hierarchy.

pub mod paths;

pub use paths::{PathError, ResourcePath, ScopeLevel};
