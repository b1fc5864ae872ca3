//! # Azure Resource Manager
//!
//! REST implementation of [`ControlPlane`](crate::provider::ControlPlane).
//!
//! - `client`: authenticated requests, error mapping, trait implementation
//! - `lro`: long-running operation polling (`Azure-AsyncOperation`, `Location`)
//! - `requests` / `responses`: wire shapes of the REST payloads

mod client;
pub mod lro;
mod requests;
mod responses;

pub use client::ArmClient;
pub use lro::{LroPolicy, OperationState, PollTarget};
