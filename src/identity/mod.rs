//! # Identity
//!
//! Who is running the workflow.
//!
//! This module provides:
//! - `claims`: typed, unverified decoding of access-token claims
//! - `credential`: environment-driven `TokenCredential` selection
//! - `principal`: principal object id and best-effort email for RBAC and tagging

pub mod claims;
pub mod credential;
pub mod principal;

pub use claims::{decode_claims, ClaimsError, TokenClaims};
pub use credential::{build_credential, CredentialKind, StaticTokenCredential};
pub use principal::PrincipalResolver;
