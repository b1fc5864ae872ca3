//! # Credential Selection
//!
//! Picks the `TokenCredential` for Resource Manager calls from the environment:
//!
//! 1. `PACT_MODE` → static test credential (contract tests against a mock server)
//! 2. `AZURE_FEDERATED_TOKEN_FILE` → Workload Identity (AKS, GitHub OIDC)
//! 3. `IDENTITY_ENDPOINT` / `MSI_ENDPOINT` → Managed Identity (App Service, VMs, ACI)
//! 4. otherwise → Azure CLI (developer workstation after `az login`)

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::{AccessToken, Secret, TokenCredential, TokenRequestOptions};
use azure_core::time::{Duration, OffsetDateTime};
use azure_identity::{AzureCliCredential, ManagedIdentityCredential, WorkloadIdentityCredential};
use tracing::{debug, info};

/// Token used by the static credential when none is supplied
const STATIC_TEST_TOKEN: &str = "test-token";

/// Fixed-token `TokenCredential` for contract tests
///
/// Returns the configured token without attempting real Azure authentication.
pub struct StaticTokenCredential {
    token: String,
}

impl std::fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenCredential").finish_non_exhaustive()
    }
}

impl StaticTokenCredential {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            token: token.into(),
        })
    }
}

impl Default for StaticTokenCredential {
    fn default() -> Self {
        Self {
            token: STATIC_TEST_TOKEN.to_string(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(
        &self,
        _scopes: &[&str],
        _options: Option<TokenRequestOptions<'_>>,
    ) -> azure_core::Result<AccessToken> {
        Ok(AccessToken::new(
            Secret::new(self.token.clone()),
            OffsetDateTime::now_utc() + Duration::seconds(3600),
        ))
    }
}

/// Credential source chosen for this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Static,
    WorkloadIdentity,
    ManagedIdentity,
    AzureCli,
}

impl CredentialKind {
    /// Decide the credential source from an environment lookup
    pub fn detect<F>(pact_mode: bool, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());

        if pact_mode {
            CredentialKind::Static
        } else if present("AZURE_FEDERATED_TOKEN_FILE") {
            CredentialKind::WorkloadIdentity
        } else if present("IDENTITY_ENDPOINT") || present("MSI_ENDPOINT") {
            CredentialKind::ManagedIdentity
        } else {
            CredentialKind::AzureCli
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CredentialKind::Static => "static",
            CredentialKind::WorkloadIdentity => "workload-identity",
            CredentialKind::ManagedIdentity => "managed-identity",
            CredentialKind::AzureCli => "azure-cli",
        }
    }
}

/// Build the credential for the detected source
///
/// # Errors
/// Returns an error if the Azure identity credential cannot be constructed.
pub fn build_credential(kind: CredentialKind) -> Result<Arc<dyn TokenCredential>> {
    info!("Using {} credential for Azure Resource Manager", kind.as_str());

    let credential: Arc<dyn TokenCredential> = match kind {
        CredentialKind::Static => {
            debug!("Pact mode: using static Azure credential");
            Arc::new(StaticTokenCredential::default())
        }
        CredentialKind::WorkloadIdentity => WorkloadIdentityCredential::new(None)
            .context("Failed to create WorkloadIdentityCredential")?,
        CredentialKind::ManagedIdentity => ManagedIdentityCredential::new(None)
            .context("Failed to create ManagedIdentityCredential")?,
        CredentialKind::AzureCli => {
            AzureCliCredential::new(None).context("Failed to create AzureCliCredential")?
        }
    };

    Ok(credential)
}
