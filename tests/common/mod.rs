//! Common test utilities
//!
//! Shared by the workflow, menu and Pact tests: rustls setup, signed-looking tokens,
//! a fixed configuration and a recording fake control plane.

#![allow(dead_code, reason = "each test binary uses a different subset of the helpers")]

use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use cosmos_mgmt::arm::ResourcePath;
use cosmos_mgmt::config::{Configuration, RuntimeOptions};
use cosmos_mgmt::identity::{PrincipalResolver, StaticTokenCredential};
use cosmos_mgmt::model::{
    AccountDescriptor, AccountInfo, AssignmentOutcome, ContainerDescriptor, DatabaseDescriptor,
    ProviderCapabilities, ResourceRef, RoleAssignment, RoleDefinition, RoleDefinitionType,
    SubscriptionInfo, ThroughputSetting, ThroughputSettings,
};
use cosmos_mgmt::provider::arm::LroPolicy;
use cosmos_mgmt::provider::{ArmClient, ControlPlane, ProviderError};
use cosmos_mgmt::workflow::Orchestrator;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls crypto provider for tests
///
/// Uses a `Once` to ensure it's only called once across all tests.
pub fn init_rustls() {
    RUSTLS_INIT.call_once(|| {
        // Required for rustls 0.23+ when no default provider is set via features
        rustls::crypto::ring::default_provider()
            .install_default()
            .expect("Failed to install rustls crypto provider");
    });
}

/// Pact mock server URL without the trailing slash
pub fn mock_base_url(url: impl std::fmt::Display) -> String {
    let mut base_url = url.to_string();
    if base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

/// Resource Manager client pointed at a Pact mock server, authenticating with `test-token`
pub fn arm_client(base_url: &str) -> ArmClient {
    ArmClient::new(
        base_url,
        StaticTokenCredential::new("test-token"),
        LroPolicy {
            poll_interval: Duration::ZERO,
            timeout: Duration::from_secs(5),
        },
    )
    .expect("Failed to create Resource Manager client")
}

pub const PRINCIPAL_OID: &str = "11111111-2222-3333-4444-555555555555";
pub const PRINCIPAL_EMAIL: &str = "dev@contoso.com";

/// Unsigned JWT-shaped token carrying `claims` as its payload
pub fn token_with_claims(claims: &serde_json::Value) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Principal resolver backed by a token for [`PRINCIPAL_OID`] / [`PRINCIPAL_EMAIL`]
pub fn user_principal() -> PrincipalResolver {
    let token = token_with_claims(&serde_json::json!({
        "oid": PRINCIPAL_OID,
        "preferred_username": PRINCIPAL_EMAIL,
        "tid": "tenant",
    }));
    PrincipalResolver::new(StaticTokenCredential::new(token), None)
}

pub fn test_configuration() -> Configuration {
    Configuration {
        subscription_id: "sub1".to_string(),
        resource_group_name: "rg1".to_string(),
        account_name: "acct1".to_string(),
        location: "West US 3".to_string(),
        database_name: "db1".to_string(),
        container_name: "c1".to_string(),
        max_autoscale_throughput: 1000,
    }
}

pub fn orchestrator(
    control_plane: &Arc<RecordingControlPlane>,
    principal: PrincipalResolver,
    options: RuntimeOptions,
) -> Orchestrator {
    Orchestrator::new(
        Arc::new(test_configuration()),
        Arc::clone(control_plane) as Arc<dyn ControlPlane>,
        principal,
        options,
    )
}

/// One recorded control-plane call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetSubscription(String),
    GetResourceGroup,
    UpsertAccount(AccountDescriptor),
    DeleteAccount,
    UpsertDatabase(DatabaseDescriptor),
    UpsertContainer(ContainerDescriptor),
    GetThroughput,
    UpdateThroughput(ThroughputSetting),
    GetSqlRoleDefinition(String),
    UpsertSqlRoleDefinition(RoleDefinition),
    UpsertSqlRoleAssignment(RoleAssignment),
    FindRoleDefinition { scope: String, role_name: String },
    CreateRoleAssignment(RoleAssignment),
}

impl Call {
    pub fn operation(&self) -> &'static str {
        match self {
            Call::GetSubscription(_) => "get_subscription",
            Call::GetResourceGroup => "get_resource_group",
            Call::UpsertAccount(_) => "create_or_update_account",
            Call::DeleteAccount => "delete_account",
            Call::UpsertDatabase(_) => "create_or_update_database",
            Call::UpsertContainer(_) => "create_or_update_container",
            Call::GetThroughput => "get_container_throughput",
            Call::UpdateThroughput(_) => "update_container_throughput",
            Call::GetSqlRoleDefinition(_) => "get_sql_role_definition",
            Call::UpsertSqlRoleDefinition(_) => "create_or_update_sql_role_definition",
            Call::UpsertSqlRoleAssignment(_) => "create_or_update_sql_role_assignment",
            Call::FindRoleDefinition { .. } => "find_role_definition_by_name",
            Call::CreateRoleAssignment(_) => "create_role_assignment",
        }
    }
}

pub const OPERATOR_ROLE_DEFINITION_ID: &str = "/subscriptions/sub1/providers/Microsoft.Authorization/roleDefinitions/230815da-be43-4aae-9cb4-875f7bd000aa";

/// In-memory control plane that records every call
///
/// Throughput is held as the "service" state: updates are persisted and returned by
/// the next read. `None` means the container has no dedicated throughput (404).
#[derive(Debug)]
pub struct RecordingControlPlane {
    calls: Mutex<Vec<Call>>,
    capabilities: ProviderCapabilities,
    throughput: Mutex<Option<ThroughputSettings>>,
    role_assignment_exists: bool,
    fail_on: Option<&'static str>,
}

impl Default for RecordingControlPlane {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            capabilities: ProviderCapabilities::full(),
            throughput: Mutex::new(Some(ThroughputSettings {
                autoscale_max_throughput: Some(2000),
                manual_throughput: None,
                minimum_throughput: Some(1000),
            })),
            role_assignment_exists: false,
            fail_on: None,
        }
    }
}

impl RecordingControlPlane {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_throughput(self, throughput: Option<ThroughputSettings>) -> Self {
        *self.throughput.lock().expect("throughput lock") = throughput;
        self
    }

    pub fn with_existing_role_assignment(mut self) -> Self {
        self.role_assignment_exists = true;
        self
    }

    /// Fail the named operation with HTTP 403
    pub fn failing_on(mut self, operation: &'static str) -> Self {
        self.fail_on = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn operations(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::operation).collect()
    }

    fn record(&self, call: Call) -> Result<(), ProviderError> {
        let operation = call.operation();
        self.calls.lock().expect("calls lock").push(call);
        if self.fail_on == Some(operation) {
            return Err(ProviderError::Status {
                resource: operation.to_string(),
                status: 403,
                code: "AuthorizationFailed".to_string(),
                message: "the client does not have authorization".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ControlPlane for RecordingControlPlane {
    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionInfo, ProviderError> {
        self.record(Call::GetSubscription(subscription_id.to_string()))?;
        Ok(SubscriptionInfo {
            id: subscription_id.to_string(),
            display_name: Some("Test subscription".to_string()),
            state: Some("Enabled".to_string()),
        })
    }

    async fn get_resource_group(&self, path: &ResourcePath) -> Result<ResourceRef, ProviderError> {
        self.record(Call::GetResourceGroup)?;
        Ok(ResourceRef {
            id: path.resource_group_id()?,
            name: "rg1".to_string(),
        })
    }

    async fn create_or_update_account(
        &self,
        path: &ResourcePath,
        account: &AccountDescriptor,
    ) -> Result<AccountInfo, ProviderError> {
        self.record(Call::UpsertAccount(account.clone()))?;
        Ok(AccountInfo {
            id: path.account_id()?,
            name: account.name.clone(),
            location: Some(account.location.clone()),
            provisioning_state: Some("Succeeded".to_string()),
            document_endpoint: Some(format!("https://{}.documents.azure.com:443/", account.name)),
        })
    }

    async fn delete_account(&self, _path: &ResourcePath) -> Result<(), ProviderError> {
        self.record(Call::DeleteAccount)
    }

    async fn create_or_update_database(
        &self,
        path: &ResourcePath,
        database: &DatabaseDescriptor,
    ) -> Result<ResourceRef, ProviderError> {
        self.record(Call::UpsertDatabase(database.clone()))?;
        Ok(ResourceRef {
            id: path.database_id()?,
            name: database.name.clone(),
        })
    }

    async fn create_or_update_container(
        &self,
        path: &ResourcePath,
        container: &ContainerDescriptor,
    ) -> Result<ResourceRef, ProviderError> {
        self.record(Call::UpsertContainer(container.clone()))?;
        Ok(ResourceRef {
            id: path.container_id()?,
            name: container.name.clone(),
        })
    }

    async fn get_container_throughput(
        &self,
        path: &ResourcePath,
    ) -> Result<ThroughputSettings, ProviderError> {
        self.record(Call::GetThroughput)?;
        let id = path.container_throughput_id()?;
        (*self.throughput.lock().expect("throughput lock")).ok_or(ProviderError::NotFound {
            resource: id,
            message: "throughput settings not found".to_string(),
        })
    }

    async fn update_container_throughput(
        &self,
        _path: &ResourcePath,
        _location: &str,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSettings, ProviderError> {
        self.record(Call::UpdateThroughput(setting))?;
        let mut state = self.throughput.lock().expect("throughput lock");
        let updated = match setting {
            ThroughputSetting::Autoscale { max_throughput } => ThroughputSettings {
                autoscale_max_throughput: Some(max_throughput),
                manual_throughput: None,
                minimum_throughput: state.and_then(|s| s.minimum_throughput),
            },
            ThroughputSetting::Manual { throughput } => ThroughputSettings {
                autoscale_max_throughput: None,
                manual_throughput: Some(throughput),
                minimum_throughput: state.and_then(|s| s.minimum_throughput),
            },
        };
        *state = Some(updated);
        Ok(updated)
    }

    async fn get_sql_role_definition(
        &self,
        _path: &ResourcePath,
        role_definition_id: &str,
    ) -> Result<RoleDefinition, ProviderError> {
        self.record(Call::GetSqlRoleDefinition(role_definition_id.to_string()))?;
        Ok(RoleDefinition {
            id: role_definition_id.to_string(),
            name: "Cosmos DB Built-in Data Contributor".to_string(),
            kind: RoleDefinitionType::BuiltIn,
            assignable_scopes: ["/".to_string()].into(),
            data_actions: [
                "Microsoft.DocumentDB/databaseAccounts/readMetadata".to_string(),
                "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/*".to_string(),
                "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/items/*"
                    .to_string(),
            ]
            .into(),
        })
    }

    async fn create_or_update_sql_role_definition(
        &self,
        _path: &ResourcePath,
        definition: &RoleDefinition,
    ) -> Result<RoleDefinition, ProviderError> {
        self.record(Call::UpsertSqlRoleDefinition(definition.clone()))?;
        Ok(definition.clone())
    }

    async fn create_or_update_sql_role_assignment(
        &self,
        _path: &ResourcePath,
        assignment: &RoleAssignment,
    ) -> Result<RoleAssignment, ProviderError> {
        self.record(Call::UpsertSqlRoleAssignment(assignment.clone()))?;
        Ok(assignment.clone())
    }

    async fn find_role_definition_by_name(
        &self,
        scope: &str,
        role_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        self.record(Call::FindRoleDefinition {
            scope: scope.to_string(),
            role_name: role_name.to_string(),
        })?;
        Ok((role_name == "Cosmos DB Operator").then(|| OPERATOR_ROLE_DEFINITION_ID.to_string()))
    }

    async fn create_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> Result<AssignmentOutcome, ProviderError> {
        self.record(Call::CreateRoleAssignment(assignment.clone()))?;
        let id = format!(
            "{}/providers/Microsoft.Authorization/roleAssignments/{}",
            assignment.scope, assignment.id
        );
        if self.role_assignment_exists {
            Ok(AssignmentOutcome::AlreadyExists(Some(id)))
        } else {
            Ok(AssignmentOutcome::Created(id))
        }
    }
}
