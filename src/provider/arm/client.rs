//! # Resource Manager Client
//!
//! Authenticated REST calls against Azure Resource Manager.
//!
//! This module provides functionality to:
//! - Create or update Cosmos DB accounts, SQL databases and containers
//! - Read and update container throughput
//! - Manage Cosmos SQL role definitions and assignments
//! - Look up Azure RBAC role definitions and create role assignments
//!
//! Mutations that start a long-running operation are polled to completion before the
//! call returns.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use azure_core::credentials::{TokenCredential, TokenRequestOptions};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, field, info, info_span, Instrument};

use super::lro::{self, LroPolicy, OperationState, OperationStatus, PollTarget};
use super::requests::{AccountRequest, PropertiesEnvelope, SqlResourceRequest};
use super::responses::{
    AccountResponse, ErrorResponse, ResourceResponse, RoleDefinitionListResponse,
    SqlRoleAssignmentResponse, SqlRoleDefinitionResponse, SubscriptionResponse,
    ThroughputResponse,
};
use crate::arm::ResourcePath;
use crate::config::RuntimeOptions;
use crate::constants::{
    ARM_TOKEN_SCOPE, AUTHORIZATION_API_VERSION, COSMOS_API_VERSION, RESOURCES_API_VERSION,
    SUBSCRIPTIONS_API_VERSION,
};
use crate::model::{
    AccountDescriptor, AccountInfo, AssignmentOutcome, ContainerDescriptor, DatabaseDescriptor,
    ProviderCapabilities, ResourceRef, RoleAssignment, RoleDefinition, SubscriptionInfo,
    ThroughputSetting, ThroughputSettings,
};
use crate::observability::metrics;
use crate::provider::common::OperationTracker;
use crate::provider::{ControlPlane, ProviderError};

/// Resource Manager implementation of [`ControlPlane`]
pub struct ArmClient {
    http: Client,
    endpoint: String,
    credential: Arc<dyn TokenCredential>,
    lro: LroPolicy,
    capabilities: ProviderCapabilities,
}

impl std::fmt::Debug for ArmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArmClient")
            .field("endpoint", &self.endpoint)
            .field("lro", &self.lro)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}

impl ArmClient {
    /// Create a client for `endpoint` (e.g. `https://management.azure.com`)
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        credential: Arc<dyn TokenCredential>,
        lro: LroPolicy,
    ) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("cosmos-mgmt/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client for Azure Resource Manager")?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            credential,
            lro,
            capabilities: ProviderCapabilities::full(),
        })
    }

    /// Create a client from runtime options (endpoint, LRO timings, Pact routing)
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_options(
        options: &RuntimeOptions,
        credential: Arc<dyn TokenCredential>,
    ) -> Result<Self> {
        if options.pact_mode {
            info!(
                "Pact mode enabled: routing Azure Resource Manager requests to {}",
                options.arm_endpoint
            );
        }
        Self::new(
            &options.arm_endpoint,
            credential,
            LroPolicy::from_options(options),
        )
    }

    /// Override the advertised container feature support
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: ProviderCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Get access token for Azure Resource Manager
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let token = self
            .credential
            .get_token(&[ARM_TOKEN_SCOPE], Some(TokenRequestOptions::default()))
            .await
            .map_err(ProviderError::Credential)?;
        Ok(token.token.secret().to_string())
    }

    fn url(&self, resource_id: &str) -> String {
        if resource_id.starts_with("http://") || resource_id.starts_with("https://") {
            resource_id.to_string()
        } else {
            format!("{}{}", self.endpoint, resource_id)
        }
    }

    async fn request(
        &self,
        method: Method,
        resource_id: &str,
        api_version: Option<&str>,
    ) -> Result<RequestBuilder, ProviderError> {
        let token = self.bearer_token().await?;
        let mut builder = self
            .http
            .request(method, self.url(resource_id))
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");
        if let Some(version) = api_version {
            builder = builder.query(&[("api-version", version)]);
        }
        Ok(builder)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource_id: &str,
        api_version: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .request(Method::GET, resource_id, Some(api_version))
            .await?
            .send()
            .await?;
        decode(resource_id, check(resource_id, response).await?).await
    }

    /// PUT `body` and return the final resource, waiting out any long-running operation
    async fn put_json<B, T>(
        &self,
        resource_id: &str,
        api_version: &str,
        body: &B,
    ) -> Result<T, ProviderError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::PUT, resource_id, Some(api_version))
            .await?
            .json(body)
            .send()
            .await?;
        let response = check(resource_id, response).await?;

        if let Some(target) = lro::poll_target(response.headers()) {
            let delay = lro::retry_after(response.headers(), self.lro.poll_interval);
            self.wait_for(resource_id, &target, delay).await?;
            return self.get_json(resource_id, api_version).await;
        }
        if response.status() == StatusCode::ACCEPTED {
            return self.get_json(resource_id, api_version).await;
        }
        decode(resource_id, response).await
    }

    /// Poll a long-running operation until it reaches a terminal state
    async fn wait_for(
        &self,
        resource_id: &str,
        target: &PollTarget,
        first_delay: Duration,
    ) -> Result<(), ProviderError> {
        let started = Instant::now();
        let mut delay = first_delay;

        loop {
            if started.elapsed() + delay > self.lro.timeout {
                return Err(ProviderError::Timeout {
                    resource: resource_id.to_string(),
                    timeout_secs: self.lro.timeout.as_secs(),
                });
            }
            tokio::time::sleep(delay).await;
            metrics::increment_lro_polls();

            let response = self
                .request(Method::GET, target.url(), None)
                .await?
                .send()
                .await?;
            delay = lro::retry_after(response.headers(), self.lro.poll_interval);

            match target {
                PollTarget::AsyncOperation(_) => {
                    let response = check(resource_id, response).await?;
                    let status: OperationStatus = decode(resource_id, response).await?;
                    match status.state() {
                        OperationState::Succeeded => return Ok(()),
                        OperationState::Failed | OperationState::Canceled => {
                            return Err(ProviderError::OperationFailed {
                                resource: resource_id.to_string(),
                                status: status.status.clone(),
                                message: status.error_message(),
                            });
                        }
                        OperationState::InProgress => {
                            debug!(
                                "Operation on {} still {} after {:?}",
                                resource_id,
                                status.status,
                                started.elapsed()
                            );
                        }
                    }
                }
                PollTarget::Location(_) => {
                    if response.status() != StatusCode::ACCEPTED {
                        check(resource_id, response).await?;
                        return Ok(());
                    }
                    debug!(
                        "Operation on {} still running after {:?}",
                        resource_id,
                        started.elapsed()
                    );
                }
            }
        }
    }

    /// Run `operation` inside a span and record its metrics
    async fn tracked<T, F>(
        &self,
        operation: &'static str,
        resource_id: &str,
        future: F,
    ) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let span = info_span!(
            "arm.operation",
            operation = operation,
            resource.id = resource_id,
            operation.success = field::Empty,
            operation.duration_ms = field::Empty,
            error.message = field::Empty,
        );
        let tracker = OperationTracker::new(operation, span.clone());
        let result = future.instrument(span).await;
        tracker.finish(result)
    }
}

/// Map a non-success response to a [`ProviderError`]
async fn check(resource_id: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = ErrorResponse::parse(&body);
    let resource = resource_id.to_string();

    Err(match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound { resource, message },
        StatusCode::CONFLICT => ProviderError::Conflict { resource, message },
        _ => ProviderError::Status {
            resource,
            status: status.as_u16(),
            code,
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(
    resource_id: &str,
    response: Response,
) -> Result<T, ProviderError> {
    let body = response.bytes().await?;
    // 204 and some 200 responses carry no body
    let body: &[u8] = if body.is_empty() { b"{}" } else { &body };
    serde_json::from_slice(body).map_err(|e| ProviderError::Decode {
        resource: resource_id.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl ControlPlane for ArmClient {
    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities
    }

    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionInfo, ProviderError> {
        let id = ResourcePath::new(subscription_id).subscription_id();
        self.tracked("get_subscription", &id, async {
            let response: SubscriptionResponse =
                self.get_json(&id, SUBSCRIPTIONS_API_VERSION).await?;
            Ok(response.into_model(subscription_id))
        })
        .await
    }

    async fn get_resource_group(&self, path: &ResourcePath) -> Result<ResourceRef, ProviderError> {
        let id = path.resource_group_id()?;
        self.tracked("get_resource_group", &id, async {
            let response: ResourceResponse = self.get_json(&id, RESOURCES_API_VERSION).await?;
            Ok(response.into_ref(&id))
        })
        .await
    }

    async fn create_or_update_account(
        &self,
        path: &ResourcePath,
        account: &AccountDescriptor,
    ) -> Result<AccountInfo, ProviderError> {
        let id = path.clone().account(&account.name).account_id()?;
        self.tracked("create_or_update_account", &id, async {
            info!("Creating or updating Cosmos DB account: {}", account.name);
            let response: AccountResponse = self
                .put_json(&id, COSMOS_API_VERSION, &AccountRequest::new(account))
                .await?;
            Ok(response.into_model(&id, &account.name))
        })
        .await
    }

    async fn delete_account(&self, path: &ResourcePath) -> Result<(), ProviderError> {
        let id = path.account_id()?;
        self.tracked("delete_account", &id, async {
            let response = self
                .request(Method::DELETE, &id, Some(COSMOS_API_VERSION))
                .await?
                .send()
                .await?;
            let response = match check(&id, response).await {
                Ok(response) => response,
                Err(e) if e.is_not_found() => {
                    info!("Cosmos DB account {} does not exist, nothing to delete", id);
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if let Some(target) = lro::poll_target(response.headers()) {
                let delay = lro::retry_after(response.headers(), self.lro.poll_interval);
                self.wait_for(&id, &target, delay).await?;
            }
            Ok(())
        })
        .await
    }

    async fn create_or_update_database(
        &self,
        path: &ResourcePath,
        database: &DatabaseDescriptor,
    ) -> Result<ResourceRef, ProviderError> {
        let id = path.clone().database(&database.name).database_id()?;
        self.tracked("create_or_update_database", &id, async {
            let response: ResourceResponse = self
                .put_json(&id, COSMOS_API_VERSION, &SqlResourceRequest::database(database))
                .await?;
            Ok(response.into_ref(&id))
        })
        .await
    }

    async fn create_or_update_container(
        &self,
        path: &ResourcePath,
        container: &ContainerDescriptor,
    ) -> Result<ResourceRef, ProviderError> {
        let id = path.clone().container(&container.name).container_id()?;
        self.tracked("create_or_update_container", &id, async {
            let response: ResourceResponse = self
                .put_json(
                    &id,
                    COSMOS_API_VERSION,
                    &SqlResourceRequest::container(container),
                )
                .await?;
            Ok(response.into_ref(&id))
        })
        .await
    }

    async fn get_container_throughput(
        &self,
        path: &ResourcePath,
    ) -> Result<ThroughputSettings, ProviderError> {
        let id = path.container_throughput_id()?;
        self.tracked("get_container_throughput", &id, async {
            let response: ThroughputResponse = self.get_json(&id, COSMOS_API_VERSION).await?;
            Ok(response.into_model())
        })
        .await
    }

    async fn update_container_throughput(
        &self,
        path: &ResourcePath,
        location: &str,
        setting: ThroughputSetting,
    ) -> Result<ThroughputSettings, ProviderError> {
        let id = path.container_throughput_id()?;
        self.tracked("update_container_throughput", &id, async {
            let response: ThroughputResponse = self
                .put_json(
                    &id,
                    COSMOS_API_VERSION,
                    &SqlResourceRequest::throughput(location, setting),
                )
                .await?;
            Ok(response.into_model())
        })
        .await
    }

    async fn get_sql_role_definition(
        &self,
        path: &ResourcePath,
        role_definition_id: &str,
    ) -> Result<RoleDefinition, ProviderError> {
        let id = path.sql_role_definition_id(role_definition_id)?;
        self.tracked("get_sql_role_definition", &id, async {
            let response: SqlRoleDefinitionResponse =
                self.get_json(&id, COSMOS_API_VERSION).await?;
            Ok(response.into_model(role_definition_id))
        })
        .await
    }

    async fn create_or_update_sql_role_definition(
        &self,
        path: &ResourcePath,
        definition: &RoleDefinition,
    ) -> Result<RoleDefinition, ProviderError> {
        let id = path.sql_role_definition_id(&definition.id)?;
        self.tracked("create_or_update_sql_role_definition", &id, async {
            let response: SqlRoleDefinitionResponse = self
                .put_json(
                    &id,
                    COSMOS_API_VERSION,
                    &PropertiesEnvelope::sql_role_definition(definition),
                )
                .await?;
            Ok(response.into_model(&definition.id))
        })
        .await
    }

    async fn create_or_update_sql_role_assignment(
        &self,
        path: &ResourcePath,
        assignment: &RoleAssignment,
    ) -> Result<RoleAssignment, ProviderError> {
        let id = path.sql_role_assignment_id(&assignment.id)?;
        self.tracked("create_or_update_sql_role_assignment", &id, async {
            let response: SqlRoleAssignmentResponse = self
                .put_json(
                    &id,
                    COSMOS_API_VERSION,
                    &PropertiesEnvelope::sql_role_assignment(assignment),
                )
                .await?;
            Ok(response.into_model(assignment))
        })
        .await
    }

    async fn find_role_definition_by_name(
        &self,
        scope: &str,
        role_name: &str,
    ) -> Result<Option<String>, ProviderError> {
        let list_id = format!("{scope}/providers/Microsoft.Authorization/roleDefinitions");
        self.tracked("find_role_definition_by_name", &list_id, async {
            let filter = role_name_filter(role_name);
            let mut next_link: Option<String> = None;

            loop {
                let builder = match &next_link {
                    None => self
                        .request(Method::GET, &list_id, Some(AUTHORIZATION_API_VERSION))
                        .await?
                        .query(&[("$filter", filter.as_str())]),
                    Some(link) => self.request(Method::GET, link, None).await?,
                };
                let response = check(&list_id, builder.send().await?).await?;
                let page: RoleDefinitionListResponse = decode(&list_id, response).await?;

                if let Some(entry) = page.value.iter().find(|entry| entry.has_name(role_name)) {
                    return Ok(Some(entry.id.clone()));
                }
                match page.next_link {
                    Some(link) if !link.is_empty() => next_link = Some(link),
                    _ => return Ok(None),
                }
            }
        })
        .await
    }

    async fn create_role_assignment(
        &self,
        assignment: &RoleAssignment,
    ) -> Result<AssignmentOutcome, ProviderError> {
        let id = format!(
            "{}/providers/Microsoft.Authorization/roleAssignments/{}",
            assignment.scope, assignment.id
        );
        self.tracked("create_role_assignment", &id, async {
            let response = self
                .request(Method::PUT, &id, Some(AUTHORIZATION_API_VERSION))
                .await?
                .json(&PropertiesEnvelope::role_assignment(assignment))
                .send()
                .await?;

            match check(&id, response).await {
                Ok(response) => {
                    let created: ResourceResponse = decode(&id, response).await?;
                    Ok(AssignmentOutcome::Created(created.into_ref(&id).id))
                }
                Err(e) if e.is_conflict() => {
                    info!("Role assignment already exists at {}", assignment.scope);
                    match self
                        .get_json::<ResourceResponse>(&id, AUTHORIZATION_API_VERSION)
                        .await
                    {
                        Ok(existing) => Ok(AssignmentOutcome::AlreadyExists(Some(
                            existing.into_ref(&id).id,
                        ))),
                        Err(e) => {
                            debug!("Existing role assignment is held under another name: {}", e);
                            Ok(AssignmentOutcome::AlreadyExists(None))
                        }
                    }
                }
                Err(e) => Err(e),
            }
        })
        .await
    }
}

/// OData `$filter` matching `role_name` exactly; single quotes are doubled
fn role_name_filter(role_name: &str) -> String {
    format!("roleName eq '{}'", role_name.replace('\'', "''"))
}
