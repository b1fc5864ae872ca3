//! Request bodies for Resource Manager PUT calls.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::{
    AccountDescriptor, ContainerDescriptor, DatabaseDescriptor, RoleAssignment, RoleDefinition,
    ThroughputSetting,
};

// Database account

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountRequest<'a> {
    location: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "no_tags")]
    tags: &'a BTreeMap<String, String>,
    properties: AccountRequestProperties<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountRequestProperties<'a> {
    database_account_offer_type: &'static str,
    locations: Vec<AccountLocation<'a>>,
    capabilities: Vec<NamedCapability<'a>>,
    disable_local_auth: bool,
    public_network_access: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountLocation<'a> {
    location_name: &'a str,
    failover_priority: u32,
    is_zone_redundant: bool,
}

#[derive(Debug, Serialize)]
struct NamedCapability<'a> {
    name: &'a str,
}

#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde passes a reference to the field")]
fn no_tags(tags: &&BTreeMap<String, String>) -> bool {
    tags.is_empty()
}

impl<'a> AccountRequest<'a> {
    pub fn new(account: &'a AccountDescriptor) -> Self {
        Self {
            location: &account.location,
            kind: "GlobalDocumentDB",
            tags: &account.tags,
            properties: AccountRequestProperties {
                database_account_offer_type: "Standard",
                locations: vec![AccountLocation {
                    location_name: &account.location,
                    failover_priority: 0,
                    is_zone_redundant: account.zone_redundant,
                }],
                capabilities: account
                    .capabilities
                    .iter()
                    .map(|name| NamedCapability { name })
                    .collect(),
                disable_local_auth: !account.auth.local_auth_enabled,
                public_network_access: account.public_network_access.as_str(),
            },
        }
    }
}

// SQL database and container

#[derive(Debug, Serialize)]
pub(crate) struct SqlResourceRequest<'a, R> {
    location: &'a str,
    properties: SqlResourceProperties<R>,
}

#[derive(Debug, Serialize)]
struct SqlResourceProperties<R> {
    resource: R,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<CreateOptions>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateOptions {
    autoscale_settings: AutoscaleSettings,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AutoscaleSettings {
    max_throughput: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct DatabaseResource<'a> {
    id: &'a str,
}

impl<'a> SqlResourceRequest<'a, DatabaseResource<'a>> {
    pub fn database(database: &'a DatabaseDescriptor) -> Self {
        Self {
            location: &database.location,
            properties: SqlResourceProperties {
                resource: DatabaseResource { id: &database.name },
                options: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContainerResource<'a> {
    id: &'a str,
    partition_key: PartitionKey<'a>,
    indexing_policy: IndexingPolicy<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unique_key_policy: Option<UniqueKeyPolicy<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_ttl: Option<i64>,
    conflict_resolution_policy: ConflictResolutionPolicy<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vector_embedding_policy: Option<VectorEmbeddingPolicy<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    computed_properties: Vec<ComputedProperty<'a>>,
}

#[derive(Debug, Serialize)]
struct PartitionKey<'a> {
    paths: &'a [String],
    kind: &'static str,
    version: u8,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexingPolicy<'a> {
    automatic: bool,
    indexing_mode: &'static str,
    included_paths: Vec<IndexPath<'a>>,
    excluded_paths: Vec<IndexPath<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vector_indexes: Vec<VectorIndex<'a>>,
}

#[derive(Debug, Serialize)]
struct IndexPath<'a> {
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct VectorIndex<'a> {
    path: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UniqueKeyPolicy<'a> {
    unique_keys: Vec<UniqueKey<'a>>,
}

#[derive(Debug, Serialize)]
struct UniqueKey<'a> {
    paths: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConflictResolutionPolicy<'a> {
    mode: &'static str,
    conflict_resolution_path: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorEmbeddingPolicy<'a> {
    vector_embeddings: Vec<VectorEmbedding<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VectorEmbedding<'a> {
    path: &'a str,
    data_type: &'static str,
    distance_function: &'static str,
    dimensions: u32,
}

#[derive(Debug, Serialize)]
struct ComputedProperty<'a> {
    name: &'a str,
    query: &'a str,
}

impl<'a> SqlResourceRequest<'a, ContainerResource<'a>> {
    pub fn container(container: &'a ContainerDescriptor) -> Self {
        let policy = &container.indexing_policy;
        let resource = ContainerResource {
            id: &container.name,
            partition_key: PartitionKey {
                paths: &container.partition_key_paths,
                kind: container.partition_kind.as_str(),
                version: 2,
            },
            indexing_policy: IndexingPolicy {
                automatic: policy.automatic,
                indexing_mode: policy.mode.as_str(),
                included_paths: policy
                    .included_paths
                    .iter()
                    .map(|path| IndexPath { path })
                    .collect(),
                excluded_paths: policy
                    .excluded_paths
                    .iter()
                    .map(|path| IndexPath { path })
                    .collect(),
                vector_indexes: policy
                    .vector_indexes
                    .iter()
                    .map(|index| VectorIndex {
                        path: &index.path,
                        kind: index.kind.as_str(),
                    })
                    .collect(),
            },
            unique_key_policy: (!container.unique_key_paths.is_empty()).then(|| {
                UniqueKeyPolicy {
                    unique_keys: container
                        .unique_key_paths
                        .iter()
                        .map(|paths| UniqueKey { paths })
                        .collect(),
                }
            }),
            default_ttl: container.default_ttl.default_ttl(),
            conflict_resolution_policy: ConflictResolutionPolicy {
                mode: container.conflict_resolution.mode.as_str(),
                conflict_resolution_path: &container.conflict_resolution.path,
            },
            vector_embedding_policy: container.vector_embeddings.as_ref().map(|policy| {
                VectorEmbeddingPolicy {
                    vector_embeddings: policy
                        .embeddings
                        .iter()
                        .map(|embedding| VectorEmbedding {
                            path: &embedding.path,
                            data_type: embedding.data_type.as_str(),
                            distance_function: embedding.distance_function.as_str(),
                            dimensions: embedding.dimensions,
                        })
                        .collect(),
                }
            }),
            computed_properties: container
                .computed_properties
                .iter()
                .map(|property| ComputedProperty {
                    name: &property.name,
                    query: &property.query,
                })
                .collect(),
        };

        Self {
            location: &container.location,
            properties: SqlResourceProperties {
                resource,
                options: container
                    .autoscale_max_throughput
                    .map(|max_throughput| CreateOptions {
                        autoscale_settings: AutoscaleSettings { max_throughput },
                    }),
            },
        }
    }
}

// Throughput

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThroughputResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    throughput: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    autoscale_settings: Option<AutoscaleSettings>,
}

impl<'a> SqlResourceRequest<'a, ThroughputResource> {
    pub fn throughput(location: &'a str, setting: ThroughputSetting) -> Self {
        let resource = match setting {
            ThroughputSetting::Autoscale { max_throughput } => ThroughputResource {
                throughput: None,
                autoscale_settings: Some(AutoscaleSettings { max_throughput }),
            },
            ThroughputSetting::Manual { throughput } => ThroughputResource {
                throughput: Some(throughput),
                autoscale_settings: None,
            },
        };
        Self {
            location,
            properties: SqlResourceProperties {
                resource,
                options: None,
            },
        }
    }
}

// Cosmos SQL RBAC

#[derive(Debug, Serialize)]
pub(crate) struct PropertiesEnvelope<P> {
    properties: P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SqlRoleDefinitionProperties<'a> {
    role_name: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    assignable_scopes: Vec<&'a str>,
    permissions: Vec<Permission<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Permission<'a> {
    data_actions: Vec<&'a str>,
}

impl<'a> PropertiesEnvelope<SqlRoleDefinitionProperties<'a>> {
    pub fn sql_role_definition(definition: &'a RoleDefinition) -> Self {
        Self {
            properties: SqlRoleDefinitionProperties {
                role_name: &definition.name,
                kind: definition.kind.as_str(),
                assignable_scopes: definition
                    .assignable_scopes
                    .iter()
                    .map(String::as_str)
                    .collect(),
                permissions: vec![Permission {
                    data_actions: definition.data_actions.iter().map(String::as_str).collect(),
                }],
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SqlRoleAssignmentProperties<'a> {
    role_definition_id: &'a str,
    scope: &'a str,
    principal_id: &'a str,
}

impl<'a> PropertiesEnvelope<SqlRoleAssignmentProperties<'a>> {
    pub fn sql_role_assignment(assignment: &'a RoleAssignment) -> Self {
        Self {
            properties: SqlRoleAssignmentProperties {
                role_definition_id: &assignment.role_definition_id,
                scope: &assignment.scope,
                principal_id: &assignment.principal_id,
            },
        }
    }
}

// Azure RBAC

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleAssignmentProperties<'a> {
    role_definition_id: &'a str,
    principal_id: &'a str,
}

impl<'a> PropertiesEnvelope<RoleAssignmentProperties<'a>> {
    pub fn role_assignment(assignment: &'a RoleAssignment) -> Self {
        Self {
            properties: RoleAssignmentProperties {
                role_definition_id: &assignment.role_definition_id,
                principal_id: &assignment.principal_id,
            },
        }
    }
}
