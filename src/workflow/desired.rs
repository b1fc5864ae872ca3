//! # Desired State
//!
//! Builders for the resources the workflow converges on. Everything here is pure and
//! derived from the [`Configuration`] so the same configuration always yields the same
//! request payloads.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::Configuration;
use crate::constants::{CUSTOM_ROLE_NAME, VECTOR_SEARCH_CAPABILITY};
use crate::model::{
    AccountDescriptor, AuthMode, ComputedProperty, ConflictResolution, ConflictResolutionMode,
    ContainerDescriptor, DatabaseDescriptor, DistanceFunction, IndexingMode, IndexingPolicy,
    PartitionKind, PublicNetworkAccess, RoleDefinition, RoleDefinitionType, TtlPolicy,
    VectorDataType, VectorEmbedding, VectorEmbeddingPolicy, VectorIndex, VectorIndexType,
};

/// Tag carrying the best-effort identity of whoever provisioned the account
pub const OWNER_TAG: &str = "owner";

/// Hierarchical partition key of the sample container
pub const PARTITION_KEY_PATHS: [&str; 3] = ["/companyId", "/departmentId", "/userId"];

pub const VECTOR_PATH: &str = "/embedding";
pub const VECTOR_DIMENSIONS: u32 = 1536;

/// Data actions of the custom role: the data contributor set minus item deletion
pub const CUSTOM_ROLE_DATA_ACTIONS: [&str; 9] = [
    "Microsoft.DocumentDB/databaseAccounts/readMetadata",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/items/create",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/items/read",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/items/replace",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/items/upsert",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/executeQuery",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/readChangeFeed",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/executeStoredProcedure",
    "Microsoft.DocumentDB/databaseAccounts/sqlDatabases/containers/manageConflicts",
];

/// NoSQL account with vector search enabled and key-based auth disabled
///
/// `owner` becomes the `owner` tag; no tag is written when it is unknown.
#[must_use]
pub fn desired_account(config: &Configuration, owner: Option<&str>) -> AccountDescriptor {
    let mut tags = BTreeMap::new();
    if let Some(owner) = owner.map(str::trim).filter(|o| !o.is_empty()) {
        tags.insert(OWNER_TAG.to_string(), owner.to_string());
    }

    AccountDescriptor {
        name: config.account_name.clone(),
        location: config.location.clone(),
        capabilities: BTreeSet::from([VECTOR_SEARCH_CAPABILITY.to_string()]),
        auth: AuthMode::entra_id_only(),
        tags,
        public_network_access: PublicNetworkAccess::Enabled,
        zone_redundant: false,
    }
}

#[must_use]
pub fn desired_database(config: &Configuration) -> DatabaseDescriptor {
    DatabaseDescriptor {
        name: config.database_name.clone(),
        location: config.location.clone(),
    }
}

#[must_use]
pub fn desired_container(config: &Configuration) -> ContainerDescriptor {
    let partition_key_paths: Vec<String> =
        PARTITION_KEY_PATHS.iter().map(ToString::to_string).collect();
    let partition_kind = PartitionKind::for_paths(&partition_key_paths);

    ContainerDescriptor {
        name: config.container_name.clone(),
        location: config.location.clone(),
        partition_key_paths,
        partition_kind,
        indexing_policy: IndexingPolicy {
            automatic: true,
            mode: IndexingMode::Consistent,
            included_paths: vec!["/*".to_string()],
            excluded_paths: vec!["/\"_etag\"/?".to_string()],
            vector_indexes: vec![VectorIndex {
                path: VECTOR_PATH.to_string(),
                kind: VectorIndexType::DiskAnn,
            }],
        },
        unique_key_paths: vec![vec!["/userId".to_string()]],
        default_ttl: TtlPolicy::NoDefaultExpiry,
        conflict_resolution: ConflictResolution {
            mode: ConflictResolutionMode::LastWriterWins,
            path: "/_ts".to_string(),
        },
        vector_embeddings: Some(VectorEmbeddingPolicy {
            embeddings: vec![VectorEmbedding {
                path: VECTOR_PATH.to_string(),
                data_type: VectorDataType::Float32,
                distance_function: DistanceFunction::Cosine,
                dimensions: VECTOR_DIMENSIONS,
            }],
        }),
        computed_properties: vec![ComputedProperty {
            name: "cp_lowerName".to_string(),
            query: "SELECT VALUE LOWER(c.userName) FROM c".to_string(),
        }],
        autoscale_max_throughput: Some(config.max_autoscale_throughput),
    }
}

/// Custom SQL role assignable at `account_scope`
#[must_use]
pub fn custom_role_definition(id: String, account_scope: &str) -> RoleDefinition {
    RoleDefinition {
        id,
        name: CUSTOM_ROLE_NAME.to_string(),
        kind: RoleDefinitionType::Custom,
        assignable_scopes: BTreeSet::from([account_scope.to_string()]),
        data_actions: CUSTOM_ROLE_DATA_ACTIONS
            .iter()
            .map(ToString::to_string)
            .collect(),
    }
}
