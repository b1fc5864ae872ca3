//! # Constants
//!
//! Well-known identifiers, API versions and defaults used across the crate.

/// Azure Resource Manager endpoint (public cloud)
pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";

/// Token scope for the Resource Manager audience
pub const ARM_TOKEN_SCOPE: &str = "https://management.azure.com/.default";

/// `Microsoft.DocumentDB` API version. Needs to be recent enough to carry
/// `vectorEmbeddingPolicy` and `computedProperties` on SQL containers.
pub const COSMOS_API_VERSION: &str = "2024-11-15";

/// `Microsoft.Authorization` API version (role definitions and assignments)
pub const AUTHORIZATION_API_VERSION: &str = "2022-04-01";

/// `Microsoft.Resources` API version (resource groups)
pub const RESOURCES_API_VERSION: &str = "2021-04-01";

/// Subscriptions API version
pub const SUBSCRIPTIONS_API_VERSION: &str = "2022-12-01";

/// Minimum autoscale max throughput (RU/s) accepted by the service
pub const MIN_AUTOSCALE_THROUGHPUT: i32 = 1000;

/// Minimum manual throughput (RU/s) accepted by the service
pub const MIN_MANUAL_THROUGHPUT: i32 = 400;

/// Default for `maxAutoScaleThroughput` when the configuration omits it
pub const DEFAULT_MAX_AUTOSCALE_THROUGHPUT: i32 = 1000;

/// Throughput delta applied by the full run
pub const DEFAULT_THROUGHPUT_DELTA: i64 = 1000;

/// Capability that turns on vector search for NoSQL accounts
pub const VECTOR_SEARCH_CAPABILITY: &str = "EnableNoSQLVectorSearch";

/// Built-in Cosmos SQL "Data Contributor" role definition id
pub const BUILT_IN_DATA_CONTRIBUTOR_ROLE_ID: &str = "00000000-0000-0000-0000-000000000002";

/// Built-in Azure RBAC role granting account management without data access
pub const COSMOS_DB_OPERATOR_ROLE_NAME: &str = "Cosmos DB Operator";

/// Display name of the custom SQL role created by `create-custom-role`
pub const CUSTOM_ROLE_NAME: &str = "My Custom Cosmos DB Data Contributor Except Delete";

/// Literal the operator must type before an account is deleted interactively
pub const DELETE_CONFIRMATION: &str = "DELETE";

/// Default poll interval for long-running operations (seconds)
pub const DEFAULT_LRO_POLL_INTERVAL_SECS: u64 = 5;

/// Default upper bound on a single long-running operation (seconds)
pub const DEFAULT_LRO_TIMEOUT_SECS: u64 = 1800;

/// Resource provider namespace for Cosmos DB
pub const DOCUMENTDB_PROVIDER: &str = "Microsoft.DocumentDB";
