//! ResourcePath implementation
//!
//! Builder for Resource Manager resource ids and Cosmos DB RBAC scopes.
//!
//! Two id shapes exist for the same database or container:
//! - ARM resource ids: `.../databaseAccounts/{a}/sqlDatabases/{d}/containers/{c}`
//! - Cosmos SQL RBAC scopes: `.../databaseAccounts/{a}/dbs/{d}/colls/{c}`

use thiserror::Error;

use crate::config::Configuration;
use crate::constants::DOCUMENTDB_PROVIDER;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("resource path has no {0}")]
    Missing(&'static str),
}

/// Level of the resource hierarchy a scope refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScopeLevel {
    Subscription,
    ResourceGroup,
    Account,
    Database,
    Container,
}

impl ScopeLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ScopeLevel::Subscription => "subscription",
            ScopeLevel::ResourceGroup => "resource_group",
            ScopeLevel::Account => "account",
            ScopeLevel::Database => "database",
            ScopeLevel::Container => "container",
        }
    }
}

/// Builder for resource ids and scopes
///
/// # Example
///
/// ```rust
/// use cosmos_mgmt::arm::{ResourcePath, ScopeLevel};
///
/// let path = ResourcePath::new("sub")
///     .resource_group("rg")
///     .account("acct")
///     .database("db");
/// assert_eq!(
///     path.scope(ScopeLevel::Database),
///     "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.DocumentDB/databaseAccounts/acct/dbs/db"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    subscription: String,
    resource_group: Option<String>,
    account: Option<String>,
    database: Option<String>,
    container: Option<String>,
}

impl ResourcePath {
    pub fn new(subscription: impl Into<String>) -> Self {
        Self {
            subscription: subscription.into(),
            resource_group: None,
            account: None,
            database: None,
            container: None,
        }
    }

    /// Path down to the configured container
    #[must_use]
    pub fn from_configuration(config: &Configuration) -> Self {
        Self::new(&config.subscription_id)
            .resource_group(&config.resource_group_name)
            .account(&config.account_name)
            .database(&config.database_name)
            .container(&config.container_name)
    }

    #[must_use]
    pub fn resource_group(mut self, resource_group: impl Into<String>) -> Self {
        self.resource_group = Some(resource_group.into());
        self
    }

    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    #[must_use]
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    // Build methods

    #[must_use]
    pub fn subscription_id(&self) -> String {
        format!("/subscriptions/{}", self.subscription)
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if no resource group was set.
    pub fn resource_group_id(&self) -> Result<String, PathError> {
        let rg = self
            .resource_group
            .as_deref()
            .ok_or(PathError::Missing("resource group"))?;
        Ok(format!("{}/resourceGroups/{rg}", self.subscription_id()))
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if the resource group or account was not set.
    pub fn account_id(&self) -> Result<String, PathError> {
        let account = self
            .account
            .as_deref()
            .ok_or(PathError::Missing("account"))?;
        Ok(format!(
            "{}/providers/{DOCUMENTDB_PROVIDER}/databaseAccounts/{account}",
            self.resource_group_id()?
        ))
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if any level down to the database was not set.
    pub fn database_id(&self) -> Result<String, PathError> {
        let database = self
            .database
            .as_deref()
            .ok_or(PathError::Missing("database"))?;
        Ok(format!("{}/sqlDatabases/{database}", self.account_id()?))
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if any level down to the container was not set.
    pub fn container_id(&self) -> Result<String, PathError> {
        let container = self
            .container
            .as_deref()
            .ok_or(PathError::Missing("container"))?;
        Ok(format!("{}/containers/{container}", self.database_id()?))
    }

    /// Dedicated throughput settings of the container
    ///
    /// # Errors
    /// Returns [`PathError::Missing`] if any level down to the container was not set.
    pub fn container_throughput_id(&self) -> Result<String, PathError> {
        Ok(format!("{}/throughputSettings/default", self.container_id()?))
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if the resource group or account was not set.
    pub fn sql_role_definition_id(&self, role_definition: &str) -> Result<String, PathError> {
        Ok(format!(
            "{}/sqlRoleDefinitions/{role_definition}",
            self.account_id()?
        ))
    }

    /// # Errors
    /// Returns [`PathError::Missing`] if the resource group or account was not set.
    pub fn sql_role_assignment_id(&self, assignment: &str) -> Result<String, PathError> {
        Ok(format!(
            "{}/sqlRoleAssignments/{assignment}",
            self.account_id()?
        ))
    }

    /// Deepest level this path can address
    #[must_use]
    pub fn deepest_level(&self) -> ScopeLevel {
        match (
            &self.resource_group,
            &self.account,
            &self.database,
            &self.container,
        ) {
            (None, ..) => ScopeLevel::Subscription,
            (Some(_), None, ..) => ScopeLevel::ResourceGroup,
            (Some(_), Some(_), None, _) => ScopeLevel::Account,
            (Some(_), Some(_), Some(_), None) => ScopeLevel::Database,
            (Some(_), Some(_), Some(_), Some(_)) => ScopeLevel::Container,
        }
    }

    /// RBAC scope at `level`, or at the deepest available level above it
    ///
    /// Database and container scopes use the Cosmos SQL RBAC form (`/dbs/`, `/colls/`).
    #[must_use]
    pub fn scope(&self, level: ScopeLevel) -> String {
        let subscription = self.subscription_id();
        let (Some(rg), Some(account)) = (&self.resource_group, &self.account) else {
            return match (&self.resource_group, level) {
                (Some(rg), level) if level >= ScopeLevel::ResourceGroup => {
                    format!("{subscription}/resourceGroups/{rg}")
                }
                _ => subscription,
            };
        };

        let group = format!("{subscription}/resourceGroups/{rg}");
        let account_scope =
            format!("{group}/providers/{DOCUMENTDB_PROVIDER}/databaseAccounts/{account}");

        match (level, &self.database, &self.container) {
            (ScopeLevel::Subscription, ..) => subscription,
            (ScopeLevel::ResourceGroup, ..) => group,
            (ScopeLevel::Account, ..) | (_, None, _) => account_scope,
            (ScopeLevel::Container, Some(db), Some(container)) => {
                format!("{account_scope}/dbs/{db}/colls/{container}")
            }
            (ScopeLevel::Database | ScopeLevel::Container, Some(db), _) => {
                format!("{account_scope}/dbs/{db}")
            }
        }
    }
}
