//! # Workload Configuration
//!
//! The resolved, validated description of the Cosmos DB resources to provision.
//!
//! Resolution never stops at the first problem: every missing or invalid key is
//! collected and reported in one [`ConfigurationError::Invalid`], so an operator can
//! fix a broken configuration in a single pass.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::sources::ConfigSources;
use crate::constants::{DEFAULT_MAX_AUTOSCALE_THROUGHPUT, MIN_AUTOSCALE_THROUGHPUT};

/// Configuration keys understood by the resolver, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    SubscriptionId,
    ResourceGroupName,
    AccountName,
    Location,
    DatabaseName,
    ContainerName,
    MaxAutoscaleThroughput,
}

impl ConfigKey {
    /// All keys in the order problems are reported
    pub const ALL: [ConfigKey; 7] = [
        ConfigKey::SubscriptionId,
        ConfigKey::ResourceGroupName,
        ConfigKey::AccountName,
        ConfigKey::Location,
        ConfigKey::DatabaseName,
        ConfigKey::ContainerName,
        ConfigKey::MaxAutoscaleThroughput,
    ];

    /// Key name as it appears in configuration files
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ConfigKey::SubscriptionId => "SubscriptionId",
            ConfigKey::ResourceGroupName => "ResourceGroupName",
            ConfigKey::AccountName => "AccountName",
            ConfigKey::Location => "Location",
            ConfigKey::DatabaseName => "DatabaseName",
            ConfigKey::ContainerName => "ContainerName",
            ConfigKey::MaxAutoscaleThroughput => "MaxAutoScaleThroughput",
        }
    }

    /// Environment variable that overrides the file value
    #[must_use]
    pub fn env_var(self) -> &'static str {
        match self {
            ConfigKey::SubscriptionId => "AZURE_SUBSCRIPTION_ID",
            ConfigKey::ResourceGroupName => "AZURE_RESOURCE_GROUP",
            ConfigKey::AccountName => "COSMOS_ACCOUNT_NAME",
            ConfigKey::Location => "AZURE_LOCATION",
            ConfigKey::DatabaseName => "COSMOS_DATABASE_NAME",
            ConfigKey::ContainerName => "COSMOS_CONTAINER_NAME",
            ConfigKey::MaxAutoscaleThroughput => "COSMOS_MAX_AUTOSCALE_THROUGHPUT",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (env {})", self.name(), self.env_var())
    }
}

/// A single problem found while resolving configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProblem {
    Missing(ConfigKey),
    NotAnInteger { key: ConfigKey, value: String },
    BelowMinimum { key: ConfigKey, value: i64, minimum: i32 },
}

impl ConfigProblem {
    #[must_use]
    pub fn key(&self) -> ConfigKey {
        match self {
            ConfigProblem::Missing(key)
            | ConfigProblem::NotAnInteger { key, .. }
            | ConfigProblem::BelowMinimum { key, .. } => *key,
        }
    }
}

impl fmt::Display for ConfigProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigProblem::Missing(key) => write!(f, "missing {key}"),
            ConfigProblem::NotAnInteger { key, value } => {
                write!(f, "{key} must be an integer (got '{value}')")
            }
            ConfigProblem::BelowMinimum {
                key,
                value,
                minimum,
            } => write!(f, "{key} must be >= {minimum} (got {value})"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("invalid configuration: {}", render_problems(.problems))]
    Invalid { problems: Vec<ConfigProblem> },

    #[error("failed to read configuration file {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file {}: {message}", .path.display())]
    Unparseable { path: PathBuf, message: String },
}

fn render_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Immutable workload configuration
///
/// Built once at startup and shared by reference with every stage; nothing mutates it
/// after [`Configuration::resolve`] returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub subscription_id: String,
    pub resource_group_name: String,
    pub account_name: String,
    pub location: String,
    pub database_name: String,
    pub container_name: String,
    /// Autoscale max RU/s used at container creation and as the fallback baseline
    pub max_autoscale_throughput: i32,
}

impl Configuration {
    /// Resolve configuration from the given sources (environment first, then file)
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Invalid`] listing every missing or invalid key.
    pub fn resolve(sources: &ConfigSources) -> Result<Self, ConfigurationError> {
        let mut problems = Vec::new();

        let mut required = |key: ConfigKey| -> String {
            sources.lookup(key).unwrap_or_else(|| {
                problems.push(ConfigProblem::Missing(key));
                String::new()
            })
        };

        let subscription_id = required(ConfigKey::SubscriptionId);
        let resource_group_name = required(ConfigKey::ResourceGroupName);
        let account_name = required(ConfigKey::AccountName);
        let location = required(ConfigKey::Location);
        let database_name = required(ConfigKey::DatabaseName);
        let container_name = required(ConfigKey::ContainerName);

        let max_autoscale_throughput =
            match parse_throughput_floor(sources.lookup(ConfigKey::MaxAutoscaleThroughput)) {
                Ok(value) => value,
                Err(problem) => {
                    problems.push(problem);
                    DEFAULT_MAX_AUTOSCALE_THROUGHPUT
                }
            };

        if !problems.is_empty() {
            return Err(ConfigurationError::Invalid { problems });
        }

        Ok(Self {
            subscription_id,
            resource_group_name,
            account_name,
            location,
            database_name,
            container_name,
            max_autoscale_throughput,
        })
    }
}

fn parse_throughput_floor(raw: Option<String>) -> Result<i32, ConfigProblem> {
    let key = ConfigKey::MaxAutoscaleThroughput;
    let Some(raw) = raw else {
        return Ok(DEFAULT_MAX_AUTOSCALE_THROUGHPUT);
    };

    let value: i64 = raw.parse().map_err(|_parse_err| ConfigProblem::NotAnInteger {
        key,
        value: raw.clone(),
    })?;

    if value < i64::from(MIN_AUTOSCALE_THROUGHPUT) {
        return Err(ConfigProblem::BelowMinimum {
            key,
            value,
            minimum: MIN_AUTOSCALE_THROUGHPUT,
        });
    }

    i32::try_from(value).map_err(|_overflow| ConfigProblem::NotAnInteger { key, value: raw })
}
