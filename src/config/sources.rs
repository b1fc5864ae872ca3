//! # Configuration Sources
//!
//! Collects raw configuration values from the process environment and an optional
//! local file. Lookup order for each key:
//!
//! 1. Environment variable (e.g. `AZURE_SUBSCRIPTION_ID`)
//! 2. Local file value (e.g. `SubscriptionId` in `config.json`)
//!
//! File format is chosen by extension: `.json`, `.yaml`/`.yml`, anything else is read
//! as a dotenv file. File keys are matched case-insensitively and ignore `_`/`-`, so
//! `SubscriptionId`, `subscriptionId` and `subscription_id` are the same key.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::settings::{ConfigKey, ConfigurationError};

/// Files looked up in the working directory when no `--config` path is given
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["config.json", "config.yaml", "config.env"];

/// Raw key/value sources for configuration resolution
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    environment: HashMap<String, String>,
    file: HashMap<String, String>,
    file_path: Option<PathBuf>,
}

impl ConfigSources {
    /// Snapshot the process environment (no file)
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            environment: std::env::vars().collect(),
            ..Self::default()
        }
    }

    /// Build sources from explicit maps (used by tests and embedding callers)
    #[must_use]
    pub fn from_maps(environment: HashMap<String, String>, file: HashMap<String, String>) -> Self {
        Self {
            environment,
            file: file
                .into_iter()
                .map(|(k, v)| (normalize_key(&k), v))
                .collect(),
            file_path: None,
        }
    }

    /// Environment snapshot plus the configuration file, if any
    ///
    /// An explicit path must exist and parse. Without one, the first existing file of
    /// [`DEFAULT_CONFIG_FILES`] under `search_dir` is used; finding none is fine because
    /// the environment alone may be sufficient.
    ///
    /// # Errors
    /// Returns an error if the chosen file cannot be read or parsed.
    pub fn discover(
        explicit: Option<&Path>,
        search_dir: &Path,
    ) -> Result<Self, ConfigurationError> {
        let sources = Self::from_env();

        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => DEFAULT_CONFIG_FILES
                .iter()
                .map(|name| search_dir.join(name))
                .find(|candidate| candidate.is_file()),
        };

        match path {
            Some(path) => sources.with_file(&path),
            None => {
                debug!("No configuration file found, using environment only");
                Ok(sources)
            }
        }
    }

    /// Load a configuration file on top of the current sources
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn with_file(mut self, path: &Path) -> Result<Self, ConfigurationError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigurationError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let values = parse_file(path, &content)?;
        info!(
            "Loaded {} configuration values from {}",
            values.len(),
            path.display()
        );

        self.file = values
            .into_iter()
            .map(|(k, v)| (normalize_key(&k), v))
            .collect();
        self.file_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// File the values were loaded from, if any
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// First non-blank value for `key`, environment before file, trimmed
    #[must_use]
    pub fn lookup(&self, key: ConfigKey) -> Option<String> {
        let from_env = self.environment.get(key.env_var());
        let from_file = self.file.get(&normalize_key(key.name()));

        [from_env, from_file]
            .into_iter()
            .flatten()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    /// Raw environment value (used by runtime options)
    #[must_use]
    pub fn env(&self, name: &str) -> Option<&str> {
        self.environment.get(name).map(String::as_str)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_file(path: &Path, content: &str) -> Result<BTreeMap<String, String>, ConfigurationError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let unparseable = |message: String| ConfigurationError::Unparseable {
        path: path.to_path_buf(),
        message,
    };

    match extension.as_deref() {
        Some("json") => {
            let object: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(content).map_err(|e| unparseable(e.to_string()))?;
            Ok(object
                .into_iter()
                .filter_map(|(key, value)| json_scalar(value).map(|v| (key, v)))
                .collect())
        }
        Some("yaml" | "yml") => {
            let mapping: BTreeMap<String, serde_yaml::Value> =
                serde_yaml::from_str(content).map_err(|e| unparseable(e.to_string()))?;
            Ok(mapping
                .into_iter()
                .filter_map(|(key, value)| yaml_scalar(value).map(|v| (key, v)))
                .collect())
        }
        _ => dotenvy::from_read_iter(content.as_bytes())
            .map(|item| item.map_err(|e| unparseable(e.to_string())))
            .collect(),
    }
}

fn json_scalar(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_scalar(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
