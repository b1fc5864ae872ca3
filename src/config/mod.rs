//! # Configuration
//!
//! Configuration management for the provisioning workflow.
//!
//! This module provides:
//! - `Configuration`: the immutable workload description (subscription, names, throughput floor)
//! - `ConfigSources`: environment snapshot plus an optional local file (JSON, YAML or dotenv)
//! - `RuntimeOptions`: toggles read from the environment (delete opt-in, principal override, ...)

pub mod runtime;
pub mod settings;
pub mod sources;

pub use runtime::RuntimeOptions;
pub use settings::{ConfigKey, ConfigProblem, Configuration, ConfigurationError};
pub use sources::ConfigSources;
