//! # Runtime Options
//!
//! Process-level toggles loaded from environment variables.

use std::time::Duration;

use crate::constants::{
    DEFAULT_ARM_ENDPOINT, DEFAULT_LRO_POLL_INTERVAL_SECS, DEFAULT_LRO_TIMEOUT_SECS,
    DEFAULT_THROUGHPUT_DELTA,
};

/// Runtime options
///
/// All settings have sensible defaults and can be overridden via environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeOptions {
    /// Opt-in for the destructive account deletion at the end of a full run
    /// (`COSMOS_SAMPLE_DELETE_ACCOUNT`)
    pub delete_account_opt_in: bool,
    /// Explicit principal object id, skips token claim inspection
    /// (`AZURE_PRINCIPAL_OBJECT_ID`)
    pub principal_object_id: Option<String>,
    /// Resource Manager endpoint (`ARM_ENDPOINT`)
    pub arm_endpoint: String,
    /// Contract-test mode: static credential, mock endpoint (`PACT_MODE`)
    pub pact_mode: bool,
    /// Poll interval for long-running operations (`COSMOS_LRO_POLL_INTERVAL_SECS`)
    pub lro_poll_interval_secs: u64,
    /// Upper bound on a single long-running operation (`COSMOS_LRO_TIMEOUT_SECS`)
    pub lro_timeout_secs: u64,
    /// Throughput delta applied by the full run (`COSMOS_THROUGHPUT_DELTA`)
    pub throughput_delta: i64,
    /// Whether the full run assigns the Azure RBAC operator role (`COSMOS_ASSIGN_AZURE_RBAC`)
    pub assign_azure_rbac: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            delete_account_opt_in: false,
            principal_object_id: None,
            arm_endpoint: DEFAULT_ARM_ENDPOINT.to_string(),
            pact_mode: false,
            lro_poll_interval_secs: DEFAULT_LRO_POLL_INTERVAL_SECS,
            lro_timeout_secs: DEFAULT_LRO_TIMEOUT_SECS,
            throughput_delta: DEFAULT_THROUGHPUT_DELTA,
            assign_azure_rbac: true,
        }
    }
}

impl RuntimeOptions {
    /// Load runtime options from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load runtime options from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            delete_account_opt_in: env_var_or_default_bool(
                &lookup,
                "COSMOS_SAMPLE_DELETE_ACCOUNT",
                defaults.delete_account_opt_in,
            ),
            principal_object_id: lookup("AZURE_PRINCIPAL_OBJECT_ID")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            arm_endpoint: env_var_or_default_str(&lookup, "ARM_ENDPOINT", &defaults.arm_endpoint)
                .trim_end_matches('/')
                .to_string(),
            pact_mode: env_var_or_default_bool(&lookup, "PACT_MODE", defaults.pact_mode),
            lro_poll_interval_secs: env_var_or_default(
                &lookup,
                "COSMOS_LRO_POLL_INTERVAL_SECS",
                defaults.lro_poll_interval_secs,
            ),
            lro_timeout_secs: env_var_or_default(
                &lookup,
                "COSMOS_LRO_TIMEOUT_SECS",
                defaults.lro_timeout_secs,
            ),
            throughput_delta: env_var_or_default(
                &lookup,
                "COSMOS_THROUGHPUT_DELTA",
                defaults.throughput_delta,
            ),
            assign_azure_rbac: env_var_or_default_bool(
                &lookup,
                "COSMOS_ASSIGN_AZURE_RBAC",
                defaults.assign_azure_rbac,
            ),
        }
    }

    #[must_use]
    pub fn lro_poll_interval(&self) -> Duration {
        Duration::from_secs(self.lro_poll_interval_secs)
    }

    #[must_use]
    pub fn lro_timeout(&self) -> Duration {
        Duration::from_secs(self.lro_timeout_secs)
    }
}

/// Read environment variable or return default
fn env_var_or_default<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Read environment variable as boolean or return default
fn env_var_or_default_bool<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| {
            let v_lower = v.trim().to_lowercase();
            v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
        })
        .unwrap_or(default)
}

/// Read environment variable as string or return default
fn env_var_or_default_str<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn options(pairs: &[(&str, &str)]) -> RuntimeOptions {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        RuntimeOptions::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let opts = options(&[]);
        assert_eq!(opts, RuntimeOptions::default());
        assert!(!opts.delete_account_opt_in);
        assert!(opts.assign_azure_rbac);
        assert_eq!(opts.throughput_delta, 1000);
        assert_eq!(opts.lro_poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_delete_opt_in_accepts_common_truthy_spellings() {
        for value in ["true", "TRUE", "1", "yes", "on"] {
            assert!(
                options(&[("COSMOS_SAMPLE_DELETE_ACCOUNT", value)]).delete_account_opt_in,
                "{value} should opt in"
            );
        }
        assert!(!options(&[("COSMOS_SAMPLE_DELETE_ACCOUNT", "DELETE")]).delete_account_opt_in);
    }

    #[test]
    fn test_blank_principal_override_is_ignored() {
        assert_eq!(
            options(&[("AZURE_PRINCIPAL_OBJECT_ID", "  ")]).principal_object_id,
            None
        );
        assert_eq!(
            options(&[("AZURE_PRINCIPAL_OBJECT_ID", " abc ")])
                .principal_object_id
                .as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn test_arm_endpoint_trailing_slash_is_trimmed() {
        let opts = options(&[("ARM_ENDPOINT", "http://127.0.0.1:1234/")]);
        assert_eq!(opts.arm_endpoint, "http://127.0.0.1:1234");
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let opts = options(&[
            ("COSMOS_THROUGHPUT_DELTA", "-500"),
            ("COSMOS_LRO_TIMEOUT_SECS", "soon"),
        ]);
        assert_eq!(opts.throughput_delta, -500);
        assert_eq!(opts.lro_timeout_secs, 1800);
    }
}
