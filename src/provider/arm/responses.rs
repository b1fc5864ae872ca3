//! Response bodies returned by Resource Manager.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::model::{
    AccountInfo, ResourceRef, RoleAssignment, RoleDefinition, RoleDefinitionType,
    SubscriptionInfo, ThroughputSettings,
};

/// `{ "error": { "code", "message" } }`, with a top-level fallback used by some
/// Cosmos DB responses
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorResponse {
    /// Parse an error body; anything unreadable becomes the raw text as the message
    pub fn parse(body: &str) -> (String, String) {
        let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
        let (code, message) = match parsed.error {
            Some(detail) => (detail.code, detail.message),
            None => (parsed.code, parsed.message),
        };
        (
            code.unwrap_or_else(|| "Unknown".to_string()),
            message.unwrap_or_else(|| body.trim().to_string()),
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubscriptionResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    subscription_id: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl SubscriptionResponse {
    pub fn into_model(self, requested: &str) -> SubscriptionInfo {
        SubscriptionInfo {
            id: self
                .subscription_id
                .or(self.id)
                .unwrap_or_else(|| requested.to_string()),
            display_name: self.display_name,
            state: self.state,
        }
    }
}

/// Any ARM resource: `id`, `name`, optional `location`
#[derive(Debug, Deserialize)]
pub(crate) struct ResourceResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl ResourceResponse {
    pub fn into_ref(self, fallback_id: &str) -> ResourceRef {
        let id = self.id.unwrap_or_else(|| fallback_id.to_string());
        let name = self
            .name
            .unwrap_or_else(|| id.rsplit('/').next().unwrap_or_default().to_string());
        ResourceRef { id, name }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccountResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    properties: AccountResponseProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponseProperties {
    #[serde(default)]
    provisioning_state: Option<String>,
    #[serde(default)]
    document_endpoint: Option<String>,
}

impl AccountResponse {
    pub fn into_model(self, fallback_id: &str, fallback_name: &str) -> AccountInfo {
        AccountInfo {
            id: self.id.unwrap_or_else(|| fallback_id.to_string()),
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            location: self.location,
            provisioning_state: self.properties.provisioning_state,
            document_endpoint: self.properties.document_endpoint,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ThroughputResponse {
    #[serde(default)]
    properties: ThroughputResponseProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ThroughputResponseProperties {
    #[serde(default)]
    resource: ThroughputResponseResource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThroughputResponseResource {
    #[serde(default)]
    throughput: Option<i32>,
    #[serde(default)]
    autoscale_settings: Option<AutoscaleResponse>,
    /// Reported as a string by the service
    #[serde(default)]
    minimum_throughput: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AutoscaleResponse {
    #[serde(default)]
    max_throughput: Option<i32>,
}

impl ThroughputResponse {
    pub fn into_model(self) -> ThroughputSettings {
        let resource = self.properties.resource;
        let autoscale_max_throughput = resource.autoscale_settings.and_then(|a| a.max_throughput);
        ThroughputSettings {
            autoscale_max_throughput,
            // Under autoscale `throughput` is the current scaled value, not a manual setting
            manual_throughput: if autoscale_max_throughput.is_some() {
                None
            } else {
                resource.throughput
            },
            minimum_throughput: resource.minimum_throughput.and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SqlRoleDefinitionResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    properties: SqlRoleDefinitionResponseProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlRoleDefinitionResponseProperties {
    #[serde(default)]
    role_name: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    assignable_scopes: Vec<String>,
    #[serde(default)]
    permissions: Vec<PermissionResponse>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PermissionResponse {
    #[serde(default)]
    data_actions: Vec<String>,
}

impl SqlRoleDefinitionResponse {
    pub fn into_model(self, requested_id: &str) -> RoleDefinition {
        let properties = self.properties;
        RoleDefinition {
            id: self.name.unwrap_or_else(|| requested_id.to_string()),
            name: properties.role_name.unwrap_or_default(),
            kind: properties
                .kind
                .as_deref()
                .map_or(RoleDefinitionType::Custom, RoleDefinitionType::parse),
            assignable_scopes: properties.assignable_scopes.into_iter().collect(),
            data_actions: properties
                .permissions
                .into_iter()
                .flat_map(|p| p.data_actions)
                .collect::<BTreeSet<_>>(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SqlRoleAssignmentResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    properties: SqlRoleAssignmentResponseProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SqlRoleAssignmentResponseProperties {
    #[serde(default)]
    role_definition_id: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    principal_id: Option<String>,
}

impl SqlRoleAssignmentResponse {
    pub fn into_model(self, requested: &RoleAssignment) -> RoleAssignment {
        let properties = self.properties;
        RoleAssignment {
            id: self.name.unwrap_or_else(|| requested.id.clone()),
            scope: properties
                .scope
                .unwrap_or_else(|| requested.scope.clone()),
            role_definition_id: properties
                .role_definition_id
                .unwrap_or_else(|| requested.role_definition_id.clone()),
            principal_id: properties
                .principal_id
                .unwrap_or_else(|| requested.principal_id.clone()),
        }
    }
}

/// Page of Azure RBAC role definitions
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoleDefinitionListResponse {
    #[serde(default)]
    pub value: Vec<RoleDefinitionEntry>,
    #[serde(default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleDefinitionEntry {
    pub id: String,
    #[serde(default)]
    properties: RoleDefinitionEntryProperties,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleDefinitionEntryProperties {
    #[serde(default)]
    role_name: Option<String>,
}

impl RoleDefinitionEntry {
    pub fn has_name(&self, role_name: &str) -> bool {
        self.properties
            .role_name
            .as_deref()
            .is_some_and(|name| name.eq_ignore_ascii_case(role_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_variants() {
        assert_eq!(
            ErrorResponse::parse(r#"{"error":{"code":"NotFound","message":"gone"}}"#),
            ("NotFound".to_string(), "gone".to_string())
        );
        assert_eq!(
            ErrorResponse::parse(r#"{"code":"BadRequest","message":"bad"}"#),
            ("BadRequest".to_string(), "bad".to_string())
        );
        assert_eq!(
            ErrorResponse::parse("upstream timeout"),
            ("Unknown".to_string(), "upstream timeout".to_string())
        );
    }

    #[test]
    fn test_autoscale_throughput_ignores_scaled_value() {
        let response: ThroughputResponse = serde_json::from_str(
            r#"{"properties":{"resource":{"throughput":400,"autoscaleSettings":{"maxThroughput":4000},"minimumThroughput":"400"}}}"#,
        )
        .expect("parse");
        let settings = response.into_model();
        assert_eq!(settings.autoscale_max_throughput, Some(4000));
        assert_eq!(settings.manual_throughput, None);
        assert_eq!(settings.minimum_throughput, Some(400));
    }

    #[test]
    fn test_empty_throughput_resource_has_no_values() {
        let response: ThroughputResponse =
            serde_json::from_str(r#"{"properties":{"resource":{}}}"#).expect("parse");
        assert_eq!(response.into_model(), ThroughputSettings::default());
    }

    #[test]
    fn test_sql_role_definition_collects_data_actions() {
        let response: SqlRoleDefinitionResponse = serde_json::from_str(
            r#"{"name":"00000000-0000-0000-0000-000000000002","properties":{"roleName":"Cosmos DB Built-in Data Contributor","type":"BuiltInRole","assignableScopes":["/"],"permissions":[{"dataActions":["a","b"],"notDataActions":[]}]}}"#,
        )
        .expect("parse");
        let definition = response.into_model("ignored");
        assert_eq!(definition.id, "00000000-0000-0000-0000-000000000002");
        assert_eq!(definition.kind, RoleDefinitionType::BuiltIn);
        assert_eq!(definition.data_actions.len(), 2);
    }
}
