//! Pact contract tests for the Cosmos DB account and subscription APIs
//!
//! These tests define the contract between cosmos-mgmt and Azure Resource Manager.
//! Each test drives the real `ArmClient` against a Pact mock server.

#[cfg(test)]
mod common;

use common::{arm_client, init_rustls, mock_base_url, test_configuration};
use std::sync::Once;

static RUSTLS_INIT: Once = Once::new();

/// Initialize rustls before tests
fn init() {
    RUSTLS_INIT.call_once(|| {
        init_rustls();
    });
}

use cosmos_mgmt::arm::ResourcePath;
use cosmos_mgmt::provider::ControlPlane;
use cosmos_mgmt::workflow::desired_account;
use pact_consumer::prelude::*;
use serde_json::json;

const ACCOUNT_PATH: &str =
    "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1";

#[tokio::test]
async fn test_create_account_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("create or update a Cosmos DB account", "", |mut i| {
        i.given("resource group rg1 exists");
        i.request
            .method("PUT")
            .path(ACCOUNT_PATH)
            .header("authorization", "Bearer test-token")
            .header("content-type", "application/json")
            .query_param("api-version", "2024-11-15")
            .json_body(json!({
                "location": "West US 3",
                "kind": "GlobalDocumentDB",
                "properties": {
                    "databaseAccountOfferType": "Standard",
                    "locations": [{
                        "locationName": "West US 3",
                        "failoverPriority": 0,
                        "isZoneRedundant": false
                    }],
                    "capabilities": [{ "name": "EnableNoSQLVectorSearch" }],
                    "disableLocalAuth": true,
                    "publicNetworkAccess": "Enabled"
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": ACCOUNT_PATH,
                "name": "acct1",
                "location": "West US 3",
                "kind": "GlobalDocumentDB",
                "properties": {
                    "provisioningState": "Succeeded",
                    "documentEndpoint": "https://acct1.documents.azure.com:443/"
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let config = test_configuration();
    let path = ResourcePath::from_configuration(&config);
    let account = client
        .create_or_update_account(&path, &desired_account(&config, None))
        .await
        .expect("Failed to create account");

    assert_eq!(account.id, ACCOUNT_PATH);
    assert_eq!(account.provisioning_state.as_deref(), Some("Succeeded"));
    assert_eq!(
        account.document_endpoint.as_deref(),
        Some("https://acct1.documents.azure.com:443/")
    );
}

#[tokio::test]
async fn test_create_account_with_owner_tag_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("create a Cosmos DB account tagged with its owner", "", |mut i| {
        i.given("resource group rg1 exists");
        i.request
            .method("PUT")
            .path(ACCOUNT_PATH)
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2024-11-15")
            .json_body(json!({
                "location": "West US 3",
                "kind": "GlobalDocumentDB",
                "tags": { "owner": "dev@contoso.com" },
                "properties": {
                    "databaseAccountOfferType": "Standard",
                    "locations": [{
                        "locationName": "West US 3",
                        "failoverPriority": 0,
                        "isZoneRedundant": false
                    }],
                    "capabilities": [{ "name": "EnableNoSQLVectorSearch" }],
                    "disableLocalAuth": true,
                    "publicNetworkAccess": "Enabled"
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": ACCOUNT_PATH,
                "name": "acct1",
                "tags": { "owner": "dev@contoso.com" },
                "properties": { "provisioningState": "Succeeded" }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let config = test_configuration();
    let path = ResourcePath::from_configuration(&config);
    let account = client
        .create_or_update_account(&path, &desired_account(&config, Some("dev@contoso.com")))
        .await
        .expect("Failed to create account");

    assert_eq!(account.name, "acct1");
}

#[tokio::test]
async fn test_get_subscription_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("read the target subscription", "", |mut i| {
        i.given("subscription sub1 is visible to the caller");
        i.request
            .method("GET")
            .path("/subscriptions/sub1")
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2022-12-01");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": "/subscriptions/sub1",
                "subscriptionId": "sub1",
                "displayName": "Contoso Dev",
                "state": "Enabled"
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let subscription = client
        .get_subscription("sub1")
        .await
        .expect("Failed to read subscription");

    assert_eq!(subscription.id, "sub1");
    assert_eq!(subscription.display_name.as_deref(), Some("Contoso Dev"));
    assert_eq!(subscription.state.as_deref(), Some("Enabled"));
}

#[tokio::test]
async fn test_missing_resource_group_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("read a resource group that does not exist", "", |mut i| {
        i.given("resource group rg1 does not exist");
        i.request
            .method("GET")
            .path("/subscriptions/sub1/resourceGroups/rg1")
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2021-04-01");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": "ResourceGroupNotFound",
                    "message": "Resource group 'rg1' could not be found."
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    let err = client
        .get_resource_group(&path)
        .await
        .expect_err("resource group should be missing");

    assert!(err.is_not_found());
    assert!(err.to_string().contains("could not be found"));
}

#[tokio::test]
async fn test_delete_missing_account_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("delete a Cosmos DB account that is already gone", "", |mut i| {
        i.given("account acct1 does not exist");
        i.request
            .method("DELETE")
            .path(ACCOUNT_PATH)
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2024-11-15");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({
                "error": {
                    "code": "ResourceNotFound",
                    "message": "The Resource 'Microsoft.DocumentDB/databaseAccounts/acct1' was not found."
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    client
        .delete_account(&path)
        .await
        .expect("Deleting a missing account should succeed");
}
