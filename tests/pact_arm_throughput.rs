//! Pact contract tests for the container throughput API
//!
//! Covers reading dedicated throughput, the shared/serverless 404 and updating the
//! autoscale maximum.

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
use cosmos_mgmt::error::WorkflowError;
use cosmos_mgmt::model::ThroughputSetting;
use cosmos_mgmt::provider::ControlPlane;
use cosmos_mgmt::workflow::adjust_throughput;
use pact_consumer::prelude::*;
use serde_json::json;

const THROUGHPUT_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.DocumentDB/databaseAccounts/acct1/sqlDatabases/db1/containers/c1/throughputSettings/default";

#[tokio::test]
async fn test_read_autoscale_throughput_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("read container throughput under autoscale", "", |mut i| {
        i.given("container c1 has dedicated autoscale throughput of 2000 RU/s");
        i.request
            .method("GET")
            .path(THROUGHPUT_PATH)
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2024-11-15");
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": THROUGHPUT_PATH,
                "name": "default",
                "properties": {
                    "resource": {
                        "throughput": 200,
                        "autoscaleSettings": { "maxThroughput": 2000 },
                        "minimumThroughput": "1000"
                    }
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    let settings = client
        .get_container_throughput(&path)
        .await
        .expect("Failed to read throughput");

    assert_eq!(settings.autoscale_max_throughput, Some(2000));
    // The scaled value is not a manual setting
    assert_eq!(settings.manual_throughput, None);
    assert_eq!(settings.minimum_throughput, Some(1000));
}

#[tokio::test]
async fn test_update_autoscale_throughput_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("raise the container autoscale maximum", "", |mut i| {
        i.given("container c1 has dedicated autoscale throughput of 2000 RU/s");
        i.request
            .method("PUT")
            .path(THROUGHPUT_PATH)
            .header("authorization", "Bearer test-token")
            .header("content-type", "application/json")
            .query_param("api-version", "2024-11-15")
            .json_body(json!({
                "location": "West US 3",
                "properties": {
                    "resource": {
                        "autoscaleSettings": { "maxThroughput": 3000 }
                    }
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": THROUGHPUT_PATH,
                "name": "default",
                "properties": {
                    "resource": {
                        "throughput": 300,
                        "autoscaleSettings": { "maxThroughput": 3000 }
                    }
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    let settings = client
        .update_container_throughput(
            &path,
            "West US 3",
            ThroughputSetting::Autoscale {
                max_throughput: 3000,
            },
        )
        .await
        .expect("Failed to update throughput");

    assert_eq!(settings.autoscale_max_throughput, Some(3000));
}

#[tokio::test]
async fn test_update_manual_throughput_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("set manual container throughput", "", |mut i| {
        i.given("container c1 has dedicated manual throughput");
        i.request
            .method("PUT")
            .path(THROUGHPUT_PATH)
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2024-11-15")
            .json_body(json!({
                "location": "West US 3",
                "properties": {
                    "resource": { "throughput": 500 }
                }
            }));
        i.response
            .status(200)
            .header("content-type", "application/json")
            .json_body(json!({
                "properties": {
                    "resource": { "throughput": 500, "minimumThroughput": "400" }
                }
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    let settings = client
        .update_container_throughput(&path, "West US 3", ThroughputSetting::Manual { throughput: 500 })
        .await
        .expect("Failed to update throughput");

    assert_eq!(settings.manual_throughput, Some(500));
    assert_eq!(settings.autoscale_max_throughput, None);
}

#[tokio::test]
async fn test_shared_throughput_contract() {
    init();
    let mut pact_builder = PactBuilder::new("cosmos-mgmt", "Azure-Resource-Manager");

    pact_builder.interaction("read throughput of a container without dedicated throughput", "", |mut i| {
        i.given("container c1 uses shared database throughput");
        i.request
            .method("GET")
            .path(THROUGHPUT_PATH)
            .header("authorization", "Bearer test-token")
            .query_param("api-version", "2024-11-15");
        i.response
            .status(404)
            .header("content-type", "application/json")
            .json_body(json!({
                "code": "NotFound",
                "message": "Throughput settings not found for this container."
            }));
        i
    });

    let mock_server = pact_builder.start_mock_server(None, None);
    let client = arm_client(&mock_base_url(mock_server.url()));

    let path = ResourcePath::from_configuration(&test_configuration());
    let err = adjust_throughput(&client, &path, "West US 3", 1000, 1000)
        .await
        .expect_err("no dedicated throughput");

    assert!(
        matches!(err, WorkflowError::NoDedicatedThroughput { .. }),
        "unexpected error: {err:?}"
    );
}
