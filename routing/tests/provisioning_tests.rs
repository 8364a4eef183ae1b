
use std::sync::Arc;
use test_helpers::{FakeCatalog, memory_store};
use windfarm_routing::alias_map_builder::AliasMapBuilder;
use windfarm_routing::artifact_store::ArtifactStore;
use windfarm_routing::dispatch_schedule::Unthrottled;
use windfarm_routing::provisioning::{
    AliasMapProvisioner, ProvisioningRequest, RequestType, ResponseStatus, send_response,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(request_type: &str, response_url: &str) -> ProvisioningRequest {
    serde_json::from_value(serde_json::json!({
        "RequestType": request_type,
        "ResponseURL": response_url,
        "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/windfarm/guid",
        "RequestId": "request-1",
        "ResourceType": "Custom::AssetMap",
        "LogicalResourceId": "AssetMap",
        "ResourceProperties": {"ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:mapper"}
    }))
    .unwrap()
}

fn provisioner(catalog: FakeCatalog, store: Arc<ArtifactStore>) -> AliasMapProvisioner {
    AliasMapProvisioner::new(
        AliasMapBuilder::new(Arc::new(catalog), Arc::new(Unthrottled)),
        store,
        "turbine-model".to_owned(),
        "asset-map-bucketAssetMap".to_owned(),
    )
}

#[test]
fn test_parse_request() {
    let request = request("Update", "https://example.com/response");
    assert_eq!(request.request_type, RequestType::Update);
    assert_eq!(request.logical_resource_id, "AssetMap");
    assert_eq!(request.physical_resource_id, None);
}

#[tokio::test]
async fn test_create_publishes_map() {
    let store = memory_store();
    let provisioner = provisioner(FakeCatalog::generated(3, 2, 2, 0), store.clone());
    let response = provisioner
        .handle(&request("Create", "https://example.com/response"))
        .await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert_eq!(response.reason, None);
    assert_eq!(response.physical_resource_id, "asset-map-bucketAssetMap");
    assert_eq!(
        response.data.get("Url").map(String::as_str),
        Some("memory:///asset-maps/mapping.json")
    );
    assert_eq!(store.read_alias_map().await.unwrap().nb_entries(), 6);
}

#[tokio::test]
async fn test_delete_is_a_no_op() {
    let store = memory_store();
    let catalog = FakeCatalog::generated(3, 2, 2, 0).failing_on_asset("asset-0");
    let response = provisioner(catalog, store.clone())
        .handle(&request("Delete", "https://example.com/response"))
        .await;
    assert_eq!(response.status, ResponseStatus::Success);
    assert!(store.read_alias_map().await.is_err());
}

#[tokio::test]
async fn test_build_failure_is_reported() {
    let store = memory_store();
    let catalog = FakeCatalog::generated(3, 2, 2, 0).failing_on_asset("asset-2");
    let response = provisioner(catalog, store.clone())
        .handle(&request("Update", "https://example.com/response"))
        .await;
    assert_eq!(response.status, ResponseStatus::Failed);
    assert!(response.reason.unwrap().contains("asset asset-2 not found"));
    assert!(response.data.is_empty());
    assert!(store.read_alias_map().await.is_err());
}

#[tokio::test]
async fn test_send_response() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/cfn-response"))
        .and(body_json(serde_json::json!({
            "Status": "SUCCESS",
            "PhysicalResourceId": "asset-map-bucketAssetMap",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/windfarm/guid",
            "RequestId": "request-1",
            "LogicalResourceId": "AssetMap",
            "Data": {"Url": "memory:///asset-maps/mapping.json"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let response_url = format!("{}/cfn-response", server.uri());
    let store = memory_store();
    let provisioner = provisioner(FakeCatalog::generated(1, 1, 1, 0), store);
    let response = provisioner.handle(&request("Create", &response_url)).await;
    send_response(&reqwest::Client::new(), &response_url, &response)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_send_response_refused() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let response_url = format!("{}/expired", server.uri());
    let response = provisioner(FakeCatalog::generated(0, 1, 0, 0), memory_store())
        .handle(&request("Delete", &response_url))
        .await;
    assert!(
        send_response(&reqwest::Client::new(), &response_url, &response)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_unsupported_request_type() {
    let store = memory_store();
    let response = provisioner(FakeCatalog::generated(1, 1, 1, 0), store.clone())
        .handle(&request("Replace", "https://example.com/response"))
        .await;
    assert_eq!(response.status, ResponseStatus::Failed);
    assert_eq!(response.reason.as_deref(), Some("unsupported request type"));
    assert!(store.read_alias_map().await.is_err());
}
