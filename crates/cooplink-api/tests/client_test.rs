// Integration tests for CoopClient against a mock Omlet API.

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cooplink_api::{CoopClient, Error, TransportConfig};

fn client_for(server: &MockServer) -> CoopClient {
    CoopClient::from_api_key(
        &server.uri(),
        &SecretString::from("test-key"),
        &TransportConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn whoami_sends_bearer_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/whoami"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 42,
            "fullName": "Coop Keeper",
            "emailAddress": "keeper@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let who = client_for(&server).whoami().await.unwrap();
    assert_eq!(who.id, Some(42));
    assert_eq!(who.full_name.as_deref(), Some("Coop Keeper"));
}

#[tokio::test]
async fn list_devices_parses_nested_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "deviceId": "dev-1",
            "deviceSerial": "SN123",
            "name": "Main Coop",
            "deviceType": "Autodoor",
            "state": {
                "door": { "state": "closed", "lightLevel": 12 },
                "general": { "batteryLevel": 80, "powerSource": "internal" }
            },
            "configuration": {
                "door": { "openMode": "light", "openLightLevel": 10 }
            },
            "actions": [{
                "actionName": "open",
                "description": "Open the door",
                "actionValue": "open",
                "url": "/device/dev-1/action/open"
            }],
            "unknownFutureField": { "nested": true }
        }])))
        .mount(&server)
        .await;

    let devices = client_for(&server).list_devices().await.unwrap();
    assert_eq!(devices.len(), 1);

    let dev = &devices[0];
    assert_eq!(dev.device_id.as_deref(), Some("dev-1"));
    let state = dev.state.as_ref().unwrap();
    assert_eq!(state.door.as_ref().unwrap().state.as_deref(), Some("closed"));
    assert!(state.fan.is_none());
    assert_eq!(
        dev.actions.as_ref().unwrap()[0].url.as_deref(),
        Some("/device/dev-1/action/open")
    );
}

#[tokio::test]
async fn execute_action_strips_leading_slash() {
    let server = MockServer::start().await;

    // The API advertises absolute-looking paths; they must land under /api/v1/.
    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/open"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let out = client_for(&server)
        .execute_action("/device/dev-1/action/open")
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn get_configuration_parses_subsystem_blocks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "fan": { "mode": "time", "timeOn1": "06:00", "timeOff1": "08:00" },
            "general": { "pollFreq": 300 }
        })))
        .mount(&server)
        .await;

    let cfg = client_for(&server).get_configuration("dev-1").await.unwrap();
    assert_eq!(cfg.fan.as_ref().unwrap().mode.as_deref(), Some("time"));
    assert_eq!(cfg.general.as_ref().unwrap().poll_freq, Some(300));
    assert!(cfg.door.is_none());
}

#[tokio::test]
async fn patch_configuration_returns_body_when_present() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fan": {"mode": "manual"}})))
        .mount(&server)
        .await;

    let out = client_for(&server)
        .patch_configuration("dev-1", &json!({"fan": {"mode": "manual"}}))
        .await
        .unwrap();
    assert_eq!(out.unwrap()["fan"]["mode"], "manual");
}

#[tokio::test]
async fn patch_configuration_empty_body_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let out = client_for(&server)
        .patch_configuration("dev-1", &json!({}))
        .await
        .unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/whoami"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server).whoami().await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn api_error_carries_upstream_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "invalid request"})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).list_devices().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "invalid request");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client_for(&server).list_devices().await.unwrap_err();
    assert!(err.is_transient());
}

#[tokio::test]
async fn base_url_with_api_v1_suffix_is_not_doubled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/whoami"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = CoopClient::from_api_key(
        &format!("{}/api/v1", server.uri()),
        &SecretString::from("test-key"),
        &TransportConfig::default(),
    )
    .unwrap();

    assert_eq!(client.whoami().await.unwrap().id, Some(1));
}
