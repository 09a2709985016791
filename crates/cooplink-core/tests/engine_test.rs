// Sync engine behavior against a mock cloud API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cooplink_api::{CoopClient, TransportConfig};
use cooplink_core::{CoreError, PollingInterval, SyncEngine};

fn engine_for(server: &MockServer) -> SyncEngine {
    let client = CoopClient::from_api_key(
        &server.uri(),
        &SecretString::from("test-key"),
        &TransportConfig::default(),
    )
    .unwrap();
    SyncEngine::new(client)
}

fn device_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "deviceId": id,
        "name": name,
        "deviceType": "Autodoor",
        "state": {
            "door": { "state": "closed" },
            "general": { "batteryLevel": 90, "firmwareVersionCurrent": "1.0.35" }
        },
        "actions": []
    })
}

#[tokio::test]
async fn refresh_replaces_snapshot_wholesale() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    let first = Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([device_json("a", "A"), device_json("b", "B")])),
        )
        .up_to_n_times(1)
        .mount_as_scoped(&server)
        .await;

    engine.refresh().await.unwrap();
    assert_eq!(engine.store().device_count(), 2);
    drop(first);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("c", "C")])))
        .mount(&server)
        .await;

    engine.refresh().await.unwrap();
    assert_eq!(engine.store().device_count(), 1);
    assert!(engine.store().device("a").is_none());
    assert!(engine.store().device("c").is_some());
}

#[tokio::test]
async fn failed_pass_preserves_last_known_good() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    let ok = Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .up_to_n_times(1)
        .mount_as_scoped(&server)
        .await;
    engine.refresh().await.unwrap();
    drop(ok);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = engine.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Api { .. }));
    assert_eq!(engine.store().device_count(), 1);
    assert!(engine.store().device("a").is_some());
}

#[tokio::test]
async fn empty_batch_does_not_wipe_the_map() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    let ok = Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .up_to_n_times(1)
        .mount_as_scoped(&server)
        .await;
    engine.refresh().await.unwrap();
    drop(ok);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = engine.refresh().await.unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));
    assert_eq!(engine.store().device_count(), 1);
}

#[tokio::test]
async fn concurrent_refreshes_coalesce_into_one_fetch() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([device_json("a", "A")]))
                .set_delay(Duration::from_millis(150)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (r1, r2) = tokio::join!(engine.refresh(), engine.refresh());
    r1.unwrap();
    r2.unwrap();
    assert_eq!(engine.store().device_count(), 1);
}

#[tokio::test]
async fn no_pass_runs_after_shutdown() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .expect(0)
        .mount(&server)
        .await;

    engine.set_polling_interval(PollingInterval::Every(60)).await;
    engine
        .schedule_followups(&[Duration::from_millis(50)])
        .await;
    engine.shutdown().await;

    assert!(matches!(engine.refresh().await, Err(CoreError::ShutDown)));
    // Give any leaked task a chance to fire before wiremock verifies.
    tokio::time::sleep(Duration::from_millis(120)).await;
}

#[tokio::test]
async fn followups_eventually_refresh() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .expect(2)
        .mount(&server)
        .await;

    engine
        .schedule_followups(&[Duration::from_millis(10), Duration::from_millis(30)])
        .await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(engine.store().device_count(), 1);
    assert!(engine.store().last_refresh().is_some());
    engine.shutdown().await;
}

#[tokio::test]
async fn disabled_polling_still_allows_on_demand_refresh() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .expect(1)
        .mount(&server)
        .await;

    engine.set_polling_interval(PollingInterval::Disabled).await;
    engine.refresh().await.unwrap();

    let identities = engine.store().identities();
    assert_eq!(identities.len(), 1);
    assert_eq!(identities[0].manufacturer, "Omlet");
    assert_eq!(identities[0].firmware_version.as_deref(), Some("1.0.35"));
    engine.shutdown().await;
}

#[tokio::test]
async fn finished_tasks_are_reaped_on_schedule() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .mount(&server)
        .await;

    for _ in 0..8 {
        engine.schedule_refresh().await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Scheduling another task drops every handle that already finished,
    // so the tracked set stays bounded in a long-running host.
    engine.schedule_refresh().await;
    assert!(engine.task_count().await <= 1);
    engine.shutdown().await;
}

#[tokio::test]
async fn store_subscribers_see_each_replacement() {
    let server = MockServer::start().await;
    let engine = engine_for(&server);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([device_json("a", "A")])))
        .mount(&server)
        .await;

    let mut rx = engine.store().subscribe();
    engine.refresh().await.unwrap();

    rx.changed().await.unwrap();
    assert_eq!(*rx.borrow(), 1);
}
