// Command dispatch against a mock cloud API.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cooplink_api::{CoopClient, TransportConfig};
use cooplink_core::{
    Command, CoreError, DispatchConfig, Dispatcher, FanSpeed, OverrideUnit, OvernightPollMode,
    SlotUpdate, SyncEngine, TimeOfDay,
};

fn test_dispatch_config() -> DispatchConfig {
    DispatchConfig {
        settle_delay: Duration::from_millis(10),
        followup_delays: vec![],
        ..DispatchConfig::default()
    }
}

async fn seeded(server: &MockServer, fan_state: &str) -> (SyncEngine, Dispatcher) {
    let body = json!([{
        "deviceId": "dev-1",
        "name": "Main Coop",
        "deviceType": "Autodoor",
        "state": {
            "door": { "state": "closed" },
            "light": { "state": "off" },
            "fan": { "state": fan_state }
        },
        "configuration": {
            "fan": { "mode": "manual", "manualSpeed": 60 },
            "door": { "openMode": "light", "openLightLevel": 10 }
        },
        "actions": [
            { "actionName": "Open door", "description": "Open", "actionValue": "open",
              "url": "/device/dev-1/action/open" },
            { "actionName": "Turn on", "description": "On", "actionValue": "on",
              "url": "/device/dev-1/action/on" },
            { "actionName": "Turn off", "description": "Off", "actionValue": "off",
              "url": "/device/dev-1/action/off" }
        ]
    }]);

    Mock::given(method("GET"))
        .and(path("/api/v1/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;

    let client = CoopClient::from_api_key(
        &server.uri(),
        &SecretString::from("test-key"),
        &TransportConfig::default(),
    )
    .unwrap();
    let engine = SyncEngine::new(client);
    engine.refresh().await.unwrap();

    let dispatcher = Dispatcher::new(engine.clone(), test_dispatch_config());
    (engine, dispatcher)
}

#[tokio::test]
async fn open_door_uses_advertised_action_url() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/open"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::OpenDoor {
            device_id: "dev-1".into(),
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn unadvertised_action_falls_back_to_conventional_path() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    // "close" is not in the advertised list.
    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/close"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::CloseDoor {
            device_id: "dev-1".into(),
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn unknown_device_is_rejected_without_transport() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = dispatcher
        .dispatch(Command::OpenDoor {
            device_id: "nope".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::DeviceNotFound { .. }));
    engine.shutdown().await;
}

#[tokio::test]
async fn light_on_records_optimistic_override() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/on"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::LightOn {
            device_id: "dev-1".into(),
        })
        .await
        .unwrap();

    assert_eq!(
        dispatcher.overrides().get("dev-1", OverrideUnit::Light),
        Some(true)
    );
    assert_eq!(dispatcher.overrides().get("dev-1", OverrideUnit::Fan), None);
    engine.shutdown().await;
}

#[tokio::test]
async fn manual_speed_patch_cycles_a_running_fan() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "on").await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .and(body_json(json!({"fan": {"mode": "manual", "manualSpeed": 100}})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/off"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/on"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::SetFanManualSpeed {
            device_id: "dev-1".into(),
            speed: FanSpeed::High,
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn failed_cycle_still_schedules_convergence_refresh() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "on").await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    // Off half of the cycle fails; the patch itself already landed.
    Mock::given(method("POST"))
        .and(path("/api/v1/device/dev-1/action/off"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let before = engine.store().last_refresh();
    dispatcher
        .dispatch(Command::SetFanManualSpeed {
            device_id: "dev-1".into(),
            speed: FanSpeed::High,
        })
        .await
        .unwrap();

    // The convergence refresh runs despite the failed cycle.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_ne!(engine.store().last_refresh(), before);
    engine.shutdown().await;
}

#[tokio::test]
async fn stopped_fan_is_not_cycled() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::SetFanManualSpeed {
            device_id: "dev-1".into(),
            speed: FanSpeed::Low,
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn conflicting_schedule_change_never_reaches_the_wire() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "on").await;

    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = dispatcher
        .dispatch(Command::SetFanSchedule {
            device_id: "dev-1".into(),
            updates: vec![SlotUpdate {
                slot: 2,
                on: TimeOfDay::new(6, 0).unwrap(),
                off: TimeOfDay::new(8, 0).unwrap(),
                speed: Some(FanSpeed::Low),
            }],
            clears: vec![2],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Dispatch { .. }));
    engine.shutdown().await;
}

#[tokio::test]
async fn clear_slot_writes_the_sentinel_pair() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .and(body_json(
            json!({"fan": {"timeOn3": "00:00", "timeOff3": "00:00"}}),
        ))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::ClearFanTimeSlot {
            device_id: "dev-1".into(),
            slot: 3,
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn overnight_sleep_defaults_fill_missing_times() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .and(body_json(json!({"general": {
            "overnightSleepEnable": true,
            "overnightSleepStart": "23:00",
            "overnightSleepEnd": "05:00",
            "pollFreq": 600
        }})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::SetOvernightSleep {
            device_id: "dev-1".into(),
            enable: true,
            start: None,
            end: None,
            poll_mode: OvernightPollMode::PowerSavings,
        })
        .await
        .unwrap();
    engine.shutdown().await;
}

#[tokio::test]
async fn door_schedule_is_read_modify_write() {
    let server = MockServer::start().await;
    let (engine, dispatcher) = seeded(&server, "off").await;

    // Existing light-mode open config must survive a close-side change.
    Mock::given(method("PATCH"))
        .and(path("/api/v1/device/dev-1/configuration"))
        .and(body_json(json!({"door": {
            "openMode": "light",
            "openLightLevel": 10,
            "closeMode": "time",
            "closeTime": "21:30"
        }})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    dispatcher
        .dispatch(Command::SetDoorSchedule {
            device_id: "dev-1".into(),
            open: None,
            close: Some(cooplink_core::DoorTrigger::Time(
                TimeOfDay::new(21, 30).unwrap(),
            )),
        })
        .await
        .unwrap();
    engine.shutdown().await;
}
