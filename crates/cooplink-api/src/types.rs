// Wire types for the Omlet cloud API.
//
// Every field is optional and defaulted: the upstream payloads vary by
// device generation and firmware, and unknown fields must be dropped
// silently. These are raw envelopes -- `cooplink-core` normalizes them
// into the domain model and enforces validation there.

use serde::{Deserialize, Serialize};

/// `GET /whoami` response (credential validation).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

/// One element of the `GET /device` array.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEnvelope {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub device_serial: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub device_type: Option<String>,
    #[serde(default)]
    pub device_type_id: Option<i64>,
    #[serde(default)]
    pub delete_pending: Option<bool>,
    #[serde(default)]
    pub overdue_connection: Option<bool>,
    #[serde(default)]
    pub state: Option<StateEnvelope>,
    #[serde(default)]
    pub configuration: Option<ConfigurationEnvelope>,
    #[serde(default)]
    pub actions: Option<Vec<ActionEnvelope>>,
}

/// Per-subsystem reported state. A subsystem key absent from the payload
/// means the device does not have that subsystem.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateEnvelope {
    #[serde(default)]
    pub general: Option<GeneralStateEnvelope>,
    #[serde(default)]
    pub connectivity: Option<ConnectivityStateEnvelope>,
    #[serde(default)]
    pub door: Option<DoorStateEnvelope>,
    #[serde(default)]
    pub light: Option<LightStateEnvelope>,
    #[serde(default)]
    pub fan: Option<FanStateEnvelope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralStateEnvelope {
    #[serde(default)]
    pub firmware_version_current: Option<String>,
    #[serde(default)]
    pub battery_level: Option<i64>,
    #[serde(default)]
    pub power_source: Option<String>,
    #[serde(default)]
    pub uptime: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityStateEnvelope {
    #[serde(default)]
    pub wifi_strength: Option<i64>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub connected: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorStateEnvelope {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_open_time: Option<String>,
    #[serde(default)]
    pub last_close_time: Option<String>,
    #[serde(default)]
    pub fault: Option<String>,
    #[serde(default)]
    pub light_level: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LightStateEnvelope {
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FanStateEnvelope {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
}

/// Per-subsystem settable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigurationEnvelope {
    #[serde(default)]
    pub door: Option<DoorConfigEnvelope>,
    #[serde(default)]
    pub light: Option<LightConfigEnvelope>,
    #[serde(default)]
    pub fan: Option<FanConfigEnvelope>,
    #[serde(default)]
    pub connectivity: Option<ConnectivityConfigEnvelope>,
    #[serde(default)]
    pub general: Option<GeneralConfigEnvelope>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorConfigEnvelope {
    #[serde(default)]
    pub open_mode: Option<String>,
    #[serde(default)]
    pub close_mode: Option<String>,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub close_time: Option<String>,
    #[serde(default)]
    pub open_light_level: Option<i64>,
    #[serde(default)]
    pub close_light_level: Option<i64>,
    #[serde(default)]
    pub open_delay: Option<i64>,
    #[serde(default)]
    pub close_delay: Option<i64>,
    #[serde(default)]
    pub door_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightConfigEnvelope {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub minutes_before_close: Option<i64>,
    #[serde(default)]
    pub max_on_time: Option<i64>,
    #[serde(default)]
    pub equipped: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanConfigEnvelope {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub manual_speed: Option<i64>,
    #[serde(default)]
    pub time_on1: Option<String>,
    #[serde(default)]
    pub time_off1: Option<String>,
    #[serde(default)]
    pub time_speed1: Option<i64>,
    #[serde(default)]
    pub time_on2: Option<String>,
    #[serde(default)]
    pub time_off2: Option<String>,
    #[serde(default)]
    pub time_speed2: Option<i64>,
    #[serde(default)]
    pub time_on3: Option<String>,
    #[serde(default)]
    pub time_off3: Option<String>,
    #[serde(default)]
    pub time_speed3: Option<i64>,
    #[serde(default)]
    pub time_on4: Option<String>,
    #[serde(default)]
    pub time_off4: Option<String>,
    #[serde(default)]
    pub time_speed4: Option<i64>,
    #[serde(default)]
    pub temp_on: Option<i64>,
    #[serde(default)]
    pub temp_off: Option<i64>,
    #[serde(default)]
    pub temp_speed: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityConfigEnvelope {
    #[serde(default)]
    pub wifi_state: Option<String>,
    #[serde(default)]
    pub bluetooth_state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfigEnvelope {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub update_frequency: Option<i64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub overnight_sleep_enable: Option<bool>,
    #[serde(default)]
    pub overnight_sleep_start: Option<String>,
    #[serde(default)]
    pub overnight_sleep_end: Option<String>,
    #[serde(default)]
    pub poll_freq: Option<i64>,
    #[serde(default)]
    pub status_update_period: Option<i64>,
}

/// One entry of a device's currently-advertised action list.
///
/// Transient by contract: availability can change between polls, so
/// consumers must re-resolve actions from the current snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionEnvelope {
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub action_value: Option<String>,
    #[serde(default)]
    pub pending_value: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
