// ── Device domain types ──

use serde::Serialize;

use super::config::DeviceConfiguration;

/// Reported running state of a switchable unit (light or fan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum PowerState {
    On,
    Off,
    OnPending,
    OffPending,
    Boost,
    BoostPending,
    Unknown,
}

impl PowerState {
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            "onpending" => Self::OnPending,
            "offpending" => Self::OffPending,
            "boost" => Self::Boost,
            "boostpending" => Self::BoostPending,
            _ => Self::Unknown,
        }
    }

    /// True while the unit is on or transitioning. Used to decide
    /// whether a settings change needs an off/on cycle to take effect.
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            Self::On | Self::OnPending | Self::Boost | Self::BoostPending | Self::OffPending
        )
    }
}

/// Reported door position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DoorPosition {
    Open,
    Closed,
    OpenPending,
    ClosePending,
    Stopped,
    Unknown,
}

impl DoorPosition {
    pub fn from_wire(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "closed" => Self::Closed,
            "openpending" => Self::OpenPending,
            "closepending" => Self::ClosePending,
            "stopped" => Self::Stopped,
            _ => Self::Unknown,
        }
    }

    pub fn is_moving(&self) -> bool {
        matches!(self, Self::OpenPending | Self::ClosePending)
    }
}

// ── Per-subsystem reported state ─────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneralState {
    pub firmware_version: Option<String>,
    pub battery_level: Option<i64>,
    pub power_source: Option<String>,
    pub uptime_secs: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectivityState {
    pub wifi_strength: Option<i64>,
    pub ssid: Option<String>,
    pub connected: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoorState {
    pub position: DoorPosition,
    pub last_open_time: Option<String>,
    pub last_close_time: Option<String>,
    pub fault: Option<String>,
    pub light_level: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LightState {
    pub power: PowerState,
}

#[derive(Debug, Clone, Serialize)]
pub struct FanState {
    pub power: PowerState,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
}

/// Reported state, one block per subsystem the device physically has.
///
/// `None` means the subsystem does not exist on this device; it is
/// never used for "exists but currently unreadable".
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceState {
    pub general: Option<GeneralState>,
    pub connectivity: Option<ConnectivityState>,
    pub door: Option<DoorState>,
    pub light: Option<LightState>,
    pub fan: Option<FanState>,
}

// ── Actions ──────────────────────────────────────────────────────────

/// An action currently advertised by the device.
///
/// The advertised set changes between polls (a closed door advertises
/// `open`, not `close`), so entries are resolved fresh from the current
/// snapshot on every dispatch and never cached across passes.
#[derive(Debug, Clone, Serialize)]
pub struct ActionEntry {
    pub action_name: String,
    pub description: String,
    pub action_value: String,
    pub pending_value: Option<String>,
    pub url: Option<String>,
}

// ── The record itself ────────────────────────────────────────────────

/// One device, fully normalized. Stored behind `Arc` in the device map
/// and shared immutably between the engine and its consumers.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceRecord {
    pub device_id: String,
    pub device_serial: Option<String>,
    pub name: String,
    pub device_type: Option<String>,
    pub device_type_id: Option<i64>,
    pub delete_pending: bool,
    pub overdue_connection: bool,
    pub state: DeviceState,
    pub configuration: DeviceConfiguration,
    pub actions: Vec<ActionEntry>,
}

impl DeviceRecord {
    /// Case-insensitive lookup in the advertised action list, keyed on
    /// the wire value. The display name is free-form label text ("Open
    /// door") and never participates in matching.
    pub fn find_action(&self, value: &str) -> Option<&ActionEntry> {
        self.actions
            .iter()
            .find(|a| a.action_value.eq_ignore_ascii_case(value))
    }

    /// Whether the device currently has a door subsystem.
    pub fn has_door(&self) -> bool {
        self.state.door.is_some()
    }

    pub fn has_light(&self) -> bool {
        self.state.light.is_some()
    }

    pub fn has_fan(&self) -> bool {
        self.state.fan.is_some()
    }
}
