// ── Device model normalizer ──
//
// Converts raw wire envelopes into the typed domain model. Tolerant by
// contract: malformed elements are skipped with a warning, empty
// subsystem blocks collapse to "subsystem absent", and unknown string
// values map onto the Unknown variants. An empty batch is an error --
// the caller must not replace a populated map with nothing by accident.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use cooplink_api::types::{
    ActionEnvelope, ConfigurationEnvelope, ConnectivityConfigEnvelope, ConnectivityStateEnvelope,
    DeviceEnvelope, DoorConfigEnvelope, DoorStateEnvelope, FanConfigEnvelope, FanStateEnvelope,
    GeneralConfigEnvelope, GeneralStateEnvelope, LightConfigEnvelope, LightStateEnvelope,
    StateEnvelope,
};

use crate::error::CoreError;
use crate::model::{
    ActionEntry, ConnectivityConfig, ConnectivityState, DeviceConfiguration, DeviceMap,
    DeviceRecord, DeviceState, DoorConfig, DoorPosition, DoorState, FanConfig, FanState,
    GeneralConfig, GeneralState, LightConfig, LightState, PowerState, TimeOfDay,
};

/// Normalize a full device batch into the authoritative map shape.
///
/// Returns `CoreError::Validation` for an empty batch; individual bad
/// elements are skipped, never fatal.
pub fn normalize(batch: Vec<DeviceEnvelope>) -> Result<DeviceMap, CoreError> {
    if batch.is_empty() {
        return Err(CoreError::validation("device batch is empty"));
    }

    let mut map = HashMap::with_capacity(batch.len());
    for envelope in batch {
        let Some(record) = normalize_device(envelope) else {
            continue;
        };
        map.insert(record.device_id.clone(), Arc::new(record));
    }
    Ok(map)
}

/// Normalize one envelope; `None` if it cannot identify a device.
pub fn normalize_device(envelope: DeviceEnvelope) -> Option<DeviceRecord> {
    let device_id = match envelope.device_id {
        Some(id) if !id.trim().is_empty() => id,
        _ => {
            warn!(serial = ?envelope.device_serial, "skipping device without deviceId");
            return None;
        }
    };

    let name = envelope
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| device_id.clone());

    let state = envelope.state.map(normalize_state).unwrap_or_default();
    let configuration = envelope
        .configuration
        .map(normalize_configuration)
        .unwrap_or_default();

    let actions = envelope
        .actions
        .unwrap_or_default()
        .into_iter()
        .filter_map(normalize_action)
        .collect();

    Some(DeviceRecord {
        device_id,
        device_serial: envelope.device_serial,
        name,
        device_type: envelope.device_type,
        device_type_id: envelope.device_type_id,
        delete_pending: envelope.delete_pending.unwrap_or(false),
        overdue_connection: envelope.overdue_connection.unwrap_or(false),
        state,
        configuration,
        actions,
    })
}

/// An action is kept only when fully described; partial entries cannot
/// be dispatched and are dropped.
fn normalize_action(a: ActionEnvelope) -> Option<ActionEntry> {
    Some(ActionEntry {
        action_name: a.action_name?,
        description: a.description?,
        action_value: a.action_value?,
        pending_value: a.pending_value,
        url: a.url,
    })
}

// ── State ────────────────────────────────────────────────────────────

fn normalize_state(s: StateEnvelope) -> DeviceState {
    DeviceState {
        general: s.general.and_then(general_state),
        connectivity: s.connectivity.and_then(connectivity_state),
        door: s.door.and_then(door_state),
        light: s.light.and_then(light_state),
        fan: s.fan.and_then(fan_state),
    }
}

fn general_state(g: GeneralStateEnvelope) -> Option<GeneralState> {
    let out = GeneralState {
        firmware_version: g.firmware_version_current,
        battery_level: g.battery_level,
        power_source: g.power_source,
        uptime_secs: g.uptime,
    };
    (out.firmware_version.is_some()
        || out.battery_level.is_some()
        || out.power_source.is_some()
        || out.uptime_secs.is_some())
    .then_some(out)
}

fn connectivity_state(c: ConnectivityStateEnvelope) -> Option<ConnectivityState> {
    let out = ConnectivityState {
        wifi_strength: c.wifi_strength,
        ssid: c.ssid,
        connected: c.connected,
    };
    (out.wifi_strength.is_some() || out.ssid.is_some() || out.connected.is_some()).then_some(out)
}

fn door_state(d: DoorStateEnvelope) -> Option<DoorState> {
    let position = DoorPosition::from_wire(d.state.as_deref()?);
    Some(DoorState {
        position,
        last_open_time: d.last_open_time,
        last_close_time: d.last_close_time,
        fault: d.fault,
        light_level: d.light_level,
    })
}

fn light_state(l: LightStateEnvelope) -> Option<LightState> {
    Some(LightState {
        power: PowerState::from_wire(l.state.as_deref()?),
    })
}

fn fan_state(f: FanStateEnvelope) -> Option<FanState> {
    let power = PowerState::from_wire(f.state.as_deref()?);
    Some(FanState {
        power,
        temperature: f.temperature,
        humidity: f.humidity,
    })
}

// ── Configuration ────────────────────────────────────────────────────

fn normalize_configuration(c: ConfigurationEnvelope) -> DeviceConfiguration {
    DeviceConfiguration {
        door: c.door.and_then(door_config),
        light: c.light.and_then(light_config),
        fan: c.fan.and_then(fan_config),
        connectivity: c.connectivity.and_then(connectivity_config),
        general: c.general.and_then(general_config),
    }
}

fn time(s: Option<String>) -> Option<TimeOfDay> {
    s.as_deref().and_then(|s| s.parse().ok())
}

fn door_config(d: DoorConfigEnvelope) -> Option<DoorConfig> {
    let out = DoorConfig {
        open_mode: d.open_mode.as_deref().and_then(|m| m.parse().ok()),
        close_mode: d.close_mode.as_deref().and_then(|m| m.parse().ok()),
        open_time: time(d.open_time),
        close_time: time(d.close_time),
        open_light_level: d.open_light_level,
        close_light_level: d.close_light_level,
        open_delay: d.open_delay,
        close_delay: d.close_delay,
        door_type: d.door_type,
    };
    (out.open_mode.is_some()
        || out.close_mode.is_some()
        || out.open_time.is_some()
        || out.close_time.is_some()
        || out.open_light_level.is_some()
        || out.close_light_level.is_some()
        || out.open_delay.is_some()
        || out.close_delay.is_some()
        || out.door_type.is_some())
    .then_some(out)
}

fn light_config(l: LightConfigEnvelope) -> Option<LightConfig> {
    let out = LightConfig {
        mode: l.mode,
        minutes_before_close: l.minutes_before_close,
        max_on_time: l.max_on_time,
        equipped: l.equipped,
    };
    (out.mode.is_some()
        || out.minutes_before_close.is_some()
        || out.max_on_time.is_some()
        || out.equipped.is_some())
    .then_some(out)
}

fn fan_config(f: FanConfigEnvelope) -> Option<FanConfig> {
    let out = FanConfig {
        mode: f.mode.as_deref().and_then(|m| m.parse().ok()),
        manual_speed: f.manual_speed,
        time_on1: time(f.time_on1),
        time_off1: time(f.time_off1),
        time_speed1: f.time_speed1,
        time_on2: time(f.time_on2),
        time_off2: time(f.time_off2),
        time_speed2: f.time_speed2,
        time_on3: time(f.time_on3),
        time_off3: time(f.time_off3),
        time_speed3: f.time_speed3,
        time_on4: time(f.time_on4),
        time_off4: time(f.time_off4),
        time_speed4: f.time_speed4,
        temp_on: f.temp_on,
        temp_off: f.temp_off,
        temp_speed: f.temp_speed,
    };
    serde_json::to_value(&out)
        .map(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        .unwrap_or(false)
        .then_some(out)
}

fn connectivity_config(c: ConnectivityConfigEnvelope) -> Option<ConnectivityConfig> {
    let out = ConnectivityConfig {
        wifi_state: c.wifi_state,
        bluetooth_state: c.bluetooth_state,
    };
    (out.wifi_state.is_some() || out.bluetooth_state.is_some()).then_some(out)
}

fn general_config(g: GeneralConfigEnvelope) -> Option<GeneralConfig> {
    let out = GeneralConfig {
        datetime: g.datetime,
        timezone: g.timezone,
        update_frequency: g.update_frequency,
        language: g.language,
        overnight_sleep_enable: g.overnight_sleep_enable,
        overnight_sleep_start: time(g.overnight_sleep_start),
        overnight_sleep_end: time(g.overnight_sleep_end),
        poll_freq: g.poll_freq,
        status_update_period: g.status_update_period,
    };
    serde_json::to_value(&out)
        .map(|v| v.as_object().is_some_and(|o| !o.is_empty()))
        .unwrap_or(false)
        .then_some(out)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn envelope(id: Option<&str>) -> DeviceEnvelope {
        DeviceEnvelope {
            device_id: id.map(str::to_owned),
            name: Some("Coop".into()),
            ..DeviceEnvelope::default()
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(
            normalize(Vec::new()),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn devices_without_id_are_skipped() {
        let map = normalize(vec![
            envelope(None),
            envelope(Some("  ")),
            envelope(Some("dev-1")),
        ])
        .unwrap();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("dev-1"));
    }

    #[test]
    fn missing_name_falls_back_to_id() {
        let mut e = envelope(Some("dev-9"));
        e.name = None;
        let record = normalize_device(e).unwrap();
        assert_eq!(record.name, "dev-9");
    }

    #[test]
    fn empty_subsystem_blocks_collapse_to_absent() {
        let mut e = envelope(Some("dev-1"));
        e.state = Some(StateEnvelope {
            general: Some(GeneralStateEnvelope::default()),
            door: Some(DoorStateEnvelope {
                state: Some("closed".into()),
                ..DoorStateEnvelope::default()
            }),
            ..StateEnvelope::default()
        });

        let record = normalize_device(e).unwrap();
        assert!(record.state.general.is_none());
        assert!(record.state.fan.is_none());
        assert_eq!(
            record.state.door.unwrap().position,
            DoorPosition::Closed
        );
    }

    #[test]
    fn partial_actions_are_dropped() {
        let mut e = envelope(Some("dev-1"));
        e.actions = Some(vec![
            ActionEnvelope {
                action_name: Some("open".into()),
                description: Some("Open the door".into()),
                action_value: Some("open".into()),
                ..ActionEnvelope::default()
            },
            ActionEnvelope {
                action_name: Some("close".into()),
                // no description / value
                ..ActionEnvelope::default()
            },
        ]);

        let record = normalize_device(e).unwrap();
        assert_eq!(record.actions.len(), 1);
        assert_eq!(record.actions[0].action_name, "open");
    }

    #[test]
    fn unknown_states_map_to_unknown_variant() {
        let mut e = envelope(Some("dev-1"));
        e.state = Some(StateEnvelope {
            fan: Some(FanStateEnvelope {
                state: Some("hovering".into()),
                temperature: Some(21.5),
                humidity: None,
            }),
            ..StateEnvelope::default()
        });

        let record = normalize_device(e).unwrap();
        assert_eq!(record.state.fan.unwrap().power, PowerState::Unknown);
    }

    #[test]
    fn malformed_times_become_none() {
        let mut e = envelope(Some("dev-1"));
        e.configuration = Some(ConfigurationEnvelope {
            fan: Some(FanConfigEnvelope {
                mode: Some("time".into()),
                time_on1: Some("6:30".into()),
                time_off1: Some("not a time".into()),
                ..FanConfigEnvelope::default()
            }),
            ..ConfigurationEnvelope::default()
        });

        let fan = normalize_device(e).unwrap().configuration.fan.unwrap();
        assert_eq!(fan.time_on1.unwrap().to_string(), "06:30");
        assert!(fan.time_off1.is_none());
    }
}
