// ── Device configuration types ──
//
// These structs serve two roles: the normalized read model of a
// device's settable configuration, and the PATCH bodies sent back to
// the API. Every field is optional and omitted when unset, so a patch
// touches only the fields it carries.

use serde::Serialize;
use strum::{Display, EnumString};

use super::timeofday::TimeOfDay;

/// Fan operating mode.
///
/// The API historically used `thermostatic` for temperature mode;
/// parsing accepts it as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FanMode {
    Manual,
    Time,
    #[strum(serialize = "temperature", serialize = "thermostatic")]
    Temperature,
}

/// Door open/close trigger mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DoorMode {
    Time,
    Light,
    Manual,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_mode: Option<DoorMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_mode: Option<DoorMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_time: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_light_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_light_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_delay: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LightConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_before_close: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_on_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipped: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FanMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_speed: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on1: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_off1: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_speed1: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on2: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_off2: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_speed2: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on3: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_off3: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_speed3: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_on4: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_off4: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_speed4: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_on: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_off: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_speed: Option<i64>,
}

impl FanConfig {
    /// On/off times for schedule slot `n` (1-4).
    pub fn slot_times(&self, n: u8) -> (Option<TimeOfDay>, Option<TimeOfDay>) {
        match n {
            1 => (self.time_on1, self.time_off1),
            2 => (self.time_on2, self.time_off2),
            3 => (self.time_on3, self.time_off3),
            4 => (self.time_on4, self.time_off4),
            _ => (None, None),
        }
    }

    /// Write slot `n`'s fields. Out-of-range slots are a no-op; callers
    /// validate the slot number before building a patch.
    pub fn set_slot(
        &mut self,
        n: u8,
        on: Option<TimeOfDay>,
        off: Option<TimeOfDay>,
        speed: Option<i64>,
    ) {
        match n {
            1 => {
                self.time_on1 = on;
                self.time_off1 = off;
                self.time_speed1 = speed;
            }
            2 => {
                self.time_on2 = on;
                self.time_off2 = off;
                self.time_speed2 = speed;
            }
            3 => {
                self.time_on3 = on;
                self.time_off3 = off;
                self.time_speed3 = speed;
            }
            4 => {
                self.time_on4 = on;
                self.time_off4 = off;
                self.time_speed4 = speed;
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wifi_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bluetooth_state: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overnight_sleep_enable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overnight_sleep_start: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overnight_sleep_end: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_freq: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_update_period: Option<i64>,
}

/// A device's settable configuration, one block per subsystem.
///
/// Also the shape of a configuration patch: a patch carries only the
/// subsystems and fields being changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeviceConfiguration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub door: Option<DoorConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<LightConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan: Option<FanConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<ConnectivityConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub general: Option<GeneralConfig>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fan_mode_accepts_thermostatic_alias() {
        assert_eq!("thermostatic".parse::<FanMode>(), Ok(FanMode::Temperature));
        assert_eq!("Temperature".parse::<FanMode>(), Ok(FanMode::Temperature));
        assert_eq!("manual".parse::<FanMode>(), Ok(FanMode::Manual));
        assert!("turbo".parse::<FanMode>().is_err());
    }

    #[test]
    fn patch_serializes_only_touched_fields() {
        let patch = DeviceConfiguration {
            fan: Some(FanConfig {
                mode: Some(FanMode::Manual),
                manual_speed: Some(80),
                ..FanConfig::default()
            }),
            ..DeviceConfiguration::default()
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fan": {"mode": "manual", "manualSpeed": 80}})
        );
    }

    #[test]
    fn time_fields_render_as_strings() {
        let mut fan = FanConfig::default();
        fan.set_slot(
            2,
            Some(TimeOfDay::new(6, 30).unwrap()),
            Some(TimeOfDay::UNSET),
            Some(60),
        );

        let json = serde_json::to_value(&fan).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timeOn2": "06:30", "timeOff2": "00:00", "timeSpeed2": 60})
        );
    }
}
