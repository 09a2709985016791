// ── Typed commands ──
//
// Everything a consumer can ask a device to do, as data. The
// dispatcher resolves each command against the current snapshot and
// turns it into action invocations or configuration patches.

use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::TimeOfDay;

/// A device action by its advertised name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceAction {
    Open,
    Close,
    On,
    Off,
    Boost,
}

impl DeviceAction {
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Close => "close",
            Self::On => "on",
            Self::Off => "off",
            Self::Boost => "boost",
        }
    }
}

/// Named fan speed. The API takes percentages; these are the three
/// levels the hardware actually distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn percent(&self) -> i64 {
        match self {
            Self::Low => 60,
            Self::Medium => 80,
            Self::High => 100,
        }
    }
}

/// Device poll frequency while overnight sleep is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum OvernightPollMode {
    Responsive,
    PowerSavings,
}

impl OvernightPollMode {
    pub fn poll_freq_secs(&self) -> i64 {
        match self {
            Self::Responsive => 120,
            Self::PowerSavings => 600,
        }
    }
}

/// What should trigger one side (open or close) of a door schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorTrigger {
    Time(TimeOfDay),
    Light { level: i64 },
    Manual,
}

/// One fan schedule slot being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotUpdate {
    pub slot: u8,
    pub on: TimeOfDay,
    pub off: TimeOfDay,
    pub speed: Option<FanSpeed>,
}

/// Everything the dispatcher can execute.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Door ─────────────────────────────────────────────────────────
    OpenDoor {
        device_id: String,
    },
    CloseDoor {
        device_id: String,
    },
    SetDoorSchedule {
        device_id: String,
        open: Option<DoorTrigger>,
        close: Option<DoorTrigger>,
    },

    // ── Light ────────────────────────────────────────────────────────
    LightOn {
        device_id: String,
    },
    LightOff {
        device_id: String,
    },

    // ── Fan ──────────────────────────────────────────────────────────
    FanOn {
        device_id: String,
    },
    FanOff {
        device_id: String,
    },
    FanBoost {
        device_id: String,
    },
    SetFanMode {
        device_id: String,
        mode: crate::model::FanMode,
    },
    SetFanManualSpeed {
        device_id: String,
        speed: FanSpeed,
    },
    SetFanTimeSlot {
        device_id: String,
        update: SlotUpdate,
        /// Also switch the fan into time mode in the same patch.
        set_time_mode: bool,
    },
    ClearFanTimeSlot {
        device_id: String,
        slot: u8,
    },
    /// Batch slot write, the shape a schedule editor produces.
    SetFanSchedule {
        device_id: String,
        updates: Vec<SlotUpdate>,
        clears: Vec<u8>,
    },
    SetFanThermostat {
        device_id: String,
        temp_on: i64,
        temp_off: i64,
        speed: FanSpeed,
    },

    // ── Power management ─────────────────────────────────────────────
    SetOvernightSleep {
        device_id: String,
        enable: bool,
        start: Option<TimeOfDay>,
        end: Option<TimeOfDay>,
        poll_mode: OvernightPollMode,
    },
}

pub const SLOT_RANGE: std::ops::RangeInclusive<u8> = 1..=4;

/// Reject slot numbers outside 1-4 before anything touches the wire.
pub fn validate_slot(slot: u8) -> Result<(), CoreError> {
    if SLOT_RANGE.contains(&slot) {
        Ok(())
    } else {
        Err(CoreError::dispatch(format!(
            "fan schedule slot must be 1-4, got {slot}"
        )))
    }
}
