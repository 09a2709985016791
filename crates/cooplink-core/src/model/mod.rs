// ── Domain model ──
//
// Typed representation of Omlet devices as the rest of the system sees
// them. Built exclusively by the normalizer; never deserialized from
// the wire directly.

pub mod config;
pub mod device;
pub mod identity;
pub mod timeofday;

pub use config::{
    ConnectivityConfig, DeviceConfiguration, DoorConfig, DoorMode, FanConfig, FanMode,
    GeneralConfig, LightConfig,
};
pub use device::{
    ActionEntry, ConnectivityState, DeviceRecord, DeviceState, DoorPosition, DoorState, FanState,
    GeneralState, LightState, PowerState,
};
pub use identity::DeviceIdentity;
pub use timeofday::TimeOfDay;

use std::collections::HashMap;
use std::sync::Arc;

/// The authoritative device map, keyed by `deviceId`.
pub type DeviceMap = HashMap<String, Arc<DeviceRecord>>;
