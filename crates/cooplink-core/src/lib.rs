// cooplink-core: Device model, sync engine, and command dispatch for
// Omlet smart-coop devices. Sits between cooplink-api and consumers.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod overrides;
pub mod store;
pub mod visibility;
pub mod webhook;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, DeviceAction, DoorTrigger, FanSpeed, OvernightPollMode, SlotUpdate};
pub use config::{
    CycleSetting, DispatchConfig, PollingInterval, WebhookConfig, DEFAULT_POLL_SECS,
    MAX_POLL_SECS, MIN_POLL_SECS,
};
pub use dispatch::Dispatcher;
pub use engine::SyncEngine;
pub use error::CoreError;
pub use overrides::{OverrideStore, OverrideUnit};
pub use store::DeviceStore;
pub use webhook::{WebhookOutcome, WebhookReceiver, WebhookRequest};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ActionEntry, DeviceConfiguration, DeviceIdentity, DeviceMap, DeviceRecord, DeviceState,
    DoorConfig, DoorMode, DoorPosition, DoorState, FanConfig, FanMode, FanState, GeneralConfig,
    LightConfig, LightState, PowerState, TimeOfDay,
};
