// ── Command dispatch ──
//
// Routes typed commands to the cloud API: action invocations go to the
// action URL the device currently advertises, settings changes become
// partial configuration patches. After anything succeeds the engine is
// asked to re-sync immediately and again on a follow-up schedule, so
// the snapshot converges on what the hardware actually did.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::command::{validate_slot, Command, DeviceAction, DoorTrigger, SlotUpdate};
use crate::config::{CycleSetting, DispatchConfig};
use crate::engine::SyncEngine;
use crate::error::CoreError;
use crate::model::{
    DeviceConfiguration, DeviceRecord, DoorConfig, DoorMode, FanConfig, FanMode, GeneralConfig,
    TimeOfDay,
};
use crate::overrides::{OverrideStore, OverrideUnit};

/// Overnight sleep window used when the caller gives no times.
const DEFAULT_SLEEP_START: TimeOfDay = match TimeOfDay::new(23, 0) {
    Some(t) => t,
    None => TimeOfDay::UNSET,
};
const DEFAULT_SLEEP_END: TimeOfDay = match TimeOfDay::new(5, 0) {
    Some(t) => t,
    None => TimeOfDay::UNSET,
};

pub struct Dispatcher {
    engine: SyncEngine,
    config: DispatchConfig,
    overrides: Arc<OverrideStore>,
}

impl Dispatcher {
    pub fn new(engine: SyncEngine, config: DispatchConfig) -> Self {
        let overrides = Arc::new(OverrideStore::new(config.override_ttl));
        Self {
            engine,
            config,
            overrides,
        }
    }

    /// The optimistic overlay, for presentation reads.
    pub fn overrides(&self) -> &Arc<OverrideStore> {
        &self.overrides
    }

    /// Execute one command end to end.
    pub async fn dispatch(&self, cmd: Command) -> Result<(), CoreError> {
        match cmd {
            Command::OpenDoor { device_id } => {
                self.invoke(&device_id, DeviceAction::Open, None).await
            }
            Command::CloseDoor { device_id } => {
                self.invoke(&device_id, DeviceAction::Close, None).await
            }
            Command::LightOn { device_id } => {
                self.invoke(&device_id, DeviceAction::On, Some((OverrideUnit::Light, true)))
                    .await
            }
            Command::LightOff { device_id } => {
                self.invoke(&device_id, DeviceAction::Off, Some((OverrideUnit::Light, false)))
                    .await
            }
            Command::FanOn { device_id } => {
                self.invoke(&device_id, DeviceAction::On, Some((OverrideUnit::Fan, true)))
                    .await
            }
            Command::FanOff { device_id } => {
                self.invoke(&device_id, DeviceAction::Off, Some((OverrideUnit::Fan, false)))
                    .await
            }
            Command::FanBoost { device_id } => {
                self.invoke(&device_id, DeviceAction::Boost, Some((OverrideUnit::Fan, true)))
                    .await
            }

            Command::SetFanMode { device_id, mode } => {
                let fan = FanConfig {
                    mode: Some(mode),
                    ..FanConfig::default()
                };
                self.patch_fan(&device_id, fan, CycleSetting::FanMode).await
            }

            Command::SetFanManualSpeed { device_id, speed } => {
                let fan = FanConfig {
                    mode: Some(FanMode::Manual),
                    manual_speed: Some(speed.percent()),
                    ..FanConfig::default()
                };
                self.patch_fan(&device_id, fan, CycleSetting::FanManualSpeed)
                    .await
            }

            Command::SetFanTimeSlot {
                device_id,
                update,
                set_time_mode,
            } => {
                validate_slot(update.slot)?;
                let mut fan = FanConfig::default();
                apply_slot_update(&mut fan, &update);
                if set_time_mode {
                    fan.mode = Some(FanMode::Time);
                }
                self.patch_fan(&device_id, fan, CycleSetting::FanTimeSlot)
                    .await
            }

            Command::ClearFanTimeSlot { device_id, slot } => {
                validate_slot(slot)?;
                let mut fan = FanConfig::default();
                // Clearing writes the sentinel pair; speed is left alone.
                fan.set_slot(slot, Some(TimeOfDay::UNSET), Some(TimeOfDay::UNSET), None);
                self.patch_fan(&device_id, fan, CycleSetting::FanTimeSlot)
                    .await
            }

            Command::SetFanSchedule {
                device_id,
                updates,
                clears,
            } => {
                let fan = build_schedule_patch(&updates, &clears)?;
                self.patch_fan(&device_id, fan, CycleSetting::FanTimeSlot)
                    .await
            }

            Command::SetFanThermostat {
                device_id,
                temp_on,
                temp_off,
                speed,
            } => {
                let fan = FanConfig {
                    mode: Some(FanMode::Temperature),
                    temp_on: Some(temp_on),
                    temp_off: Some(temp_off),
                    temp_speed: Some(speed.percent()),
                    ..FanConfig::default()
                };
                self.patch_fan(&device_id, fan, CycleSetting::FanMode).await
            }

            Command::SetOvernightSleep {
                device_id,
                enable,
                start,
                end,
                poll_mode,
            } => {
                let general = GeneralConfig {
                    overnight_sleep_enable: Some(enable),
                    overnight_sleep_start: Some(start.unwrap_or(DEFAULT_SLEEP_START)),
                    overnight_sleep_end: Some(end.unwrap_or(DEFAULT_SLEEP_END)),
                    poll_freq: Some(poll_mode.poll_freq_secs()),
                    ..GeneralConfig::default()
                };
                let patch = DeviceConfiguration {
                    general: Some(general),
                    ..DeviceConfiguration::default()
                };
                self.send_patch(&device_id, &patch).await?;
                self.request_sync().await;
                Ok(())
            }

            Command::SetDoorSchedule {
                device_id,
                open,
                close,
            } => {
                let record = self.record(&device_id)?;
                let door = merge_door_schedule(&record, open, close);
                let patch = DeviceConfiguration {
                    door: Some(door),
                    ..DeviceConfiguration::default()
                };
                self.send_patch(&device_id, &patch).await?;
                self.request_sync().await;
                Ok(())
            }
        }
    }

    // ── Action invocation ────────────────────────────────────────────

    async fn invoke(
        &self,
        device_id: &str,
        action: DeviceAction,
        override_after: Option<(OverrideUnit, bool)>,
    ) -> Result<(), CoreError> {
        let record = self.record(device_id)?;
        let path = resolve_action_path(&record, action);

        debug!(device = device_id, %action, %path, "invoking device action");
        self.engine.client().execute_action(&path).await?;

        if let Some((unit, assumed_on)) = override_after {
            self.overrides.set(device_id, unit, assumed_on);
        }

        self.request_sync().await;
        Ok(())
    }

    // ── Configuration patches ────────────────────────────────────────

    /// Send a fan patch, cycling the fan off and back on when the
    /// touched setting family needs it and the fan is running.
    async fn patch_fan(
        &self,
        device_id: &str,
        fan: FanConfig,
        setting: CycleSetting,
    ) -> Result<(), CoreError> {
        let record = self.record(device_id)?;

        let patch = DeviceConfiguration {
            fan: Some(fan),
            ..DeviceConfiguration::default()
        };
        self.send_patch(device_id, &patch).await?;

        let running = record
            .state
            .fan
            .as_ref()
            .is_some_and(|f| f.power.is_running());

        if running && self.config.requires_cycle(setting) {
            debug!(device = device_id, "cycling fan to apply settings");
            if let Err(e) = self.cycle_fan(&record).await {
                warn!(device = device_id, error = %e, "fan cycle failed; waiting on refresh to reconcile");
            }
        }

        self.request_sync().await;
        Ok(())
    }

    /// Off, settle, back on. The patch has already been accepted when
    /// this runs, so a cycle failure is logged rather than surfaced and
    /// the caller refreshes regardless to catch whatever the hardware
    /// actually did.
    async fn cycle_fan(&self, record: &DeviceRecord) -> Result<(), CoreError> {
        let off = resolve_action_path(record, DeviceAction::Off);
        self.engine.client().execute_action(&off).await?;
        tokio::time::sleep(self.config.settle_delay).await;
        let on = resolve_action_path(record, DeviceAction::On);
        self.engine.client().execute_action(&on).await?;
        Ok(())
    }

    async fn send_patch(
        &self,
        device_id: &str,
        patch: &DeviceConfiguration,
    ) -> Result<(), CoreError> {
        let body = serde_json::to_value(patch).map_err(|e| CoreError::Validation {
            message: format!("unserializable patch: {e}"),
        })?;
        debug!(device = device_id, %body, "patching configuration");
        self.engine
            .client()
            .patch_configuration(device_id, &body)
            .await?;
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn record(&self, device_id: &str) -> Result<Arc<DeviceRecord>, CoreError> {
        self.engine
            .store()
            .device(device_id)
            .ok_or_else(|| CoreError::DeviceNotFound {
                device_id: device_id.to_owned(),
            })
    }

    async fn request_sync(&self) {
        self.engine.schedule_refresh().await;
        self.engine
            .schedule_followups(&self.config.followup_delays)
            .await;
    }
}

/// The URL to POST for an action: the advertised one when present,
/// otherwise the conventional `device/{id}/action/{value}` path.
fn resolve_action_path(record: &DeviceRecord, action: DeviceAction) -> String {
    record
        .find_action(action.wire_value())
        .and_then(|entry| entry.url.clone())
        .unwrap_or_else(|| {
            format!(
                "device/{}/action/{}",
                record.device_id,
                action.wire_value()
            )
        })
}

fn apply_slot_update(fan: &mut FanConfig, update: &SlotUpdate) {
    fan.set_slot(
        update.slot,
        Some(update.on),
        Some(update.off),
        update.speed.map(|s| s.percent()),
    );
}

/// Build one patch from a batch of slot writes and clears. A slot both
/// written and cleared is a contradiction; nothing is sent.
fn build_schedule_patch(updates: &[SlotUpdate], clears: &[u8]) -> Result<FanConfig, CoreError> {
    if updates.is_empty() && clears.is_empty() {
        return Err(CoreError::dispatch("empty fan schedule change"));
    }

    for update in updates {
        validate_slot(update.slot)?;
        if clears.contains(&update.slot) {
            return Err(CoreError::dispatch(format!(
                "slot {} is both populated and cleared in the same request",
                update.slot
            )));
        }
    }
    for &slot in clears {
        validate_slot(slot)?;
    }

    let mut fan = FanConfig::default();
    for update in updates {
        apply_slot_update(&mut fan, update);
    }
    for &slot in clears {
        fan.set_slot(slot, Some(TimeOfDay::UNSET), Some(TimeOfDay::UNSET), None);
    }
    Ok(fan)
}

/// Read-modify-write of the door schedule: untouched sides keep their
/// current values so the API does not zero them out.
fn merge_door_schedule(
    record: &DeviceRecord,
    open: Option<DoorTrigger>,
    close: Option<DoorTrigger>,
) -> DoorConfig {
    let mut door = record.configuration.door.clone().unwrap_or_default();

    if let Some(trigger) = open {
        match trigger {
            DoorTrigger::Time(t) => {
                door.open_mode = Some(DoorMode::Time);
                door.open_time = Some(t);
            }
            DoorTrigger::Light { level } => {
                door.open_mode = Some(DoorMode::Light);
                door.open_light_level = Some(level);
            }
            DoorTrigger::Manual => door.open_mode = Some(DoorMode::Manual),
        }
    }
    if let Some(trigger) = close {
        match trigger {
            DoorTrigger::Time(t) => {
                door.close_mode = Some(DoorMode::Time);
                door.close_time = Some(t);
            }
            DoorTrigger::Light { level } => {
                door.close_mode = Some(DoorMode::Light);
                door.close_light_level = Some(level);
            }
            DoorTrigger::Manual => door.close_mode = Some(DoorMode::Manual),
        }
    }

    door
}
