//! `cooplink fan` -- fan power, mode, speed, and schedule slots.

use serde::Serialize;
use tabled::Tabled;

use cooplink_core::visibility::{configured_slots, slot_is_configured};
use cooplink_core::{Command, FanConfig, SlotUpdate};

use crate::cli::{FanArgs, FanCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::render_list;

use super::{confirm, resolve_device, App};

pub async fn run(args: FanArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    let record = resolve_device(app, &args.device)?;
    if !record.has_fan() {
        return Err(CliError::MissingSubsystem {
            device: record.name.clone(),
            subsystem: "fan".into(),
        });
    }
    let device_id = record.device_id.clone();
    let name = record.name.clone();

    match args.command {
        FanCommand::On => {
            app.dispatcher.dispatch(Command::FanOn { device_id }).await?;
            confirm(global, &format!("fan on at {name}"));
        }
        FanCommand::Off => {
            app.dispatcher.dispatch(Command::FanOff { device_id }).await?;
            confirm(global, &format!("fan off at {name}"));
        }
        FanCommand::Boost => {
            app.dispatcher.dispatch(Command::FanBoost { device_id }).await?;
            confirm(global, &format!("fan boost at {name}"));
        }
        FanCommand::Mode { mode } => {
            app.dispatcher
                .dispatch(Command::SetFanMode { device_id, mode })
                .await?;
            confirm(global, &format!("fan mode set to {mode} at {name}"));
        }
        FanCommand::Speed { speed } => {
            app.dispatcher
                .dispatch(Command::SetFanManualSpeed { device_id, speed })
                .await?;
            confirm(
                global,
                &format!("fan speed set to {speed} ({}%) at {name}", speed.percent()),
            );
        }
        FanCommand::Slot {
            slot,
            on,
            off,
            speed,
            time_mode,
        } => {
            app.dispatcher
                .dispatch(Command::SetFanTimeSlot {
                    device_id,
                    update: SlotUpdate {
                        slot,
                        on,
                        off,
                        speed,
                    },
                    set_time_mode: time_mode,
                })
                .await?;
            confirm(global, &format!("slot {slot} set to {on}-{off} at {name}"));
        }
        FanCommand::ClearSlot { slot } => {
            app.dispatcher
                .dispatch(Command::ClearFanTimeSlot { device_id, slot })
                .await?;
            confirm(global, &format!("slot {slot} cleared at {name}"));
        }
        FanCommand::Slots => {
            let fan = record.configuration.fan.clone().unwrap_or_default();
            print_slots(&fan, global)?;
        }
        FanCommand::Thermostat { on, off, speed } => {
            app.dispatcher
                .dispatch(Command::SetFanThermostat {
                    device_id,
                    temp_on: on,
                    temp_off: off,
                    speed,
                })
                .await?;
            confirm(
                global,
                &format!("thermostat set to on at {on}°, off at {off}° at {name}"),
            );
        }
    }
    Ok(())
}

#[derive(Tabled, Serialize)]
struct SlotRow {
    #[tabled(rename = "SLOT")]
    slot: u8,
    #[tabled(rename = "ON")]
    on: String,
    #[tabled(rename = "OFF")]
    off: String,
    #[tabled(rename = "SPEED")]
    speed: String,
    #[tabled(rename = "STATUS")]
    status: &'static str,
}

fn print_slots(fan: &FanConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let speeds = [
        fan.time_speed1,
        fan.time_speed2,
        fan.time_speed3,
        fan.time_speed4,
    ];
    let rows: Vec<SlotRow> = configured_slots(fan)
        .into_iter()
        .map(|slot| {
            let (on, off) = fan.slot_times(slot);
            SlotRow {
                slot,
                on: on.map_or_else(|| "-".into(), |t| t.to_string()),
                off: off.map_or_else(|| "-".into(), |t| t.to_string()),
                speed: speeds[usize::from(slot) - 1]
                    .map_or_else(|| "-".into(), |s| format!("{s}%")),
                status: if slot_is_configured(fan, slot) {
                    "configured"
                } else {
                    "empty"
                },
            }
        })
        .collect();
    println!("{}", render_list(&rows, global.output)?);
    Ok(())
}
