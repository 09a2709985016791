//! `cooplink door` -- open, close, and schedule an automatic door.

use cooplink_core::{Command, DoorTrigger, TimeOfDay};

use crate::cli::{DoorArgs, DoorCommand, GlobalOpts};
use crate::error::CliError;

use super::{confirm, resolve_device, App};

pub async fn run(args: DoorArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    let record = resolve_device(app, &args.device)?;
    if !record.has_door() {
        return Err(CliError::MissingSubsystem {
            device: record.name.clone(),
            subsystem: "door".into(),
        });
    }
    let device_id = record.device_id.clone();

    match args.command {
        DoorCommand::Open => {
            app.dispatcher.dispatch(Command::OpenDoor { device_id }).await?;
            confirm(global, &format!("opening door on {}", record.name));
        }
        DoorCommand::Close => {
            app.dispatcher.dispatch(Command::CloseDoor { device_id }).await?;
            confirm(global, &format!("closing door on {}", record.name));
        }
        DoorCommand::Schedule {
            open_at,
            open_light,
            open_manual,
            close_at,
            close_light,
            close_manual,
        } => {
            let open = trigger(open_at, open_light, open_manual);
            let close = trigger(close_at, close_light, close_manual);
            if open.is_none() && close.is_none() {
                return Err(CliError::usage(
                    "schedule needs at least one trigger, e.g. --open-light 8 or --close-at 21:30",
                ));
            }
            app.dispatcher
                .dispatch(Command::SetDoorSchedule {
                    device_id,
                    open,
                    close,
                })
                .await?;
            confirm(global, &format!("door schedule updated on {}", record.name));
        }
    }
    Ok(())
}

/// Collapse one side's flags into a trigger. Clap's arg groups already
/// guarantee at most one is set.
fn trigger(at: Option<TimeOfDay>, light: Option<i64>, manual: bool) -> Option<DoorTrigger> {
    if let Some(time) = at {
        Some(DoorTrigger::Time(time))
    } else if let Some(level) = light {
        Some(DoorTrigger::Light { level })
    } else if manual {
        Some(DoorTrigger::Manual)
    } else {
        None
    }
}
