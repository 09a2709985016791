//! `cooplink light` -- switch a coop light.

use cooplink_core::Command;

use crate::cli::{GlobalOpts, LightArgs, LightCommand};
use crate::error::CliError;

use super::{confirm, resolve_device, App};

pub async fn run(args: LightArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    let record = resolve_device(app, &args.device)?;
    if !record.has_light() {
        return Err(CliError::MissingSubsystem {
            device: record.name.clone(),
            subsystem: "light".into(),
        });
    }
    let device_id = record.device_id.clone();

    match args.command {
        LightCommand::On => {
            app.dispatcher.dispatch(Command::LightOn { device_id }).await?;
            confirm(global, &format!("light on at {}", record.name));
        }
        LightCommand::Off => {
            app.dispatcher.dispatch(Command::LightOff { device_id }).await?;
            confirm(global, &format!("light off at {}", record.name));
        }
    }
    Ok(())
}
