//! `cooplink sleep` -- overnight deep power saving.

use cooplink_core::Command;

use crate::cli::{GlobalOpts, SleepArgs};
use crate::error::CliError;

use super::{confirm, resolve_device, App};

pub async fn run(args: SleepArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    let record = resolve_device(app, &args.device)?;
    let device_id = record.device_id.clone();
    let enable = !args.disable;

    app.dispatcher
        .dispatch(Command::SetOvernightSleep {
            device_id,
            enable,
            start: args.start,
            end: args.end,
            poll_mode: args.poll_mode,
        })
        .await?;

    if enable {
        confirm(
            global,
            &format!(
                "overnight sleep enabled on {} ({} poll mode)",
                record.name, args.poll_mode
            ),
        );
    } else {
        confirm(global, &format!("overnight sleep disabled on {}", record.name));
    }
    Ok(())
}
