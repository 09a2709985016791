//! `cooplink watch` -- follow state changes at the terminal.

use chrono::Local;

use cooplink_core::PollingInterval;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;

use super::devices::{door_label, power_label};
use super::App;

pub async fn run(args: WatchArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;

    let polling = match args.interval {
        Some(0) => PollingInterval::Disabled,
        Some(secs) => PollingInterval::Every(secs),
        None => app.polling,
    };
    app.engine.set_polling_interval(polling).await;

    let mut updates = app.engine.store().subscribe();
    // Initial refresh already replaced the map once.
    updates.mark_unchanged();
    print_snapshot(app, global);
    if !global.quiet {
        eprintln!("watching for changes, press Ctrl-C to stop");
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                print_snapshot(app, global);
            }
        }
    }
    Ok(())
}

fn print_snapshot(app: &App, _global: &GlobalOpts) {
    let stamp = Local::now().format("%H:%M:%S");
    let snapshot = app.engine.store().snapshot();
    let mut records: Vec<_> = snapshot.values().collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));

    for record in records {
        let mut parts = Vec::new();
        if let Some(d) = &record.state.door {
            parts.push(format!("door={}", door_label(d.position)));
        }
        if let Some(l) = &record.state.light {
            parts.push(format!("light={}", power_label(l.power)));
        }
        if let Some(f) = &record.state.fan {
            parts.push(format!("fan={}", power_label(f.power)));
            if let Some(t) = f.temperature {
                parts.push(format!("temp={t:.1}"));
            }
        }
        println!("{stamp}  {:<24} {}", record.name, parts.join(" "));
    }
}
