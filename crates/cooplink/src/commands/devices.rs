//! `cooplink devices` -- list and inspect devices.

use serde::Serialize;
use tabled::Tabled;

use cooplink_core::{DeviceRecord, DoorPosition, PowerState};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::render_list;

use super::{resolve_device, App};

pub async fn run(args: DevicesArgs, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    app.engine.refresh().await?;
    match args.command {
        DevicesCommand::List => list(app, global),
        DevicesCommand::Show { device } => show(&device, app, global),
        DevicesCommand::Identities => identities(app, global),
    }
}

// ── List ─────────────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "TYPE")]
    device_type: String,
    #[tabled(rename = "DOOR")]
    door: String,
    #[tabled(rename = "LIGHT")]
    light: String,
    #[tabled(rename = "FAN")]
    fan: String,
    #[tabled(rename = "CONNECTION")]
    connection: String,
}

impl From<&DeviceRecord> for DeviceRow {
    fn from(r: &DeviceRecord) -> Self {
        Self {
            id: r.device_id.clone(),
            name: r.name.clone(),
            device_type: r.device_type.clone().unwrap_or_else(|| "-".into()),
            door: r
                .state
                .door
                .as_ref()
                .map_or_else(|| "-".into(), |d| door_label(d.position).into()),
            light: r
                .state
                .light
                .as_ref()
                .map_or_else(|| "-".into(), |l| power_label(l.power).into()),
            fan: r
                .state
                .fan
                .as_ref()
                .map_or_else(|| "-".into(), |f| power_label(f.power).into()),
            connection: if r.overdue_connection {
                "overdue".into()
            } else {
                "ok".into()
            },
        }
    }
}

fn list(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = app.engine.store().snapshot();
    let mut records: Vec<&DeviceRecord> = snapshot.values().map(AsRef::as_ref).collect();
    records.sort_by(|a, b| a.name.cmp(&b.name));

    let rows: Vec<DeviceRow> = records.into_iter().map(DeviceRow::from).collect();
    println!("{}", render_list(&rows, global.output)?);
    Ok(())
}

// ── Show ─────────────────────────────────────────────────────────────

fn show(query: &str, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let record = resolve_device(app, query)?;
    println!(
        "{}",
        crate::output::render_single(record.as_ref(), detail(&record), global.output)?
    );
    Ok(())
}

fn detail(r: &DeviceRecord) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Name:       {}", r.name));
    lines.push(format!("ID:         {}", r.device_id));
    if let Some(serial) = &r.device_serial {
        lines.push(format!("Serial:     {serial}"));
    }
    if let Some(kind) = &r.device_type {
        lines.push(format!("Type:       {kind}"));
    }
    lines.push(format!(
        "Connection: {}",
        if r.overdue_connection { "overdue" } else { "ok" }
    ));

    if let Some(g) = &r.state.general {
        if let Some(fw) = &g.firmware_version {
            lines.push(format!("Firmware:   {fw}"));
        }
        if let Some(battery) = g.battery_level {
            lines.push(format!("Battery:    {battery}%"));
        }
        if let Some(source) = &g.power_source {
            lines.push(format!("Power:      {source}"));
        }
    }

    if let Some(d) = &r.state.door {
        lines.push(String::new());
        lines.push(format!("Door:       {}", door_label(d.position)));
        if let Some(t) = &d.last_open_time {
            lines.push(format!("  last open:  {t}"));
        }
        if let Some(t) = &d.last_close_time {
            lines.push(format!("  last close: {t}"));
        }
        if let Some(level) = d.light_level {
            lines.push(format!("  light level: {level}"));
        }
        if let Some(fault) = &d.fault {
            lines.push(format!("  fault: {fault}"));
        }
    }

    if let Some(l) = &r.state.light {
        lines.push(String::new());
        lines.push(format!("Light:      {}", power_label(l.power)));
    }

    if let Some(f) = &r.state.fan {
        lines.push(String::new());
        lines.push(format!("Fan:        {}", power_label(f.power)));
        if let Some(t) = f.temperature {
            lines.push(format!("  temperature: {t:.1}°C"));
        }
        if let Some(h) = f.humidity {
            lines.push(format!("  humidity:    {h:.0}%"));
        }
    }

    if !r.actions.is_empty() {
        lines.push(String::new());
        let names: Vec<&str> = r.actions.iter().map(|a| a.action_name.as_str()).collect();
        lines.push(format!("Actions:    {}", names.join(", ")));
    }

    lines.join("\n")
}

// ── Identities ───────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct IdentityRow {
    #[tabled(rename = "ID")]
    identifier: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "MANUFACTURER")]
    manufacturer: String,
    #[tabled(rename = "MODEL")]
    model: String,
    #[tabled(rename = "FIRMWARE")]
    firmware: String,
}

fn identities(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let mut rows: Vec<IdentityRow> = app
        .engine
        .store()
        .identities()
        .into_iter()
        .map(|i| IdentityRow {
            identifier: i.identifier,
            name: i.name,
            manufacturer: i.manufacturer,
            model: i.model.unwrap_or_else(|| "-".into()),
            firmware: i.firmware_version.unwrap_or_else(|| "-".into()),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    println!("{}", render_list(&rows, global.output)?);
    Ok(())
}

// ── Cell formatting ──────────────────────────────────────────────────

pub fn door_label(position: DoorPosition) -> &'static str {
    match position {
        DoorPosition::Open => "open",
        DoorPosition::Closed => "closed",
        DoorPosition::OpenPending => "opening",
        DoorPosition::ClosePending => "closing",
        DoorPosition::Stopped => "stopped",
        _ => "unknown",
    }
}

pub fn power_label(power: PowerState) -> &'static str {
    match power {
        PowerState::On => "on",
        PowerState::Off => "off",
        PowerState::OnPending => "turning on",
        PowerState::OffPending => "turning off",
        PowerState::Boost => "boost",
        PowerState::BoostPending => "boosting",
        _ => "unknown",
    }
}
