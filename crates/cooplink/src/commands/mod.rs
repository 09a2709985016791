//! Command handlers and the shared application context.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;
use secrecy::SecretString;

use cooplink_api::{CoopClient, TransportConfig};
use cooplink_config::{Config, ConfigError, Profile};
use cooplink_core::{
    DeviceRecord, DispatchConfig, Dispatcher, PollingInterval, SyncEngine, WebhookConfig,
};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::should_color;

pub mod config;
pub mod devices;
pub mod door;
pub mod fan;
pub mod light;
pub mod serve;
pub mod sleep;
pub mod watch;

// ── Application context ──────────────────────────────────────────────

/// Everything a command handler needs, built once per invocation.
pub struct App {
    pub client: CoopClient,
    pub engine: SyncEngine,
    pub dispatcher: Dispatcher,
    pub polling: PollingInterval,
    pub webhook: WebhookConfig,
    pub webhook_bind: Option<String>,
}

impl App {
    pub fn build(config: &Config, global: &GlobalOpts) -> Result<Self, CliError> {
        let fallback = Profile::default();
        let profile = match config.profile(global.profile.as_deref()) {
            Ok((_, profile)) => profile,
            // No config file yet: flags and env vars alone are enough.
            Err(ConfigError::UnknownProfile { .. }) if global.profile.is_none() => &fallback,
            Err(e) => return Err(e.into()),
        };

        let api_key = match &global.api_key {
            Some(key) => SecretString::from(key.clone()),
            None => cooplink_config::resolve_api_key(profile, global.profile.as_deref().unwrap_or("default"))?,
        };

        let base_url = match &global.base_url {
            Some(url) => url.clone(),
            None => cooplink_config::resolve_base_url(profile)?,
        };

        let timeout = global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout);
        let transport = TransportConfig {
            timeout: Duration::from_secs(timeout),
        };

        let client = CoopClient::from_api_key(&base_url, &api_key, &transport)?;
        let engine = SyncEngine::new(client.clone());
        let dispatcher = Dispatcher::new(engine.clone(), DispatchConfig::default());

        Ok(Self {
            client,
            engine,
            dispatcher,
            polling: cooplink_config::resolve_polling(profile),
            webhook: cooplink_config::resolve_webhook(profile),
            webhook_bind: profile.webhook_bind.clone(),
        })
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

pub async fn dispatch(command: Command, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    match command {
        Command::Whoami => whoami(app, global).await,
        Command::Devices(args) => devices::run(args, app, global).await,
        Command::Door(args) => door::run(args, app, global).await,
        Command::Light(args) => light::run(args, app, global).await,
        Command::Fan(args) => fan::run(args, app, global).await,
        Command::Sleep(args) => sleep::run(args, app, global).await,
        Command::Watch(args) => watch::run(args, app, global).await,
        Command::Serve(args) => serve::run(args, app, global).await,
        Command::Config(args) => config::run(&args, global),
    }
}

async fn whoami(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let account = app.client.whoami().await?;
    let detail = format!(
        "Account: {}\nEmail:   {}\nID:      {}",
        account.full_name.as_deref().unwrap_or("-"),
        account.email_address.as_deref().unwrap_or("-"),
        account
            .id
            .map_or_else(|| "-".to_owned(), |id| id.to_string()),
    );
    let body = serde_json::json!({
        "id": account.id,
        "fullName": account.full_name,
        "emailAddress": account.email_address,
    });
    println!(
        "{}",
        crate::output::render_single(&body, detail, global.output)?
    );
    Ok(())
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Find a device by ID, falling back to a case-insensitive name match.
pub fn resolve_device(app: &App, query: &str) -> Result<Arc<DeviceRecord>, CliError> {
    if let Some(record) = app.engine.store().device(query) {
        return Ok(record);
    }

    let snapshot = app.engine.store().snapshot();
    let mut by_name = snapshot
        .values()
        .filter(|r| r.name.eq_ignore_ascii_case(query));
    match (by_name.next(), by_name.next()) {
        (Some(record), None) => Ok(record.clone()),
        (Some(_), Some(_)) => Err(CliError::usage(format!(
            "'{query}' matches more than one device, use the device ID"
        ))),
        _ => Err(CliError::DeviceNotFound {
            device: query.into(),
        }),
    }
}

/// Print a post-dispatch confirmation unless `--quiet` is set.
pub fn confirm(global: &GlobalOpts, message: &str) {
    if global.quiet {
        return;
    }
    if should_color(global.color) {
        println!("{} {message}", "✓".green());
    } else {
        println!("✓ {message}");
    }
}
