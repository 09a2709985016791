//! Clap derive structures for the `cooplink` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use cooplink_core::{FanMode, FanSpeed, OvernightPollMode, TimeOfDay};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// cooplink -- command-line bridge for Omlet smart-coop devices
#[derive(Debug, Parser)]
#[command(
    name = "cooplink",
    version,
    about = "Control Omlet smart-coop doors, lights, and fans from the command line",
    long_about = "Synchronizes device state from the Omlet cloud API and dispatches\n\
        door, light, and fan commands. Can also run as a long-lived webhook\n\
        host so the vendor's push notifications trigger immediate re-syncs.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "COOPLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Cloud API base URL (overrides profile)
    #[arg(long, env = "COOPLINK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Omlet API key
    #[arg(long, env = "COOPLINK_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "COOPLINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "COOPLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, tab-separated (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify the API key and show the account it belongs to
    Whoami,

    /// List and inspect devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Control an automatic door
    Door(DoorArgs),

    /// Control a coop light
    Light(LightArgs),

    /// Control a coop fan
    Fan(FanArgs),

    /// Configure overnight sleep (deep power saving)
    Sleep(SleepArgs),

    /// Poll continuously and print state changes as they land
    Watch(WatchArgs),

    /// Run the webhook host and background poller
    Serve(ServeArgs),

    /// Inspect the configuration file
    Config(ConfigArgs),
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List every device on the account
    #[command(alias = "ls")]
    List,

    /// Full detail for one device
    Show {
        /// Device ID or name
        device: String,
    },

    /// Registry identity tuples (id, name, manufacturer, model, firmware)
    Identities,
}

// ── Door ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DoorArgs {
    /// Device ID or name
    pub device: String,

    #[command(subcommand)]
    pub command: DoorCommand,
}

#[derive(Debug, Subcommand)]
pub enum DoorCommand {
    /// Open the door now
    Open,

    /// Close the door now
    Close,

    /// Change what triggers opening and closing
    ///
    /// Each side takes at most one trigger; sides not mentioned keep
    /// their current settings.
    Schedule {
        /// Open at a fixed time (HH:MM)
        #[arg(long, value_parser = parse_time, group = "open")]
        open_at: Option<TimeOfDay>,

        /// Open when ambient light rises past this level
        #[arg(long, group = "open")]
        open_light: Option<i64>,

        /// Open only on manual command
        #[arg(long, group = "open")]
        open_manual: bool,

        /// Close at a fixed time (HH:MM)
        #[arg(long, value_parser = parse_time, group = "close")]
        close_at: Option<TimeOfDay>,

        /// Close when ambient light falls past this level
        #[arg(long, group = "close")]
        close_light: Option<i64>,

        /// Close only on manual command
        #[arg(long, group = "close")]
        close_manual: bool,
    },
}

// ── Light ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LightArgs {
    /// Device ID or name
    pub device: String,

    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Turn the light on
    On,
    /// Turn the light off
    Off,
}

// ── Fan ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FanArgs {
    /// Device ID or name
    pub device: String,

    #[command(subcommand)]
    pub command: FanCommand,
}

#[derive(Debug, Subcommand)]
pub enum FanCommand {
    /// Turn the fan on
    On,
    /// Turn the fan off
    Off,
    /// Run the fan at full speed temporarily
    Boost,

    /// Set the operating mode (manual, time, temperature)
    Mode {
        #[arg(value_parser = parse_fan_mode)]
        mode: FanMode,
    },

    /// Set the manual speed (implies manual mode)
    Speed {
        /// low, medium, or high
        #[arg(value_parser = parse_fan_speed)]
        speed: FanSpeed,
    },

    /// Write one schedule slot
    Slot {
        /// Slot number (1-4)
        slot: u8,

        /// Start time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        on: TimeOfDay,

        /// Stop time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        off: TimeOfDay,

        /// Speed while the slot is active
        #[arg(long, value_parser = parse_fan_speed)]
        speed: Option<FanSpeed>,

        /// Also switch the fan into time mode
        #[arg(long)]
        time_mode: bool,
    },

    /// Clear one schedule slot
    ClearSlot {
        /// Slot number (1-4)
        slot: u8,
    },

    /// Show which schedule slots are configured
    Slots,

    /// Set thermostat thresholds (implies temperature mode)
    Thermostat {
        /// Turn on at or above this temperature
        #[arg(long)]
        on: i64,

        /// Turn off at or below this temperature
        #[arg(long)]
        off: i64,

        /// Speed while running
        #[arg(long, value_parser = parse_fan_speed, default_value = "medium")]
        speed: FanSpeed,
    },
}

// ── Sleep ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SleepArgs {
    /// Device ID or name
    pub device: String,

    /// Disable overnight sleep instead of enabling it
    #[arg(long)]
    pub disable: bool,

    /// Sleep window start (HH:MM, default 23:00)
    #[arg(long, value_parser = parse_time)]
    pub start: Option<TimeOfDay>,

    /// Sleep window end (HH:MM, default 05:00)
    #[arg(long, value_parser = parse_time)]
    pub end: Option<TimeOfDay>,

    /// Poll frequency while asleep
    #[arg(long, value_parser = parse_poll_mode, default_value = "power_savings")]
    pub poll_mode: OvernightPollMode,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind, e.g. 0.0.0.0:8787 (overrides profile)
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved configuration (secrets redacted)
    Show,
    /// Print the config file path
    Path,
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_time(s: &str) -> Result<TimeOfDay, String> {
    s.parse()
        .map_err(|()| format!("expected HH:MM, got '{s}'"))
}

fn parse_fan_mode(s: &str) -> Result<FanMode, String> {
    s.parse()
        .map_err(|_| format!("expected manual, time, or temperature, got '{s}'"))
}

fn parse_fan_speed(s: &str) -> Result<FanSpeed, String> {
    s.parse()
        .map_err(|_| format!("expected low, medium, or high, got '{s}'"))
}

fn parse_poll_mode(s: &str) -> Result<OvernightPollMode, String> {
    s.parse()
        .map_err(|_| format!("expected responsive or power_savings, got '{s}'"))
}
