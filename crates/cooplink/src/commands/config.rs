//! `cooplink config` -- inspect the configuration file.

use cooplink_config::ConfigError;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn run(args: &ConfigArgs, _global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", cooplink_config::config_path().display());
            Ok(())
        }
        ConfigCommand::Show => {
            let mut config = cooplink_config::load_config_or_default();
            for profile in config.profiles.values_mut() {
                if profile.api_key.is_some() {
                    profile.api_key = Some("<redacted>".into());
                }
                if profile.webhook_token.is_some() {
                    profile.webhook_token = Some("<redacted>".into());
                }
            }
            let rendered = toml::to_string_pretty(&config).map_err(ConfigError::from)?;
            print!("{rendered}");
            Ok(())
        }
    }
}
