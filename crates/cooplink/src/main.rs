//! `cooplink` binary entry point.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose, cli.global.quiet);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over
/// the -v ladder when set.
fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config inspection works without credentials or a client.
        Command::Config(args) => commands::config::run(&args, &cli.global),

        command => {
            let config = cooplink_config::load_config_or_default();
            let app = commands::App::build(&config, &cli.global)?;

            let result = commands::dispatch(command, &app, &cli.global).await;

            // Cancels any follow-up refreshes still pending; a one-shot
            // invocation doesn't wait for them.
            app.engine.shutdown().await;
            result
        }
    }
}
