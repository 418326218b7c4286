//! Samisara host tool CLI
//!
//! Queries a Samisara unit over its vendor HID interface and hands it over
//! to the DFU flashing tool for firmware updates.

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use samisara::commands;
use samisara::{FlashConfig, Flasher};
use samisara_transport::HidApiBackend;
use tracing::debug;

mod cli;
use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let backend = HidApiBackend::new().context("Failed to initialize HID API")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Info => commands::query::info(&backend, &mut out),
        Commands::Dfu { image } => {
            let config_path = cli.config.unwrap_or_else(FlashConfig::default_path);
            debug!("Loading config from {:?}", config_path);
            let config = FlashConfig::load(&config_path)
                .with_context(|| format!("Failed to load {}", config_path.display()))?;
            commands::firmware::dfu(&backend, &Flasher::new(config), &image, &mut out)
        }
    }
}
