// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "samisara")]
#[command(author, version, about = "Samisara unit query and firmware update tool")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/samisara/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show port path, firmware version and build date, and serial number
    #[command(visible_aliases = ["version", "ver"])]
    Info,

    /// Enter the bootloader and flash a firmware image
    Dfu {
        /// Path to the firmware image
        image: PathBuf,
    },
}
