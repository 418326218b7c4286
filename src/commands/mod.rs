//! Command handlers for the CLI application.
//!
//! - `query`: read-only commands (info)
//! - `firmware`: bootloader entry and flashing (dfu)
//!
//! Handlers take the HID backend and the output stream as parameters so they
//! run the same against hidapi and the simulated unit.

pub mod firmware;
pub mod query;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;
