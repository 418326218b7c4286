//! Samisara host tool - shared library
//!
//! Command handlers, flashing configuration and the handoff to the external
//! DFU tool. Protocol and device access live in `samisara-transport` and
//! `samisara-device`.

pub mod commands;
pub mod config;
pub mod handoff;

pub use config::FlashConfig;
pub use handoff::{Flasher, HandoffError, PreparedFlash};
