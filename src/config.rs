//! Flashing configuration
//!
//! Loaded from TOML; every field has a default so an absent file or a
//! partial file both work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the bootloader is flashed once the unit has switched over
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Flashing tool executable
    pub tool: String,
    /// USB vendor ID of the bootloader
    pub vendor_id: u16,
    /// USB product ID of the bootloader
    pub product_id: u16,
    /// DFU alternate setting
    pub alt_setting: u8,
    /// DfuSe target address the image is written to
    pub dfuse_address: String,
    /// Delay between the bootloader trigger and starting the tool (ms)
    pub settle_ms: u64,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            tool: "dfu-util".to_string(),
            vendor_id: 0x2E3C,
            product_id: 0xDF11,
            alt_setting: 0,
            dfuse_address: "0x08000000".to_string(),
            settle_ms: 1000,
        }
    }
}

impl FlashConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("samisara")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: FlashConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// `VVVV:PPPP` device filter
    pub fn device_id(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}
