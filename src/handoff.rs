//! Handoff to the external DFU flashing tool
//!
//! Everything that can be checked without touching the unit is checked in
//! [`Flasher::preflight`], before the bootloader trigger makes the switch
//! irreversible.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::FlashConfig;

/// Errors from the flashing handoff
#[derive(Error, Debug)]
pub enum HandoffError {
    #[error("Flashing tool `{tool}` is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    #[error("Firmware image {} is not readable: {reason}", .path.display())]
    ImageUnreadable { path: PathBuf, reason: String },

    #[error("Flashing tool `{tool}` failed: {status}")]
    ToolFailed { tool: String, status: ExitStatus },
}

/// Runs the configured flashing tool
pub struct Flasher {
    config: FlashConfig,
}

impl Flasher {
    pub fn new(config: FlashConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlashConfig {
        &self.config
    }

    /// Check the tool runs and the image can be read
    pub fn preflight(&self, image: &Path) -> Result<PreparedFlash, HandoffError> {
        self.check_tool()?;
        check_image(image)?;

        let args: Vec<OsString> = vec![
            "-d".into(),
            self.config.device_id().into(),
            "-a".into(),
            self.config.alt_setting.to_string().into(),
            "-s".into(),
            format!("{}:leave", self.config.dfuse_address).into(),
            "-D".into(),
            image.as_os_str().to_owned(),
        ];

        Ok(PreparedFlash {
            tool: self.config.tool.clone(),
            args,
        })
    }

    fn check_tool(&self) -> Result<(), HandoffError> {
        let tool = &self.config.tool;
        let unavailable = |reason: String| HandoffError::ToolUnavailable {
            tool: tool.clone(),
            reason,
        };

        let status = Command::new(tool)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| unavailable(e.to_string()))?;

        if !status.success() {
            return Err(unavailable(format!("`--version` exited with {status}")));
        }
        debug!("Flashing tool `{}` is invocable", tool);
        Ok(())
    }
}

fn check_image(path: &Path) -> Result<(), HandoffError> {
    let unreadable = |reason: String| HandoffError::ImageUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
    let meta = file.metadata().map_err(|e| unreadable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unreadable("not a regular file".into()));
    }
    debug!("Firmware image {} ({} bytes)", path.display(), meta.len());
    Ok(())
}

/// A flashing run whose prerequisites have been checked
#[derive(Debug)]
pub struct PreparedFlash {
    tool: String,
    args: Vec<OsString>,
}

impl PreparedFlash {
    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Run the tool with inherited stdio and wait for it
    pub fn run(self) -> Result<(), HandoffError> {
        info!("Running {} {:?}", self.tool, self.args);
        let status = Command::new(&self.tool)
            .args(&self.args)
            .status()
            .map_err(|e| HandoffError::ToolUnavailable {
                tool: self.tool.clone(),
                reason: e.to_string(),
            })?;

        if !status.success() {
            return Err(HandoffError::ToolFailed {
                tool: self.tool,
                status,
            });
        }
        Ok(())
    }
}
