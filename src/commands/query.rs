//! Query command handlers.

use std::fmt;
use std::io::Write;

use samisara_device::{FirmwareBuild, SamisaraDevice};
use samisara_transport::HidBackend;

use super::CommandResult;

/// Everything `info` prints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoReport {
    pub port: String,
    pub build: FirmwareBuild,
    pub serial: String,
}

impl InfoReport {
    /// Query the opened unit
    pub fn collect(device: &mut SamisaraDevice) -> Result<Self, samisara_device::DeviceError> {
        let build = device.firmware_build()?;
        Ok(Self {
            port: device.path().to_string(),
            build,
            serial: device.descriptor().serial_or_unknown().to_string(),
        })
    }
}

impl fmt::Display for InfoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Port:     {}", self.port)?;
        writeln!(f, "Firmware: {}", self.build)?;
        writeln!(f, "Serial:   {}", self.serial)
    }
}

/// Show port, firmware build and serial number of the attached unit
pub fn info(backend: &dyn HidBackend, out: &mut dyn Write) -> CommandResult {
    let mut device = SamisaraDevice::open(backend)?;
    let report = InfoReport::collect(&mut device)?;
    write!(out, "{report}")?;
    Ok(())
}
