//! High-level interface to a Samisara unit
//!
//! Wraps a [`CommandChannel`] with typed subreport queries and the one-way
//! switch into the DFU bootloader.

pub mod error;

pub use error::DeviceError;

use std::fmt;

use samisara_transport::protocol::DFU_MAGIC;
use samisara_transport::subreport;
use samisara_transport::{
    require_device, Command, CommandChannel, DeviceDescriptor, DeviceInfo, HidBackend,
    SubreportIndex, SubreportValue,
};
use tracing::{debug, info};

/// Firmware build identification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareBuild {
    pub version: String,
    pub date: String,
}

impl fmt::Display for FirmwareBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.date)
    }
}

/// What is left of a unit after the bootloader trigger
///
/// The application-mode interface is gone; the unit re-enumerates under the
/// bootloader's USB identity.
#[derive(Debug, Clone)]
pub struct BootloaderPending {
    /// Descriptor the unit had before the switch
    pub previous: DeviceDescriptor,
}

/// An opened unit in application mode
pub struct SamisaraDevice {
    channel: CommandChannel,
}

impl SamisaraDevice {
    /// Locate and open the unit
    pub fn open(backend: &dyn HidBackend) -> Result<Self, DeviceError> {
        let descriptor = require_device(backend)?;
        Self::open_descriptor(backend, descriptor)
    }

    /// Open a specific endpoint
    pub fn open_descriptor(
        backend: &dyn HidBackend,
        descriptor: DeviceDescriptor,
    ) -> Result<Self, DeviceError> {
        let channel = CommandChannel::open(backend, descriptor)?;
        Ok(Self::new(channel))
    }

    pub fn new(channel: CommandChannel) -> Self {
        Self { channel }
    }

    /// Descriptor of the opened endpoint
    pub fn descriptor(&self) -> &DeviceDescriptor {
        self.channel.descriptor()
    }

    /// Platform path of the opened endpoint
    pub fn path(&self) -> &str {
        &self.channel.descriptor().path
    }

    // === Subreports ===

    /// Read and decode any subreport
    pub fn read_subreport(
        &mut self,
        index: SubreportIndex,
    ) -> Result<SubreportValue, DeviceError> {
        let payload = self.channel.query_via_select(index)?;
        Ok(subreport::decode(index, &payload)?)
    }

    /// Read the INFO subreport
    pub fn read_info(&mut self) -> Result<DeviceInfo, DeviceError> {
        match self.read_subreport(SubreportIndex::Info)? {
            SubreportValue::Info(info) => Ok(info),
            SubreportValue::Text(_) => Err(DeviceError::UnexpectedResponse(
                "INFO subreport decoded as text".into(),
            )),
        }
    }

    /// Firmware build version string
    pub fn read_build_version(&mut self) -> Result<String, DeviceError> {
        self.read_text(SubreportIndex::BuildVersion)
    }

    /// Firmware build date string
    pub fn read_build_date(&mut self) -> Result<String, DeviceError> {
        self.read_text(SubreportIndex::BuildDate)
    }

    /// Build version and date together
    pub fn firmware_build(&mut self) -> Result<FirmwareBuild, DeviceError> {
        let version = self.read_build_version()?;
        let date = self.read_build_date()?;
        Ok(FirmwareBuild { version, date })
    }

    fn read_text(&mut self, index: SubreportIndex) -> Result<String, DeviceError> {
        self.read_subreport(index)?.into_text().ok_or_else(|| {
            DeviceError::UnexpectedResponse(format!("subreport {index} is not text"))
        })
    }

    /// Whether the firmware accepts `command`
    pub fn supports(&mut self, command: Command) -> Result<bool, DeviceError> {
        let info = self.read_info()?;
        debug!(
            "Firmware limits: max_cmd={} max_subreport={}",
            info.max_command, info.max_subreport
        );
        Ok(info.supports(command))
    }

    // === Mode control ===

    /// Reset the unit into its DFU bootloader
    ///
    /// Fire-and-forget: nothing is read back, and the handle is consumed
    /// because the application interface disappears right after.
    pub fn enter_bootloader(mut self) -> Result<BootloaderPending, DeviceError> {
        self.channel
            .send_command(Command::Dfu, &DFU_MAGIC.to_le_bytes())?;
        info!("Bootloader requested on {}", self.path());
        Ok(BootloaderPending {
            previous: self.channel.descriptor().clone(),
        })
    }
}
