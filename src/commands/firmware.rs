//! Firmware command handlers.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use samisara_device::{DeviceError, SamisaraDevice};
use samisara_transport::{find_device, Command, HidBackend};
use tracing::{info, warn};

use super::CommandResult;
use crate::handoff::Flasher;

/// Switch the unit into its bootloader and flash `image`
///
/// The flashing tool and the image are checked first; a unit that never
/// enumerated in application mode is assumed to be in the bootloader already.
pub fn dfu(
    backend: &dyn HidBackend,
    flasher: &Flasher,
    image: &Path,
    out: &mut dyn Write,
) -> CommandResult {
    let prepared = flasher.preflight(image)?;

    match find_device(backend)? {
        Some(descriptor) => {
            let mut device = SamisaraDevice::open_descriptor(backend, descriptor)?;
            if !device.supports(Command::Dfu)? {
                return Err(DeviceError::NotSupported(format!(
                    "firmware on {} does not accept {}",
                    device.path(),
                    Command::Dfu
                ))
                .into());
            }

            match device.firmware_build() {
                Ok(build) => info!("Current firmware: {}", build),
                Err(e) => warn!("Could not read current firmware build: {}", e),
            }

            let pending = device.enter_bootloader()?;
            writeln!(out, "Bootloader requested on {}", pending.previous.path)?;
            std::thread::sleep(Duration::from_millis(flasher.config().settle_ms));
        }
        None => {
            warn!("No application-mode unit found, assuming bootloader is already active");
            writeln!(out, "No unit in application mode, flashing bootloader directly")?;
        }
    }

    prepared.run()?;
    writeln!(out, "Flashed {}", image.display())?;
    Ok(())
}
