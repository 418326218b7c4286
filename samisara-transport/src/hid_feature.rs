//! Feature-report access to an opened HID device

use hidapi::HidDevice;

use crate::error::TransportError;

/// Blocking feature-report I/O on one opened device
///
/// Both calls block until the underlying transport completes; no timeout is
/// layered on top.
pub trait FeatureReport: Send {
    /// Write a feature report (`data[0]` is the report ID)
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Read a feature report into `buf` (`buf[0]` selects the report ID)
    ///
    /// Returns the number of bytes written into `buf`.
    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError>;
}

impl FeatureReport for HidDevice {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        HidDevice::send_feature_report(self, data)?;
        Ok(())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(HidDevice::get_feature_report(self, buf)?)
    }
}
