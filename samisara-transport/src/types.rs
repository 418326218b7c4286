//! Common types for transport layer

/// One enumerated HID endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Platform device path (hidraw node on Linux)
    pub path: String,
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// Product string if available
    pub product_string: Option<String>,
    /// HID usage page of the top-level collection
    pub usage_page: u16,
    /// Serial number if available
    pub serial_number: Option<String>,
}

impl DeviceDescriptor {
    /// Serial number, or "Unknown" when the device reports none
    pub fn serial_or_unknown(&self) -> &str {
        self.serial_number
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("Unknown")
    }
}
