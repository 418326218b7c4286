//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Failed to open {path}: {reason}")]
    DeviceOpen { path: String, reason: String },

    #[error("Device disconnected")]
    Disconnected,

    // Protocol errors
    #[error(
        "Protocol mismatch: expected report 0x{expected_report:02X}/index {expected_index}, \
         got report 0x{actual_report:02X}/index {actual_index}"
    )]
    ProtocolMismatch {
        expected_report: u8,
        expected_index: u8,
        actual_report: u8,
        actual_index: u8,
    },

    #[error("Malformed frame: {0}")]
    Malformed(String),

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Subreport is not valid UTF-8")]
    Decode(#[from] std::str::Utf8Error),

    #[error("Device rejected command {0}")]
    CommandRejected(String),

    #[error("Unknown {kind} code 0x{code:02X}")]
    UnknownCode { kind: &'static str, code: u16 },

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}
