//! Subreport registry
//!
//! Maps subreport indices to their payload encoding and decodes the bytes
//! returned by a select-then-read exchange.

use zerocopy::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::error::TransportError;
use crate::protocol::{Acknowledgement, Command, SubreportIndex};

/// Payload encoding of a subreport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubreportEncoding {
    /// Packed little-endian [`InfoSubreport`]
    Info,
    /// UTF-8 text without NUL terminator
    Utf8Text,
}

impl SubreportIndex {
    /// How the device encodes this subreport
    pub fn encoding(self) -> SubreportEncoding {
        match self {
            SubreportIndex::Info => SubreportEncoding::Info,
            SubreportIndex::BuildVersion | SubreportIndex::BuildDate => {
                SubreportEncoding::Utf8Text
            }
        }
    }
}

/// INFO subreport wire layout (6 bytes)
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct InfoSubreport {
    pub max_cmd: U16,
    pub max_subreport: U16,
    pub cmd_result: U16,
}

impl InfoSubreport {
    pub fn new(max_cmd: u16, max_subreport: u16, cmd_result: u16) -> Self {
        Self {
            max_cmd: U16::new(max_cmd),
            max_subreport: U16::new(max_subreport),
            cmd_result: U16::new(cmd_result),
        }
    }
}

/// Decoded INFO subreport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Highest command code the firmware accepts
    pub max_command: u16,
    /// Highest subreport index the firmware serves
    pub max_subreport: u16,
    /// Result of the last command the device processed
    pub last_result: Acknowledgement,
}

impl DeviceInfo {
    /// Parse the INFO payload
    pub fn parse(bytes: &[u8]) -> Result<Self, TransportError> {
        let (raw, _) = InfoSubreport::read_from_prefix(bytes).map_err(|_| {
            TransportError::Malformed(format!(
                "INFO subreport is {} bytes, expected {}",
                bytes.len(),
                std::mem::size_of::<InfoSubreport>()
            ))
        })?;

        Ok(Self {
            max_command: raw.max_cmd.get(),
            max_subreport: raw.max_subreport.get(),
            last_result: Acknowledgement::try_from(raw.cmd_result.get())?,
        })
    }

    /// Whether the firmware accepts `command`
    pub fn supports(&self, command: Command) -> bool {
        u16::from(command.code()) <= self.max_command
    }

    /// Whether the firmware serves `index`
    pub fn serves(&self, index: SubreportIndex) -> bool {
        index.code() <= self.max_subreport
    }
}

/// A decoded subreport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubreportValue {
    Info(DeviceInfo),
    Text(String),
}

impl SubreportValue {
    /// The text of a string subreport
    pub fn into_text(self) -> Option<String> {
        match self {
            SubreportValue::Text(s) => Some(s),
            SubreportValue::Info(_) => None,
        }
    }
}

/// Decode a subreport payload according to its index
pub fn decode(index: SubreportIndex, bytes: &[u8]) -> Result<SubreportValue, TransportError> {
    match index.encoding() {
        SubreportEncoding::Info => DeviceInfo::parse(bytes).map(SubreportValue::Info),
        SubreportEncoding::Utf8Text => decode_text(bytes).map(SubreportValue::Text),
    }
}

/// Decode a text subreport
pub fn decode_text(bytes: &[u8]) -> Result<String, TransportError> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}
