//! Protocol constants and code tables for the Samisara vendor interface
//!
//! The vendor interface is a single feature report (ID 1, 48 data bytes)
//! on a HID collection with usage page 0xFFC1. All multi-byte fields are
//! little endian.

use std::fmt;

use crate::error::TransportError;

/// Report ID of the vendor feature report
pub const REPORT_ID: u8 = 0x01;

/// Encoded frame length (report ID included)
pub const FRAME_LEN: usize = 48;

/// Size of the feature report exchanged with the device (report ID + 48 data bytes)
pub const REPORT_SIZE: usize = FRAME_LEN + 1;

/// Report ID, command and length bytes at the head of every frame
pub const HEADER_LEN: usize = 3;

/// Largest payload an encoded frame can carry
pub const MAX_PAYLOAD: usize = FRAME_LEN - HEADER_LEN;

/// The length byte counts the command and length bytes the device re-parses
pub const LENGTH_BIAS: u8 = 2;

/// Magic value carried by the DFU command
pub const DFU_MAGIC: u32 = 0xDEAD_BEEF;

/// Device match filter
pub mod device {
    /// Substring of the product string reported by the unit
    pub const PRODUCT_MATCH: &str = "Samisara";
    /// Vendor usage page of the command interface
    pub const USAGE_PAGE: u16 = 0xFFC1;
}

/// Commands accepted by the vendor interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Select which subreport the next feature-report read returns
    Subreport = 0,
    /// Reset into the DFU bootloader
    Dfu = 1,
}

impl Command {
    /// Wire code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            Command::Subreport => "SUBREPORT",
            Command::Dfu => "DFU",
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = TransportError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Command::Subreport),
            1 => Ok(Command::Dfu),
            _ => Err(TransportError::UnknownCode {
                kind: "command",
                code: code.into(),
            }),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.code())
    }
}

/// Result of the last command, as reported in the Info subreport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Acknowledgement {
    Okay = 0,
    BadCommand = 1,
}

impl Acknowledgement {
    /// Wire code
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for Acknowledgement {
    type Error = TransportError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Acknowledgement::Okay),
            1 => Ok(Acknowledgement::BadCommand),
            _ => Err(TransportError::UnknownCode {
                kind: "acknowledgement",
                code,
            }),
        }
    }
}

/// Subreports selectable with [`Command::Subreport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum SubreportIndex {
    /// Command/subreport limits and last command result
    Info = 0,
    /// Firmware build version string
    BuildVersion = 1,
    /// Firmware build date string
    BuildDate = 2,
}

impl SubreportIndex {
    pub const ALL: [SubreportIndex; 3] = [
        SubreportIndex::Info,
        SubreportIndex::BuildVersion,
        SubreportIndex::BuildDate,
    ];

    /// Wire code (sent as a little-endian u16, echoed as a single byte)
    pub fn code(self) -> u16 {
        self as u16
    }

    /// The byte the device echoes at offset 1 of its response
    pub fn echo(self) -> u8 {
        self as u8
    }

    /// Human-readable name
    pub fn name(self) -> &'static str {
        match self {
            SubreportIndex::Info => "INFO",
            SubreportIndex::BuildVersion => "BUILD_VER",
            SubreportIndex::BuildDate => "BUILD_DATE",
        }
    }
}

impl TryFrom<u16> for SubreportIndex {
    type Error = TransportError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SubreportIndex::Info),
            1 => Ok(SubreportIndex::BuildVersion),
            2 => Ok(SubreportIndex::BuildDate),
            _ => Err(TransportError::UnknownCode {
                kind: "subreport",
                code,
            }),
        }
    }
}

impl fmt::Display for SubreportIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.code())
    }
}
