//! Transport layer for the Samisara vendor HID interface
//!
//! The unit exposes one vendor feature report (usage page 0xFFC1, report
//! ID 1). Requests are written with SET_REPORT; the device answers through
//! the cached report returned by the next GET_REPORT.
//!
//! - `frame`: fixed-size request/response codec
//! - `subreport`: subreport encodings and decoding
//! - `discovery`: endpoint enumeration and selection
//! - `channel`: request/response exchanges on an opened device

pub mod channel;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod subreport;
pub mod types;

mod hid_feature;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use channel::CommandChannel;
pub use discovery::{
    find_device, is_unit_endpoint, require_device, select_device, HidApiBackend, HidBackend,
};
pub use error::TransportError;
pub use frame::Frame;
pub use hid_feature::FeatureReport;
pub use protocol::{Acknowledgement, Command, SubreportIndex};
pub use subreport::{DeviceInfo, SubreportEncoding, SubreportValue};
pub use types::DeviceDescriptor;
