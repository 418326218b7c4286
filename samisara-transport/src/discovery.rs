//! Device discovery for the Samisara vendor interface

use std::ffi::CString;

use hidapi::HidApi;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::hid_feature::FeatureReport;
use crate::protocol::device;
use crate::types::DeviceDescriptor;

/// Source of HID endpoints
pub trait HidBackend {
    /// List every attached HID endpoint, in enumeration order
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError>;

    /// Open the endpoint at `descriptor.path`
    fn open(&self, descriptor: &DeviceDescriptor)
        -> Result<Box<dyn FeatureReport>, TransportError>;
}

/// hidapi-backed endpoint source
pub struct HidApiBackend {
    api: HidApi,
}

impl HidApiBackend {
    /// Initialise hidapi and take a snapshot of attached devices
    pub fn new() -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        Ok(Self { api })
    }
}

impl HidBackend for HidApiBackend {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        let devices: Vec<_> = self
            .api
            .device_list()
            .map(|d| DeviceDescriptor {
                path: d.path().to_string_lossy().to_string(),
                vid: d.vendor_id(),
                pid: d.product_id(),
                product_string: d.product_string().map(|s| s.to_string()),
                usage_page: d.usage_page(),
                serial_number: d.serial_number().map(|s| s.to_string()),
            })
            .collect();
        debug!("Enumerated {} HID endpoints", devices.len());
        Ok(devices)
    }

    fn open(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn FeatureReport>, TransportError> {
        let path =
            CString::new(descriptor.path.as_str()).map_err(|e| TransportError::DeviceOpen {
                path: descriptor.path.clone(),
                reason: e.to_string(),
            })?;

        let device = self
            .api
            .open_path(&path)
            .map_err(|e| TransportError::DeviceOpen {
                path: descriptor.path.clone(),
                reason: e.to_string(),
            })?;

        info!(
            "Opened {:04X}:{:04X} at {}",
            descriptor.vid, descriptor.pid, descriptor.path
        );
        Ok(Box::new(device))
    }
}

/// Check if this endpoint is the unit's command interface
pub fn is_unit_endpoint(descriptor: &DeviceDescriptor) -> bool {
    descriptor.usage_page == device::USAGE_PAGE
        && descriptor
            .product_string
            .as_deref()
            .is_some_and(|p| p.contains(device::PRODUCT_MATCH))
}

/// Pick the unit's command interface out of an enumeration
///
/// When several endpoints match, the last one in enumeration order is
/// returned.
pub fn select_device<I>(endpoints: I) -> Option<DeviceDescriptor>
where
    I: IntoIterator<Item = DeviceDescriptor>,
{
    let mut matches = 0usize;
    let mut selected = None;
    for endpoint in endpoints.into_iter().filter(is_unit_endpoint) {
        debug!("Matching endpoint: {}", endpoint.path);
        matches += 1;
        selected = Some(endpoint);
    }

    if matches > 1 {
        warn!("{matches} endpoints match, using the last one enumerated");
    }
    selected
}

/// Enumerate and locate the unit
pub fn find_device(backend: &dyn HidBackend) -> Result<Option<DeviceDescriptor>, TransportError> {
    Ok(select_device(backend.enumerate()?))
}

/// Locate the unit, failing with `DeviceNotFound` when absent
pub fn require_device(backend: &dyn HidBackend) -> Result<DeviceDescriptor, TransportError> {
    find_device(backend)?.ok_or_else(|| {
        TransportError::DeviceNotFound(format!(
            "no \"{}\" endpoint on usage page 0x{:04X}",
            device::PRODUCT_MATCH,
            device::USAGE_PAGE
        ))
    })
}
