//! Simulated unit and endpoint source for tests
//!
//! `SimulatedUnit` models the firmware's vendor-interface handler: it
//! validates request length and padding, tracks the selected subreport and
//! the result of the last command, and drops off the bus once the DFU magic
//! arrives.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use zerocopy::IntoBytes;

use crate::discovery::HidBackend;
use crate::error::TransportError;
use crate::frame::{decode_request, encode_response};
use crate::hid_feature::FeatureReport;
use crate::protocol::{
    device, Acknowledgement, Command, SubreportIndex, DFU_MAGIC, REPORT_ID, REPORT_SIZE,
};
use crate::subreport::InfoSubreport;
use crate::types::DeviceDescriptor;

struct UnitState {
    build_version: Vec<u8>,
    build_date: Vec<u8>,
    max_command: u16,
    max_subreport: u16,
    subreport: u16,
    cmd_result: Acknowledgement,
    in_bootloader: bool,
    sent: Vec<Vec<u8>>,
    reads: usize,
    response_override: Option<Vec<u8>>,
}

impl UnitState {
    fn handle_command(&mut self, report: &[u8]) {
        self.cmd_result = match self.execute(report) {
            Some(()) => Acknowledgement::Okay,
            None => Acknowledgement::BadCommand,
        };
    }

    fn execute(&mut self, report: &[u8]) -> Option<()> {
        let (code, payload) = decode_request(report).ok()?;
        if u16::from(code) > self.max_command {
            return None;
        }

        match Command::try_from(code).ok()? {
            Command::Subreport => {
                let idx = u16::from_le_bytes(payload.try_into().ok()?);
                if idx > self.max_subreport {
                    return None;
                }
                self.subreport = idx;
            }
            Command::Dfu => {
                let magic = u32::from_le_bytes(payload.try_into().ok()?);
                if magic != DFU_MAGIC {
                    return None;
                }
                self.in_bootloader = true;
            }
        }
        Some(())
    }

    fn subreport_report(&self) -> Result<[u8; REPORT_SIZE], TransportError> {
        let info;
        let payload: &[u8] = match SubreportIndex::try_from(self.subreport)? {
            SubreportIndex::Info => {
                info = InfoSubreport::new(
                    self.max_command,
                    self.max_subreport,
                    self.cmd_result.code(),
                );
                info.as_bytes()
            }
            SubreportIndex::BuildVersion => &self.build_version,
            SubreportIndex::BuildDate => &self.build_date,
        };
        encode_response(self.subreport as u8, payload)
    }
}

/// In-memory stand-in for the unit's command interface
#[derive(Clone)]
pub struct SimulatedUnit {
    state: Arc<Mutex<UnitState>>,
}

impl SimulatedUnit {
    /// A unit reporting the given build strings
    pub fn new(build_version: &str, build_date: &str) -> Self {
        Self::with_raw_build_info(build_version.as_bytes(), build_date.as_bytes())
    }

    /// A unit reporting arbitrary build-info bytes
    pub fn with_raw_build_info(build_version: &[u8], build_date: &[u8]) -> Self {
        Self {
            state: Arc::new(Mutex::new(UnitState {
                build_version: build_version.to_vec(),
                build_date: build_date.to_vec(),
                max_command: u16::from(Command::Dfu.code()),
                max_subreport: SubreportIndex::BuildDate.code(),
                subreport: SubreportIndex::Info.code(),
                cmd_result: Acknowledgement::Okay,
                in_bootloader: false,
                sent: Vec::new(),
                reads: 0,
                response_override: None,
            })),
        }
    }

    /// Limit the command codes the firmware accepts
    pub fn with_max_command(self, max_command: u16) -> Self {
        self.state.lock().max_command = max_command;
        self
    }

    /// Limit the subreport indices the firmware serves
    pub fn with_max_subreport(self, max_subreport: u16) -> Self {
        self.state.lock().max_subreport = max_subreport;
        self
    }

    /// Return `report` verbatim on the next read
    pub fn override_next_response(&self, report: Vec<u8>) {
        self.state.lock().response_override = Some(report);
    }

    /// Every report written to the unit, in order
    pub fn sent_reports(&self) -> Vec<Vec<u8>> {
        self.state.lock().sent.clone()
    }

    /// Number of feature-report reads served
    pub fn read_count(&self) -> usize {
        self.state.lock().reads
    }

    /// Whether the DFU trigger was accepted
    pub fn in_bootloader(&self) -> bool {
        self.state.lock().in_bootloader
    }

    /// Result of the last command
    pub fn last_result(&self) -> Acknowledgement {
        self.state.lock().cmd_result
    }
}

impl FeatureReport for SimulatedUnit {
    fn send_feature_report(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.in_bootloader {
            return Err(TransportError::Disconnected);
        }
        state.sent.push(data.to_vec());
        if data.len() != REPORT_SIZE || data.first() != Some(&REPORT_ID) {
            return Err(TransportError::HidError("stalled SET_REPORT".into()));
        }
        state.handle_command(data);
        Ok(())
    }

    fn get_feature_report(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        if state.in_bootloader {
            return Err(TransportError::Disconnected);
        }
        if buf.len() != REPORT_SIZE || buf.first() != Some(&REPORT_ID) {
            return Err(TransportError::HidError("stalled GET_REPORT".into()));
        }
        state.reads += 1;

        let report = match state.response_override.take() {
            Some(report) => report,
            None => state.subreport_report()?.to_vec(),
        };
        let len = report.len().min(buf.len());
        buf[..len].copy_from_slice(&report[..len]);
        Ok(len)
    }
}

struct MockEndpoint {
    descriptor: DeviceDescriptor,
    unit: Option<SimulatedUnit>,
    claimed: AtomicBool,
}

/// Endpoint source backed by simulated devices
#[derive(Default)]
pub struct MockBackend {
    endpoints: Vec<MockEndpoint>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an endpoint; `unit` is `None` for endpoints that cannot be opened
    pub fn with_endpoint(
        mut self,
        descriptor: DeviceDescriptor,
        unit: Option<SimulatedUnit>,
    ) -> Self {
        self.endpoints.push(MockEndpoint {
            descriptor,
            unit,
            claimed: AtomicBool::new(false),
        });
        self
    }

    /// Append a matching endpoint served by `unit`
    pub fn with_unit(self, path: &str, serial: Option<&str>, unit: SimulatedUnit) -> Self {
        self.with_endpoint(unit_descriptor(path, serial), Some(unit))
    }
}

impl HidBackend for MockBackend {
    fn enumerate(&self) -> Result<Vec<DeviceDescriptor>, TransportError> {
        Ok(self.endpoints.iter().map(|e| e.descriptor.clone()).collect())
    }

    fn open(
        &self,
        descriptor: &DeviceDescriptor,
    ) -> Result<Box<dyn FeatureReport>, TransportError> {
        let open_error = |reason: &str| TransportError::DeviceOpen {
            path: descriptor.path.clone(),
            reason: reason.into(),
        };

        let endpoint = self
            .endpoints
            .iter()
            .find(|e| e.descriptor.path == descriptor.path)
            .ok_or_else(|| open_error("no such device"))?;
        let unit = endpoint
            .unit
            .as_ref()
            .ok_or_else(|| open_error("not a feature-report device"))?;
        if endpoint.claimed.swap(true, Ordering::SeqCst) {
            return Err(open_error("device already claimed"));
        }
        Ok(Box::new(unit.clone()))
    }
}

/// Descriptor of a matching endpoint
pub fn unit_descriptor(path: &str, serial: Option<&str>) -> DeviceDescriptor {
    DeviceDescriptor {
        path: path.into(),
        vid: 0x1209,
        pid: 0x5A5A,
        product_string: Some(format!("{} Keyboard", device::PRODUCT_MATCH)),
        usage_page: device::USAGE_PAGE,
        serial_number: serial.map(Into::into),
    }
}
