//! Command channel: request/response exchanges over one opened device

use tracing::debug;

use crate::discovery::HidBackend;
use crate::error::TransportError;
use crate::frame;
use crate::hid_feature::FeatureReport;
use crate::protocol::{
    Acknowledgement, Command, SubreportIndex, HEADER_LEN, REPORT_ID, REPORT_SIZE,
};
use crate::subreport::DeviceInfo;
use crate::types::DeviceDescriptor;

/// Exclusive handle to the unit's command interface
///
/// The device holds a single pending-response slot, so every exchange takes
/// `&mut self` and runs to completion before the next one starts.
pub struct CommandChannel {
    device: Box<dyn FeatureReport>,
    descriptor: DeviceDescriptor,
}

impl CommandChannel {
    /// Open the endpoint described by `descriptor`
    pub fn open(
        backend: &dyn HidBackend,
        descriptor: DeviceDescriptor,
    ) -> Result<Self, TransportError> {
        let device = backend.open(&descriptor)?;
        Ok(Self::new(device, descriptor))
    }

    /// Wrap an already opened device
    pub fn new(device: Box<dyn FeatureReport>, descriptor: DeviceDescriptor) -> Self {
        Self { device, descriptor }
    }

    /// Descriptor of the opened endpoint
    pub fn descriptor(&self) -> &DeviceDescriptor {
        &self.descriptor
    }

    /// Encode and write a command. No response is read.
    pub fn send_command(
        &mut self,
        command: Command,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let frame = frame::encode(command, payload)?;
        debug!(
            "Sending command {}: {:02X?}",
            command,
            &frame.as_bytes()[..HEADER_LEN + payload.len()]
        );
        self.device.send_feature_report(&frame.to_report())
    }

    /// Select a subreport and read it back in one exchange
    ///
    /// The device only answers a select through its cached feature report, so
    /// the select and the read are never exposed separately.
    pub fn query_via_select(&mut self, index: SubreportIndex) -> Result<Vec<u8>, TransportError> {
        self.select_subreport(index)?;
        self.query_response(REPORT_ID, index.echo())
    }

    fn select_subreport(&mut self, index: SubreportIndex) -> Result<(), TransportError> {
        self.send_command(Command::Subreport, &index.code().to_le_bytes())
    }

    fn query_response(
        &mut self,
        report_id: u8,
        expected_index: u8,
    ) -> Result<Vec<u8>, TransportError> {
        let report = self.read_report(report_id)?;
        match frame::decode(&report, report_id, expected_index) {
            Ok(payload) => {
                debug!("Got subreport {}: {:02X?}", expected_index, payload);
                Ok(payload.to_vec())
            }
            Err(e @ TransportError::ProtocolMismatch { .. }) => {
                debug!("Response mismatch: {:02X?}", &report[..HEADER_LEN]);
                Err(rejected_select(&report, expected_index).unwrap_or(e))
            }
            Err(e) => Err(e),
        }
    }

    fn read_report(&mut self, report_id: u8) -> Result<Vec<u8>, TransportError> {
        let mut buf = vec![0u8; REPORT_SIZE];
        buf[0] = report_id;
        let len = self.device.get_feature_report(&mut buf)?;
        buf.truncate(len.min(REPORT_SIZE));
        Ok(buf)
    }
}

/// A refused select leaves the previous subreport in place. When that is
/// INFO reporting BadCommand, the mismatch is a rejection, not a desync.
fn rejected_select(report: &[u8], requested: u8) -> Option<TransportError> {
    let info_echo = SubreportIndex::Info.echo();
    if requested == info_echo {
        return None;
    }

    let payload = frame::decode(report, REPORT_ID, info_echo).ok()?;
    let info = DeviceInfo::parse(payload).ok()?;
    (info.last_result == Acknowledgement::BadCommand).then(|| {
        TransportError::CommandRejected(format!(
            "{} (select subreport {requested})",
            Command::Subreport
        ))
    })
}
