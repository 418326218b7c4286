//! Frame codec for the vendor feature report
//!
//! Request frame (48 bytes, zero-extended to the 49-byte report on the wire):
//!
//! ```text
//! [0]  report ID (0x01)
//! [1]  command
//! [2]  payload length + 2
//! [3.] payload, then zero padding
//! ```
//!
//! Response report:
//!
//! ```text
//! [0]  report ID (0x01)
//! [1]  echoed subreport index
//! [2]  payload length
//! [3.] payload, then zero padding
//! ```

use crate::error::TransportError;
use crate::protocol::{
    Command, FRAME_LEN, HEADER_LEN, LENGTH_BIAS, MAX_PAYLOAD, REPORT_ID, REPORT_SIZE,
};

/// An encoded request frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// Raw frame bytes, report ID first
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Command byte
    pub fn command_code(&self) -> u8 {
        self.0[1]
    }

    /// Payload bytes, excluding header and padding
    pub fn payload(&self) -> &[u8] {
        let len = usize::from(self.0[2].saturating_sub(LENGTH_BIAS));
        &self.0[HEADER_LEN..HEADER_LEN + len]
    }

    /// The frame as a full-size feature report (trailing byte is padding)
    pub fn to_report(&self) -> [u8; REPORT_SIZE] {
        let mut report = [0u8; REPORT_SIZE];
        report[..FRAME_LEN].copy_from_slice(&self.0);
        report
    }
}

/// Encode a command and its payload into a request frame
pub fn encode(command: Command, payload: &[u8]) -> Result<Frame, TransportError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(TransportError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let mut buf = [0u8; FRAME_LEN];
    buf[0] = REPORT_ID;
    buf[1] = command.code();
    // Fits: MAX_PAYLOAD + 2 < 256
    buf[2] = payload.len() as u8 + LENGTH_BIAS;
    buf[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    Ok(Frame(buf))
}

/// Decode a response report, checking it answers the expected request
///
/// Returns the response payload (`raw[3..3 + raw[2]]`).
pub fn decode(
    raw: &[u8],
    expected_report: u8,
    expected_index: u8,
) -> Result<&[u8], TransportError> {
    if raw.len() < HEADER_LEN {
        return Err(TransportError::Malformed(format!(
            "response is {} bytes, header needs {}",
            raw.len(),
            HEADER_LEN
        )));
    }

    if raw[0] != expected_report || raw[1] != expected_index {
        return Err(TransportError::ProtocolMismatch {
            expected_report,
            expected_index,
            actual_report: raw[0],
            actual_index: raw[1],
        });
    }

    let len = usize::from(raw[2]);
    raw.get(HEADER_LEN..HEADER_LEN + len).ok_or_else(|| {
        TransportError::Malformed(format!(
            "declared length {} exceeds {} available bytes",
            len,
            raw.len() - HEADER_LEN
        ))
    })
}

/// Parse a request report the way the device firmware does
///
/// Accepts either a bare frame or a full report. The length byte must be at
/// least 2 and everything past the declared length must be zero. Returns the
/// command byte and the payload.
pub fn decode_request(raw: &[u8]) -> Result<(u8, &[u8]), TransportError> {
    if raw.len() < HEADER_LEN || raw.len() > REPORT_SIZE {
        return Err(TransportError::Malformed(format!(
            "request is {} bytes",
            raw.len()
        )));
    }
    if raw[0] != REPORT_ID {
        return Err(TransportError::Malformed(format!(
            "bad report id 0x{:02X}",
            raw[0]
        )));
    }

    // Offsets below are relative to the command byte, as the device sees them
    let data = &raw[1..];
    let len = usize::from(data[1]);
    if len < usize::from(LENGTH_BIAS) || len > data.len() {
        return Err(TransportError::Malformed(format!("bad length byte {len}")));
    }
    if data[len..].iter().any(|&b| b != 0) {
        return Err(TransportError::Malformed("non-zero padding".into()));
    }

    Ok((data[0], &data[usize::from(LENGTH_BIAS)..len]))
}

/// Build a response report as the device firmware does
pub fn encode_response(index: u8, payload: &[u8]) -> Result<[u8; REPORT_SIZE], TransportError> {
    if payload.len() > REPORT_SIZE - HEADER_LEN {
        return Err(TransportError::PayloadTooLarge {
            len: payload.len(),
            max: REPORT_SIZE - HEADER_LEN,
        });
    }

    let mut report = [0u8; REPORT_SIZE];
    report[0] = REPORT_ID;
    report[1] = index;
    report[2] = payload.len() as u8;
    report[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    Ok(report)
}
