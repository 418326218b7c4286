//! Device interface tests against the simulated unit.

use samisara_device::{DeviceError, SamisaraDevice};
use samisara_transport::frame::encode_response;
use samisara_transport::mock::{unit_descriptor, MockBackend, SimulatedUnit};
use samisara_transport::{Acknowledgement, Command, SubreportIndex, TransportError};

fn open(unit: &SimulatedUnit) -> SamisaraDevice {
    let backend = MockBackend::new().with_unit("/dev/hidraw4", Some("S123"), unit.clone());
    SamisaraDevice::open(&backend).expect("simulated unit should open")
}

#[test]
fn reads_build_version() {
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01");
    let mut dev = open(&unit);
    assert_eq!(dev.read_build_version().unwrap(), "1.2.3");
}

#[test]
fn reads_build_date_after_version() {
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let mut dev = open(&unit);
    let build = dev.firmware_build().unwrap();
    assert_eq!(build.version, "2.0.0");
    assert_eq!(build.date, "2024-01-01");
    assert_eq!(build.to_string(), "2.0.0 (2024-01-01)");

    // select + read per subreport, strictly alternating
    let sent = unit.sent_reports();
    assert_eq!(sent.len(), 2);
    assert_eq!(unit.read_count(), 2);
    assert_eq!(&sent[0][..5], &[0x01, 0x00, 0x04, 0x01, 0x00]);
    assert_eq!(&sent[1][..5], &[0x01, 0x00, 0x04, 0x02, 0x00]);
}

#[test]
fn reads_info() {
    let unit = SimulatedUnit::new("1.0", "d");
    let mut dev = open(&unit);
    let info = dev.read_info().unwrap();
    assert_eq!(info.max_command, 1);
    assert_eq!(info.max_subreport, 2);
    assert_eq!(info.last_result, Acknowledgement::Okay);
    assert!(dev.supports(Command::Dfu).unwrap());
}

#[test]
fn old_firmware_without_dfu() {
    let unit = SimulatedUnit::new("0.9", "d").with_max_command(0);
    let mut dev = open(&unit);
    assert!(!dev.supports(Command::Dfu).unwrap());
}

#[test]
fn invalid_utf8_is_decode_error() {
    let unit = SimulatedUnit::with_raw_build_info(&[0xFF, 0xFE, 0x31], b"2024-01-01");
    let mut dev = open(&unit);
    assert!(matches!(
        dev.read_build_version(),
        Err(DeviceError::Transport(TransportError::Decode(_)))
    ));
    // The date is still readable afterwards
    assert_eq!(dev.read_build_date().unwrap(), "2024-01-01");
}

#[test]
fn corrupted_report_id_is_mismatch() {
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01");
    let mut dev = open(&unit);

    let mut report = encode_response(1, b"1.2.3").unwrap();
    report[0] = 0x03;
    unit.override_next_response(report.to_vec());
    assert!(matches!(
        dev.read_build_version(),
        Err(DeviceError::Transport(TransportError::ProtocolMismatch {
            actual_report: 0x03,
            ..
        }))
    ));
}

#[test]
fn corrupted_echo_is_mismatch() {
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01");
    let mut dev = open(&unit);

    let report = encode_response(2, b"2024-01-01").unwrap();
    unit.override_next_response(report.to_vec());
    assert!(matches!(
        dev.read_build_version(),
        Err(DeviceError::Transport(TransportError::ProtocolMismatch {
            expected_index: 1,
            actual_index: 2,
            ..
        }))
    ));
}

#[test]
fn refused_select_is_command_rejected() {
    // Firmware that only serves INFO refuses the BUILD_VER select and keeps
    // answering with INFO, which now reports BadCommand
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01").with_max_subreport(0);
    let mut dev = open(&unit);
    assert!(matches!(
        dev.read_build_version(),
        Err(DeviceError::Transport(TransportError::CommandRejected(_)))
    ));
    assert_eq!(unit.last_result(), Acknowledgement::BadCommand);
}

#[test]
fn every_subreport_decodes() {
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01");
    let mut dev = open(&unit);
    for index in SubreportIndex::ALL {
        dev.read_subreport(index).unwrap();
    }
}

#[test]
fn enter_bootloader_sends_magic_and_detaches() {
    let unit = SimulatedUnit::new("1.2.3", "2024-01-01");
    let dev = open(&unit);

    let pending = dev.enter_bootloader().unwrap();
    assert_eq!(pending.previous.path, "/dev/hidraw4");
    assert!(unit.in_bootloader());
    assert_eq!(unit.read_count(), 0);

    let sent = unit.sent_reports();
    let report = sent.last().unwrap();
    assert_eq!(report.len(), 49);
    assert_eq!(&report[..3], &[0x01, 0x01, 0x06]);
    assert_eq!(&report[3..7], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert!(report[7..].iter().all(|&b| b == 0));
}

#[test]
fn missing_device_is_not_found() {
    let backend = MockBackend::new();
    let err = SamisaraDevice::open(&backend).err().unwrap();
    assert!(err.is_not_found());
}

/// Display plus every `source()`, joined the way `{:#}` renders a chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[test]
fn transport_errors_render_once() {
    let err = SamisaraDevice::open(&MockBackend::new()).err().unwrap();
    let rendered = error_chain(&err);
    assert_eq!(rendered.matches("Device not found").count(), 1, "{rendered}");

    let unit = SimulatedUnit::with_raw_build_info(&[0xFF, 0xFE, 0x31], b"2024-01-01");
    let err = open(&unit).read_build_version().unwrap_err();
    let rendered = error_chain(&err);
    assert_eq!(rendered.matches("valid UTF-8").count(), 1, "{rendered}");
    assert_eq!(rendered.matches("invalid utf-8").count(), 1, "{rendered}");
}

#[test]
fn last_matching_endpoint_is_opened() {
    let first = SimulatedUnit::new("1.0.0", "a");
    let second = SimulatedUnit::new("2.0.0", "b");
    let backend = MockBackend::new()
        .with_unit("/dev/hidraw1", None, first)
        .with_unit("/dev/hidraw2", None, second);

    let mut dev = SamisaraDevice::open(&backend).unwrap();
    assert_eq!(dev.path(), "/dev/hidraw2");
    assert_eq!(dev.read_build_version().unwrap(), "2.0.0");
}

#[test]
fn claimed_device_fails_to_open() {
    let unit = SimulatedUnit::new("1", "2");
    let backend = MockBackend::new().with_unit("/dev/hidraw0", None, unit);
    let _held = SamisaraDevice::open(&backend).unwrap();
    assert!(matches!(
        SamisaraDevice::open_descriptor(&backend, unit_descriptor("/dev/hidraw0", None)),
        Err(DeviceError::Transport(TransportError::DeviceOpen { .. }))
    ));
}
