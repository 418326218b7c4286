//! End-to-end tests for the `info` and `dfu` handlers against simulated units.

use std::path::PathBuf;

use samisara::commands::{firmware, query};
use samisara::{FlashConfig, Flasher, HandoffError};
use samisara_transport::mock::{MockBackend, SimulatedUnit};

fn flasher(tool: &str) -> Flasher {
    Flasher::new(FlashConfig {
        tool: tool.to_string(),
        settle_ms: 0,
        ..FlashConfig::default()
    })
}

fn temp_image(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("samisara-{}-{}", std::process::id(), name));
    std::fs::write(&path, b":00000001FF\n").unwrap();
    path
}

// ── info ──

#[test]
fn info_without_device_fails() {
    let backend = MockBackend::new();
    let mut out = Vec::new();

    let err = query::info(&backend, &mut out).unwrap_err();
    assert!(
        err.to_string().to_lowercase().contains("device not found"),
        "unexpected error: {err}"
    );
    let rendered = format!("{err:#}");
    assert_eq!(rendered.matches("Device not found").count(), 1, "{rendered}");
    assert!(out.is_empty());
}

#[test]
fn info_prints_port_build_and_serial() {
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw3", Some("0123ABCD"), unit);
    let mut out = Vec::new();

    query::info(&backend, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "Port:     /dev/hidraw3\nFirmware: 2.0.0 (2024-01-01)\nSerial:   0123ABCD\n"
    );
}

#[test]
fn info_without_serial_prints_unknown() {
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit);
    let mut out = Vec::new();

    query::info(&backend, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("2.0.0"));
    assert!(text.contains("2024-01-01"));
    assert!(text.contains("/dev/hidraw3"));
    assert!(text.ends_with("Serial:   Unknown\n"));
}

#[test]
fn info_propagates_protocol_mismatch() {
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    unit.override_next_response(vec![0x01, 0x02, 0x00]);
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit);
    let mut out = Vec::new();

    let err = query::info(&backend, &mut out).unwrap_err();
    assert!(err.to_string().contains("Protocol mismatch"), "{err}");
}

// ── dfu ──

#[test]
fn dfu_triggers_bootloader_then_flashes() {
    let image = temp_image("ok.hex");
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit.clone());
    let mut out = Vec::new();

    firmware::dfu(&backend, &flasher("true"), &image, &mut out).unwrap();
    assert!(unit.in_bootloader());
    let sent = unit.sent_reports();
    assert_eq!(&sent.last().unwrap()[1..7], &[0x01, 0x06, 0xEF, 0xBE, 0xAD, 0xDE]);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Bootloader requested on /dev/hidraw3"));
    std::fs::remove_file(image).ok();
}

#[test]
fn dfu_missing_tool_leaves_device_alone() {
    let image = temp_image("no-tool.hex");
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit.clone());
    let mut out = Vec::new();

    let err = firmware::dfu(
        &backend,
        &flasher("samisara-no-such-flasher"),
        &image,
        &mut out,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HandoffError>(),
        Some(HandoffError::ToolUnavailable { .. })
    ));
    assert!(unit.sent_reports().is_empty());
    assert!(!unit.in_bootloader());
    std::fs::remove_file(image).ok();
}

#[test]
fn dfu_missing_image_leaves_device_alone() {
    let image = std::env::temp_dir().join("samisara-missing-image.hex");
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit.clone());
    let mut out = Vec::new();

    let err = firmware::dfu(&backend, &flasher("true"), &image, &mut out).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HandoffError>(),
        Some(HandoffError::ImageUnreadable { .. })
    ));
    assert!(unit.sent_reports().is_empty());
}

#[test]
fn dfu_refuses_firmware_without_dfu_command() {
    let image = temp_image("no-dfu.hex");
    let unit = SimulatedUnit::new("0.9.0", "2023-06-01").with_max_command(0);
    let backend = MockBackend::new().with_unit("/dev/hidraw3", None, unit.clone());
    let mut out = Vec::new();

    let err = firmware::dfu(&backend, &flasher("true"), &image, &mut out).unwrap_err();
    assert!(err.to_string().contains("not supported"), "{err}");
    assert!(!unit.in_bootloader());
    std::fs::remove_file(image).ok();
}

#[test]
fn dfu_without_application_device_flashes_directly() {
    let image = temp_image("direct.hex");
    let backend = MockBackend::new();
    let mut out = Vec::new();

    firmware::dfu(&backend, &flasher("true"), &image, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("flashing bootloader directly"));
    std::fs::remove_file(image).ok();
}

#[test]
fn dfu_rejects_tool_that_cannot_run() {
    let image = temp_image("fail.hex");
    let backend = MockBackend::new();
    let mut out = Vec::new();

    // `false --version` fails, so preflight already rejects it
    let err = firmware::dfu(&backend, &flasher("false"), &image, &mut out).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HandoffError>(),
        Some(HandoffError::ToolUnavailable { .. })
    ));
    std::fs::remove_file(image).ok();
}

/// A flashing tool that answers `--version` but fails every flash
#[cfg(unix)]
fn failing_flash_tool() -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = std::env::temp_dir()
        .join(format!("samisara-{}-flash-fails.sh", std::process::id()));
    std::fs::write(
        &path,
        "#!/bin/sh\n[ \"$1\" = \"--version\" ] && exit 0\nexit 74\n",
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn dfu_reports_flash_failure_after_bootloader_entry() {
    let image = temp_image("flash-fails.hex");
    let tool = failing_flash_tool();
    let unit = SimulatedUnit::new("2.0.0", "2024-01-01");
    let backend = MockBackend::new().with_unit("/dev/hidraw5", None, unit.clone());
    let mut out = Vec::new();

    let err = firmware::dfu(&backend, &flasher(tool.to_str().unwrap()), &image, &mut out)
        .unwrap_err();
    match err.downcast_ref::<HandoffError>() {
        Some(HandoffError::ToolFailed { status, .. }) => assert_eq!(status.code(), Some(74)),
        other => panic!("expected ToolFailed, got {other:?}"),
    }
    // The trigger went out before the tool ran
    assert!(unit.in_bootloader());

    std::fs::remove_file(image).ok();
    std::fs::remove_file(tool).ok();
}
