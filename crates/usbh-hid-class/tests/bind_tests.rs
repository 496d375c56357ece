//! Interface selection and endpoint binding tests.

use std::error::Error;

use usbh_hid_class::mock::{MockHost, RecordingSink, fixtures};
use usbh_hid_class::{
    DeviceMode, Direction, HidClass, HidClassConfig, HidClassError, HidRole, HostClass,
    InterfaceSelection, PipeId, TransportError, UsbHost, select_interface,
};
use usbh_hid_descriptor::TransferType;

fn driver(config: HidClassConfig) -> Result<HidClass, HidClassError> {
    HidClass::new(config)
}

// ---------------------------------------------------------------------------
// Interface selection
// ---------------------------------------------------------------------------

#[test]
fn test_auto_mouse_picks_boot_mouse_interface() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::composite_keyboard_mouse())?;
    let index = select_interface(&host, InterfaceSelection::Auto, DeviceMode::Mouse, 10)?;
    assert_eq!(index, 1);
    Ok(())
}

#[test]
fn test_auto_keyboard_picks_boot_keyboard_interface() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::composite_keyboard_mouse())?;
    let index = select_interface(&host, InterfaceSelection::Auto, DeviceMode::Keyboard, 10)?;
    assert_eq!(index, 0);
    Ok(())
}

#[test]
fn test_auto_mouse_broadens_to_any_hid_interface() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::report_protocol_mouse())?;
    let index = select_interface(&host, InterfaceSelection::Auto, DeviceMode::Mouse, 10)?;
    assert_eq!(index, 1);
    Ok(())
}

#[test]
fn test_auto_without_hid_interface_is_not_found() -> Result<(), Box<dyn Error>> {
    let blob = [
        0x09, 0x02, 0x19, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32, //
        0x09, 0x04, 0x00, 0x00, 0x01, 0x08, 0x06, 0x50, 0x00, //
        0x07, 0x05, 0x81, 0x02, 0x40, 0x00, 0x00,
    ];
    let host = MockHost::new(&blob)?;
    let result = select_interface(&host, InterfaceSelection::Auto, DeviceMode::Keyboard, 10);
    assert!(matches!(
        result,
        Err(HidClassError::InterfaceNotFound {
            mode: DeviceMode::Keyboard
        })
    ));
    Ok(())
}

#[test]
fn test_explicit_index_used_directly() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::report_protocol_mouse())?;
    let index = select_interface(&host, InterfaceSelection::Explicit(0), DeviceMode::Mouse, 10)?;
    assert_eq!(index, 0);
    Ok(())
}

#[test]
fn test_explicit_index_beyond_limit_rejected() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::boot_mouse())?;
    let result = select_interface(&host, InterfaceSelection::Explicit(4), DeviceMode::Mouse, 4);
    assert!(matches!(
        result,
        Err(HidClassError::InterfaceOutOfRange { index: 4, max: 4 })
    ));
    Ok(())
}

#[test]
fn test_explicit_index_without_interface_rejected() -> Result<(), Box<dyn Error>> {
    let host = MockHost::new(&fixtures::boot_mouse())?;
    let result = select_interface(&host, InterfaceSelection::Explicit(3), DeviceMode::Mouse, 10);
    assert!(matches!(
        result,
        Err(HidClassError::InterfaceMissing { index: 3 })
    ));
    Ok(())
}

#[test]
fn test_init_with_missing_explicit_interface_leaves_host_untouched() -> Result<(), Box<dyn Error>>
{
    let mut host = MockHost::new(&fixtures::boot_mouse())?;
    let mut sink = RecordingSink::default();
    let class = driver(HidClassConfig {
        interface_selection: InterfaceSelection::Explicit(3),
        ..HidClassConfig::default()
    })?;

    let err = class
        .init(&mut host, &mut sink)
        .err()
        .ok_or("init bound a nonexistent interface")?;
    assert!(matches!(err, HidClassError::InterfaceMissing { index: 3 }));
    assert!(err.is_bind_error());
    assert_eq!(err.to_string(), "configuration has no interface at index 3");
    assert_eq!(host.current_interface(), 0);
    assert!(host.opened().is_empty());
    assert!(sink.found.is_empty());
    Ok(())
}

#[test]
fn test_sink_overrides_config_mode() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::composite_keyboard_mouse())?;
    let mut sink = RecordingSink::with_mode(DeviceMode::Keyboard);
    let class = driver(HidClassConfig::default())?;

    let handle = class.init(&mut host, &mut sink)?;
    assert_eq!(handle.interface_index(), 0);
    assert_eq!(handle.device_type(), HidRole::Keyboard);
    assert_eq!(host.current_interface(), 0);
    Ok(())
}

#[test]
fn test_sink_overrides_config_selection() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::composite_keyboard_mouse())?;
    let mut sink = RecordingSink {
        selection: Some(InterfaceSelection::Explicit(1)),
        ..RecordingSink::default()
    };
    let class = driver(HidClassConfig {
        device_mode: DeviceMode::Keyboard,
        ..HidClassConfig::default()
    })?;

    let handle = class.init(&mut host, &mut sink)?;
    assert_eq!(handle.interface_index(), 1);
    assert_eq!(handle.device_type(), HidRole::Mouse);
    Ok(())
}

#[test]
fn test_found_interface_reported_to_sink() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::composite_keyboard_mouse())?;
    let mut sink = RecordingSink::default();
    let class = driver(HidClassConfig::default())?;

    class.init(&mut host, &mut sink)?;
    assert_eq!(sink.found.len(), 1);
    let (index, descriptor) = *sink.found.first().ok_or("no interface reported")?;
    assert_eq!(index, 1);
    assert_eq!(descriptor.interface_protocol, 0x02);
    Ok(())
}

#[test]
fn test_select_failure_is_fatal() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_mouse())?;
    host.fail_select(TransportError::NotConnected);
    let class = driver(HidClassConfig::default())?;

    let result = class.init(&mut host, &mut RecordingSink::default());
    assert!(matches!(
        result,
        Err(HidClassError::SelectInterface {
            index: 0,
            source: TransportError::NotConnected
        })
    ));
    assert!(host.allocated().is_empty());
    Ok(())
}

#[test]
fn test_unknown_protocol_binds_as_mouse() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::report_protocol_mouse())?;
    let class = driver(HidClassConfig {
        device_mode: DeviceMode::Keyboard,
        ..HidClassConfig::default()
    })?;

    let handle = class.init(&mut host, &mut RecordingSink::default())?;
    assert_eq!(handle.interface_protocol(), 0x00);
    assert_eq!(handle.device_type(), HidRole::Mouse);
    Ok(())
}

// ---------------------------------------------------------------------------
// Endpoint binding
// ---------------------------------------------------------------------------

#[test]
fn test_keyboard_binds_in_and_out_pipes() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_keyboard())?;
    let class = driver(HidClassConfig::default())?;

    let handle = class.init(&mut host, &mut RecordingSink::with_mode(DeviceMode::Keyboard))?;

    let in_ep = handle.in_endpoint();
    assert_eq!(in_ep.address, 0x81);
    assert_eq!(in_ep.direction, Direction::In);
    assert_eq!(in_ep.max_packet_size, 8);

    let out_ep = handle.out_endpoint().ok_or("missing OUT endpoint")?;
    assert_eq!(out_ep.address, 0x02);
    assert_eq!(out_ep.direction, Direction::Out);
    assert_eq!(handle.out_pipe(), Some(out_ep.pipe));

    assert_eq!(host.opened().len(), 2);
    for (_, config) in host.opened() {
        assert_eq!(config.transfer_type, TransferType::Interrupt);
        assert_eq!(config.device_address, 1);
    }
    assert_eq!(host.toggles(), &[(PipeId(1), 0), (PipeId(2), 0)]);
    Ok(())
}

#[test]
fn test_mouse_binds_only_in_pipe() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_mouse())?;
    let class = driver(HidClassConfig::default())?;

    let handle = class.init(&mut host, &mut RecordingSink::default())?;
    assert_eq!(handle.in_pipe(), PipeId(1));
    assert!(handle.out_endpoint().is_none());
    assert_eq!(handle.out_pipe(), None);
    Ok(())
}

#[test]
fn test_endpoint_count_bounded_by_platform_limit() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_keyboard())?;
    let class = driver(HidClassConfig {
        max_endpoints: 1,
        ..HidClassConfig::default()
    })?;

    let handle = class.init(&mut host, &mut RecordingSink::with_mode(DeviceMode::Keyboard))?;
    assert!(handle.out_endpoint().is_none());
    assert_eq!(host.allocated().len(), 1);
    Ok(())
}

#[test]
fn test_alloc_failure_releases_earlier_pipes() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_keyboard())?;
    host.limit_pipes(1);
    let class = driver(HidClassConfig::default())?;

    let result = class.init(&mut host, &mut RecordingSink::with_mode(DeviceMode::Keyboard));
    assert!(matches!(
        result,
        Err(HidClassError::PipeAlloc {
            endpoint: 0x02,
            source: TransportError::NoFreePipe
        })
    ));
    assert_eq!(host.closed(), &[PipeId(1)]);
    assert_eq!(host.freed(), &[PipeId(1)]);
    Ok(())
}

#[test]
fn test_open_failure_frees_failed_and_earlier_pipes() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_keyboard())?;
    host.fail_open_for(0x02);
    let class = driver(HidClassConfig::default())?;

    let result = class.init(&mut host, &mut RecordingSink::with_mode(DeviceMode::Keyboard));
    assert!(matches!(
        result,
        Err(HidClassError::PipeOpen { endpoint: 0x02, .. })
    ));
    assert_eq!(host.closed(), &[PipeId(1)]);
    assert_eq!(host.freed(), &[PipeId(2), PipeId(1)]);
    Ok(())
}

#[test]
fn test_interface_without_in_endpoint_rejected() -> Result<(), Box<dyn Error>> {
    let blob = [
        0x09, 0x02, 0x22, 0x00, 0x01, 0x01, 0x00, 0xA0, 0x32, //
        0x09, 0x04, 0x00, 0x00, 0x01, 0x03, 0x00, 0x00, 0x00, //
        0x09, 0x21, 0x11, 0x01, 0x00, 0x01, 0x22, 0x20, 0x00, //
        0x07, 0x05, 0x01, 0x03, 0x08, 0x00, 0x0A,
    ];
    let mut host = MockHost::new(&blob)?;
    let class = driver(HidClassConfig::default())?;

    let result = class.init(&mut host, &mut RecordingSink::default());
    assert!(matches!(
        result,
        Err(HidClassError::MissingInEndpoint { interface: 0 })
    ));
    assert_eq!(host.freed(), &[PipeId(1)]);
    Ok(())
}

#[test]
fn test_poll_interval_clamped_at_bind() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_mouse())?;
    let class = driver(HidClassConfig::default())?;

    let handle = class.init(&mut host, &mut RecordingSink::default())?;
    assert_eq!(handle.in_endpoint().interval, 1);
    assert_eq!(handle.poll_interval(), 10);
    Ok(())
}

#[test]
fn test_deinit_releases_every_pipe() -> Result<(), Box<dyn Error>> {
    let mut host = MockHost::new(&fixtures::boot_keyboard())?;
    let class = driver(HidClassConfig::default())?;
    let handle = class.init(&mut host, &mut RecordingSink::with_mode(DeviceMode::Keyboard))?;

    class.deinit(&mut host, handle)?;
    assert_eq!(host.closed(), &[PipeId(1), PipeId(2)]);
    assert_eq!(host.freed(), &[PipeId(1), PipeId(2)]);
    Ok(())
}

#[test]
fn test_class_identity() -> Result<(), Box<dyn Error>> {
    let class = driver(HidClassConfig::default())?;
    assert_eq!(class.name(), "HID");
    assert_eq!(class.class_code(), 0x03);
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let result = driver(HidClassConfig {
        fifo_reports: 0,
        ..HidClassConfig::default()
    });
    assert!(matches!(result, Err(HidClassError::InvalidConfig { .. })));
}

#[test]
fn test_oversized_ring_buffer_rejected_before_allocation() {
    let result = driver(HidClassConfig {
        max_report_size: u16::MAX,
        fifo_reports: u16::MAX,
        ..HidClassConfig::default()
    });
    assert!(matches!(
        result,
        Err(HidClassError::InvalidConfig {
            field: "fifo_reports",
            ..
        })
    ));
}
