//! Environment override tests.
//!
//! The process environment cannot be mutated without `unsafe`, so each test
//! re-runs itself in a child process with the variables set and asserts there.

use std::error::Error;
use std::process::Command;

use usbh_hid_class::config::{DEFAULT_MIN_POLL_INTERVAL_MS, INTERFACE_ENV, MIN_POLL_ENV, MODE_ENV};
use usbh_hid_class::{DeviceMode, HidClassConfig, InterfaceSelection};

const CHILD_ENV: &str = "USBH_HID_CONFIG_ENV_CHILD";

fn in_child() -> bool {
    std::env::var_os(CHILD_ENV).is_some()
}

fn run_in_child(test: &str, vars: &[(&str, &str)]) -> Result<(), Box<dyn Error>> {
    let mut command = Command::new(std::env::current_exe()?);
    command
        .args(["--exact", test, "--test-threads=1"])
        .env(CHILD_ENV, "1")
        .env_remove(INTERFACE_ENV)
        .env_remove(MODE_ENV)
        .env_remove(MIN_POLL_ENV);
    for (key, value) in vars {
        command.env(key, value);
    }
    let output = command.output()?;
    if !output.status.success() {
        return Err(format!(
            "{test} failed in child process:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
        .into());
    }
    Ok(())
}

#[test]
fn test_from_env_reads_overrides() -> Result<(), Box<dyn Error>> {
    if !in_child() {
        return run_in_child(
            "test_from_env_reads_overrides",
            &[
                (INTERFACE_ENV, "interface1"),
                (MODE_ENV, "kbd"),
                (MIN_POLL_ENV, "bogus"),
            ],
        );
    }

    let config = HidClassConfig::from_env();
    assert_eq!(config.interface_selection, InterfaceSelection::Explicit(1));
    assert_eq!(config.device_mode, DeviceMode::Keyboard);
    assert_eq!(config.min_poll_interval_ms, DEFAULT_MIN_POLL_INTERVAL_MS);
    Ok(())
}

#[test]
fn test_from_env_without_variables_is_default() -> Result<(), Box<dyn Error>> {
    if !in_child() {
        return run_in_child("test_from_env_without_variables_is_default", &[]);
    }

    assert_eq!(HidClassConfig::from_env(), HidClassConfig::default());
    Ok(())
}
