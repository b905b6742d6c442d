//! Unit tests for supply rail sequencing

use crate::common::test_utils::{MockDelay, mock_rail};
use crate::common::{PowerEvent, RailProbe};
use mpu6880::{PowerError, RailControl};

#[test]
fn test_power_on_sequence() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);

    rail.set_power(true, &mut MockDelay).unwrap();

    assert!(rail.is_powered());
    assert_eq!(
        probe.events(),
        vec![
            PowerEvent::Enable("vdd"),
            PowerEvent::Enable("vio"),
            PowerEvent::Pin(true),
        ]
    );
}

#[test]
fn test_power_off_sequence() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    rail.set_power(true, &mut MockDelay).unwrap();
    probe.clear();

    rail.set_power(false, &mut MockDelay).unwrap();

    assert!(!rail.is_powered());
    assert_eq!(
        probe.events(),
        vec![
            PowerEvent::Pin(false),
            PowerEvent::Disable("vdd"),
            PowerEvent::Disable("vio"),
        ]
    );
}

#[test]
fn test_redundant_request_is_noop() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);

    rail.set_power(false, &mut MockDelay).unwrap();
    assert!(probe.events().is_empty());

    rail.set_power(true, &mut MockDelay).unwrap();
    probe.clear();
    rail.set_power(true, &mut MockDelay).unwrap();
    assert!(probe.events().is_empty());
    assert!(rail.is_powered());
}

#[test]
fn test_vdd_enable_failure() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    probe.vdd.fail_enable(true);

    assert_eq!(
        rail.set_power(true, &mut MockDelay),
        Err(PowerError::VddEnable)
    );
    assert!(!rail.is_powered());
    assert!(!probe.pin.is_high());
}

#[test]
fn test_vio_enable_failure_turns_vdd_back_off() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    probe.vio.fail_enable(true);

    assert_eq!(
        rail.set_power(true, &mut MockDelay),
        Err(PowerError::VioEnable)
    );
    assert!(!rail.is_powered());
    assert!(!probe.vdd.is_enabled());
}

#[test]
fn test_vdd_disable_failure_keeps_rail_up() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    rail.set_power(true, &mut MockDelay).unwrap();
    probe.vdd.fail_disable(true);

    assert_eq!(
        rail.set_power(false, &mut MockDelay),
        Err(PowerError::VddDisable)
    );
    assert!(rail.is_powered());
    assert!(probe.pin.is_high());
}

#[test]
fn test_vio_disable_failure_restores_vdd() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    rail.set_power(true, &mut MockDelay).unwrap();
    probe.vio.fail_disable(true);

    assert_eq!(
        rail.set_power(false, &mut MockDelay),
        Err(PowerError::VioDisable)
    );
    assert!(rail.is_powered());
    assert!(probe.vdd.is_enabled());
    assert!(probe.pin.is_high());
}

#[test]
fn test_vio_disable_failure_with_vdd_lost_is_unrecoverable() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    rail.set_power(true, &mut MockDelay).unwrap();
    probe.vio.fail_disable(true);
    probe.vdd.fail_enable(true);

    assert_eq!(
        rail.set_power(false, &mut MockDelay),
        Err(PowerError::Unrecoverable)
    );
    assert!(!rail.is_powered());
}

#[test]
fn test_enable_pin_failure_releases_supplies() {
    let probe = RailProbe::new();
    let mut rail = mock_rail(&probe);
    probe.pin.fail(true);

    assert_eq!(
        rail.set_power(true, &mut MockDelay),
        Err(PowerError::EnablePin)
    );
    assert!(!rail.is_powered());
    assert!(!probe.vdd.is_enabled());
    assert!(!probe.vio.is_enabled());

    probe.pin.fail(false);
    probe.clear();
    rail.set_power(true, &mut MockDelay).unwrap();
    assert!(rail.is_powered());
    assert_eq!(
        probe.events(),
        vec![
            PowerEvent::Enable("vdd"),
            PowerEvent::Enable("vio"),
            PowerEvent::Pin(true),
        ]
    );
}
