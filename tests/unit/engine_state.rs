//! Unit tests for engine enable/disable and sleep arbitration

use crate::common::mock_interface::{PWR_MGMT_1, PWR_MGMT_2};
use crate::common::{MockDelay, create_mock_driver};
use mpu6880::{ClockSource, Error, Sensor};

const SLEEP: u8 = 0x40;

fn chip_asleep(interface: &crate::common::MockInterface) -> bool {
    interface.get_register(PWR_MGMT_1) & SLEEP != 0
}

#[test]
fn test_first_enable_powers_and_wakes() {
    let (mut driver, interface) = create_mock_driver();
    assert!(!driver.power_state().rail_powered);

    driver.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();

    assert!(driver.power_state().rail_powered);
    assert!(!driver.power_state().chip_sleep);
    assert!(!chip_asleep(&interface));
    assert!(driver.config().enable);
    assert!(driver.is_enabled(Sensor::Accel));
    assert!(!driver.is_enabled(Sensor::Gyro));
    assert_eq!(interface.get_register(PWR_MGMT_2) & 0x38, 0x00);
    // The gyro engine stays in standby
    assert_eq!(interface.get_register(PWR_MGMT_2) & 0x07, 0x07);
}

#[test]
fn test_sleep_only_when_both_engines_off() {
    let (mut driver, interface) = create_mock_driver();

    driver.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();
    driver.set_enable(Sensor::Gyro, true, &mut MockDelay).unwrap();

    driver.set_enable(Sensor::Accel, false, &mut MockDelay).unwrap();
    assert!(!chip_asleep(&interface));
    assert!(driver.config().enable);

    driver.set_enable(Sensor::Gyro, false, &mut MockDelay).unwrap();
    assert!(chip_asleep(&interface));
    assert!(!driver.config().enable);
    assert!(driver.power_state().chip_sleep);
    // Disabling does not cut the rail
    assert!(driver.power_state().rail_powered);
}

#[test]
fn test_enable_flag_tracks_engines() {
    let (mut driver, _interface) = create_mock_driver();

    for (sensor, on) in [
        (Sensor::Gyro, true),
        (Sensor::Accel, true),
        (Sensor::Gyro, false),
        (Sensor::Accel, false),
        (Sensor::Accel, true),
    ] {
        driver.set_enable(sensor, on, &mut MockDelay).unwrap();
        let config = driver.config();
        assert_eq!(config.enable, config.accel_enable || config.gyro_enable);
        assert_eq!(driver.power_state().chip_sleep, !config.enable);
    }
}

#[test]
fn test_gyro_enable_selects_pll() {
    let (mut driver, interface) = create_mock_driver();

    driver.set_enable(Sensor::Gyro, true, &mut MockDelay).unwrap();
    assert_eq!(
        interface.get_register(PWR_MGMT_1) & 0x07,
        ClockSource::Pll as u8
    );
    assert_eq!(interface.get_register(PWR_MGMT_2) & 0x07, 0x00);

    driver.set_enable(Sensor::Gyro, false, &mut MockDelay).unwrap();
    assert_eq!(
        interface.get_register(PWR_MGMT_1) & 0x07,
        ClockSource::Internal as u8
    );
    assert_eq!(interface.get_register(PWR_MGMT_2) & 0x07, 0x07);
}

#[test]
fn test_gyro_stuck_in_standby_is_reported() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_gyro_stuck_in_standby(true);

    let result = driver.set_enable(Sensor::Gyro, true, &mut MockDelay);
    assert!(matches!(result, Err(Error::InvalidState)));
    assert!(!driver.is_enabled(Sensor::Gyro));
}

#[test]
fn test_sleep_requires_power() {
    let (mut driver, _interface) = create_mock_driver();
    assert!(matches!(driver.set_sleep(true), Err(Error::InvalidState)));
    assert!(matches!(driver.read_accel(), Err(Error::InvalidState)));
}

#[test]
fn test_disable_idle_sensor_is_noop() {
    let (mut driver, interface) = create_mock_driver();
    interface.clear_operations();

    driver.set_enable(Sensor::Accel, false, &mut MockDelay).unwrap();
    driver.set_enable(Sensor::Gyro, false, &mut MockDelay).unwrap();

    assert!(interface.operations().is_empty());
    assert!(!driver.power_state().rail_powered);
    assert!(!driver.config().enable);
}

#[test]
fn test_engine_switch_requires_power() {
    let (mut driver, interface) = create_mock_driver();
    interface.clear_operations();

    let result = driver.switch_engine(Sensor::Accel, false, &mut MockDelay);
    assert!(matches!(result, Err(Error::InvalidState)));
    let result = driver.switch_engine(Sensor::Gyro, false, &mut MockDelay);
    assert!(matches!(result, Err(Error::InvalidState)));
    let result = driver.set_clock_source(ClockSource::Pll);
    assert!(matches!(result, Err(Error::InvalidState)));

    assert!(interface.operations().is_empty());
}

#[test]
fn test_attach_leaves_both_engines_in_standby() {
    let (_driver, interface) = create_mock_driver();
    assert_eq!(interface.get_register(PWR_MGMT_2) & 0x3F, 0x3F);
}
