//! Unit tests for configuration writes

use crate::common::mock_interface::{
    ACCEL_CONFIG, CONFIG, FIFO_EN, GYRO_CONFIG, PWR_MGMT_2, SMPLRT_DIV,
};
use crate::common::{MockDelay, MockInterface, attach_with, create_mock_driver};
use crate::common::test_utils::{MockDriver, mock_rail};
use crate::common::RailProbe;
use mpu6880::{
    AccelFullScale, ChipConfig, ChipVariant, Error, GyroFullScale, LowPassFilter, Mpu6880,
    PlatformConfig, Sensor,
};

fn assert_registers_match(interface: &MockInterface, config: &ChipConfig) {
    assert_eq!(
        GyroFullScale::from_bits(interface.get_register(GYRO_CONFIG) >> 3),
        config.gyro_range
    );
    assert_eq!(
        AccelFullScale::from_bits(interface.get_register(ACCEL_CONFIG) >> 3),
        config.accel_range
    );
    assert_eq!(
        LowPassFilter::from_bits(interface.get_register(CONFIG)),
        config.lpf
    );
    assert_eq!(
        interface.get_register(SMPLRT_DIV),
        config.sample_rate_divider()
    );
}

fn enabled_driver() -> (MockDriver, MockInterface) {
    let (mut driver, interface) = create_mock_driver();
    driver.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();
    (driver, interface)
}

#[test]
fn test_attach_applies_initial_config() {
    let (driver, interface) = create_mock_driver();

    assert_eq!(driver.variant(), ChipVariant::Mpu6880);
    assert_eq!(driver.config().gyro_range, GyroFullScale::Dps2000);
    assert_eq!(driver.config().fifo_rate, 200);
    assert_eq!(interface.get_register(GYRO_CONFIG), 0x18);
    assert_eq!(interface.get_register(CONFIG), 0x03);
    assert_eq!(interface.get_register(ACCEL_CONFIG), 0x00);
    assert_eq!(interface.get_register(SMPLRT_DIV), 4);
    // LP_WAKE_CTRL = 5 Hz
    assert_eq!(interface.get_register(PWR_MGMT_2) >> 6, 1);
    assert_registers_match(&interface, driver.config());
    // Attach leaves the rail off
    assert!(!driver.power_state().rail_powered);
}

#[test]
fn test_mpu6500_skips_wake_frequency() {
    let interface = MockInterface::new();
    interface.set_who_am_i(0x70);
    let probe = RailProbe::new();
    let driver: MockDriver = Mpu6880::attach(
        interface.clone(),
        mock_rail(&probe),
        PlatformConfig::default(),
        &mut MockDelay,
    )
    .unwrap();

    assert_eq!(driver.variant(), ChipVariant::Mpu6500);
    assert!(!driver.is_mpu6880());
    assert_eq!(interface.get_register(PWR_MGMT_2) >> 6, 0);
}

#[test]
fn test_setters_apply_immediately_when_live() {
    let (mut driver, interface) = enabled_driver();

    driver.set_gyro_range(GyroFullScale::Dps500).unwrap();
    driver.set_accel_range(AccelFullScale::G8).unwrap();
    driver.set_low_pass_filter(LowPassFilter::Hz98).unwrap();
    driver.set_fifo_rate(100).unwrap();

    assert_eq!(interface.get_register(GYRO_CONFIG), 0x08);
    assert_eq!(interface.get_register(ACCEL_CONFIG), 0x10);
    assert_eq!(interface.get_register(CONFIG), 0x02);
    assert_eq!(interface.get_register(SMPLRT_DIV), 9);
    assert_registers_match(&interface, driver.config());
}

#[test]
fn test_setters_defer_while_unpowered() {
    let (mut driver, interface) = create_mock_driver();
    interface.clear_operations();

    driver.set_accel_range(AccelFullScale::G16).unwrap();
    assert!(interface.operations().is_empty());

    driver.set_enable(Sensor::Accel, true, &mut MockDelay).unwrap();
    assert_eq!(interface.get_register(ACCEL_CONFIG), 0x18);
}

#[test]
fn test_fifo_sources_follow_flags() {
    let (mut driver, interface) = enabled_driver();

    driver.set_fifo_enable(Sensor::Gyro, true).unwrap();
    assert_eq!(interface.get_register(FIFO_EN), 0x70);

    driver.set_fifo_enable(Sensor::Accel, true).unwrap();
    assert_eq!(interface.get_register(FIFO_EN), 0x78);

    driver.set_fifo_enable(Sensor::Gyro, false).unwrap();
    assert_eq!(interface.get_register(FIFO_EN), 0x08);
}

#[test]
fn test_rate_divider_limits() {
    let (mut driver, interface) = enabled_driver();

    driver.set_fifo_rate(1000).unwrap();
    assert_eq!(interface.get_register(SMPLRT_DIV), 0);

    driver.set_fifo_rate(4000).unwrap();
    assert_eq!(interface.get_register(SMPLRT_DIV), 0);

    driver.set_fifo_rate(1).unwrap();
    assert_eq!(interface.get_register(SMPLRT_DIV), 249);

    assert!(matches!(driver.set_fifo_rate(0), Err(Error::InvalidArgument)));
}

#[test]
fn test_apply_config_aborts_on_first_failure() {
    let (mut driver, interface) = enabled_driver();
    interface.fail_writes_to(Some(CONFIG));
    interface.clear_operations();

    assert!(driver.set_gyro_range(GyroFullScale::Dps1000).is_err());

    assert_eq!(interface.writes_to(GYRO_CONFIG), vec![0x10]);
    assert!(interface.writes_to(ACCEL_CONFIG).is_empty());
    assert!(interface.writes_to(SMPLRT_DIV).is_empty());
}

#[test]
fn test_scaled_reads_use_configured_range() {
    let (mut driver, interface) = enabled_driver();
    driver.set_accel_range(AccelFullScale::G4).unwrap();
    interface.set_accel_data(0, 0, 8192);

    let accel = driver.read_accel_g().unwrap();
    assert!((accel.z - 1.0).abs() < 1e-3);

    driver.set_gyro_range(GyroFullScale::Dps250).unwrap();
    interface.set_gyro_data(0, 131, 0);
    let gyro = driver.read_gyro_dps().unwrap();
    assert!((gyro.y - 1.0).abs() < 1e-3);
}

#[test]
fn test_temperature_conversion() {
    let (mut driver, interface) = enabled_driver();
    interface.set_temperature_data(0);

    let raw = driver.read_temperature().unwrap();
    assert_eq!(raw, 0);
    assert!((MockDriver::temperature_to_celsius(raw) - 21.0).abs() < 1e-3);
}

#[test]
fn test_custom_platform_is_kept() {
    let platform = PlatformConfig {
        place: 5,
        accel_poll_ms: 20,
        ..PlatformConfig::default()
    };
    let (driver, _interface, _) = attach_with(platform);
    assert_eq!(driver.platform().place, 5);
    assert_eq!(driver.poll_interval(Sensor::Accel), 20);
}
