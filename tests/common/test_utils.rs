//! Test utilities and helper functions

use crate::common::mock_interface::MockInterface;
use crate::common::mock_power::{MockPin, MockRegulator, RailProbe};
use mpu6880::{InterruptPinConfig, Mpu6880, PlatformConfig, PowerRail};

/// Rail built from mock parts
pub type MockRail = PowerRail<MockRegulator, MockRegulator, MockPin>;

/// Driver under test
pub type MockDriver = Mpu6880<MockInterface, MockRail>;

/// Mock delay implementation for testing
///
/// This is a no-op delay that implements the embedded-hal DelayNs trait
/// for use in tests where actual delays are not needed.
#[derive(Debug, Clone, Copy)]
pub struct MockDelay;

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, _ns: u32) {
        // No-op for testing
    }

    fn delay_us(&mut self, _us: u32) {
        // No-op for testing
    }

    fn delay_ms(&mut self, _ms: u32) {
        // No-op for testing
    }
}

/// Build a rail from the probe's shared parts
pub fn mock_rail(probe: &RailProbe) -> MockRail {
    PowerRail::new(probe.vdd.clone(), probe.vio.clone(), Some(probe.pin.clone()))
}

/// Attach a driver with the given board configuration
///
/// Returns (driver, interface, rail probe); the interface clone shares state
/// with the driver.
pub fn attach_with(platform: PlatformConfig) -> (MockDriver, MockInterface, RailProbe) {
    let interface = MockInterface::new();
    let interface_clone = interface.clone();
    let probe = RailProbe::new();
    let driver = Mpu6880::attach(interface, mock_rail(&probe), platform, &mut MockDelay)
        .expect("Failed to attach mock driver");
    (driver, interface_clone, probe)
}

/// Attach a polling-mode driver at placement 0
pub fn create_mock_driver() -> (MockDriver, MockInterface) {
    let (driver, interface, _) = attach_with(PlatformConfig::default());
    (driver, interface)
}

/// Attach an interrupt-mode driver at placement 0
pub fn create_interrupt_driver() -> (MockDriver, MockInterface) {
    let platform = PlatformConfig {
        interrupt: Some(InterruptPinConfig::i2c_default()),
        ..PlatformConfig::default()
    };
    let (driver, interface, _) = attach_with(platform);
    (driver, interface)
}

/// Platform with remapping turned off on both paths
pub fn unmapped_platform() -> PlatformConfig {
    let mut platform = PlatformConfig::default();
    platform.remap.polling = false;
    platform.remap.interrupt = false;
    platform
}
