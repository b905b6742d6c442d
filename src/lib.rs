#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod control;
pub mod device;
pub mod interface;
pub mod interrupt;
pub mod power;
pub mod registers;
pub mod remap;
pub mod sampling;
pub mod sensors;
pub mod shared;

// Re-export main types
pub use config::{ChipConfig, Orientation, PlatformConfig, RemapPolicy};
pub use control::{Command, Response};
pub use device::{AccelData, GyroData, Mpu6880};
pub use interface::{I2cInterface, Retry, SpiInterface};
pub use interrupt::{InterruptPinConfig, InterruptStatus};
pub use power::{
    ClockSource, LowPowerWakeFreq, PowerError, PowerRail, PowerState, RailControl, Regulator,
};
pub use registers::{ChipVariant, RegisterMap};
pub use sampling::{AxisSample, DataPath, SampleEvent, SampleSink};
pub use self_test::{SelfTestReport, SelfTestResult};
pub use sensors::{
    AccelDataG, AccelFullScale, GyroDataDps, GyroFullScale, LowPassFilter, Sensor, SensorInfo,
};
pub use shared::SharedMpu6880;

/// I2C address when the AD0 pin is low (default: 0x68)
pub const I2C_ADDRESS_AD0_LOW: u8 = 0x68;

/// I2C address when the AD0 pin is high (alternative: 0x69)
pub const I2C_ADDRESS_AD0_HIGH: u8 = 0x69;

/// `WHO_AM_I` value reported by the MPU6500
pub const WHO_AM_I_MPU6500: u8 = 0x70;

/// `WHO_AM_I` value reported by the MPU6880
pub const WHO_AM_I_MPU6880: u8 = 0x78;

/// Driver errors
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the device
    Bus(E),
    /// Invalid `WHO_AM_I` register value (contains the actual value read)
    InvalidDevice(u8),
    /// Operation not allowed in the current power state (rail off, suspended)
    InvalidState,
    /// Invalid argument (unknown sensor, out-of-range value)
    InvalidArgument,
    /// Requested more work than fixed-capacity buffers can hold
    ResourceExhausted,
    /// Supply rail or enable pin failure
    Power(PowerError),
    /// Device did not clear its reset bit in time
    ResetTimeout,
}

impl<E> From<E> for Error<E> {
    fn from(error: E) -> Self {
        Self::Bus(error)
    }
}
