//! Sensor types for the MPU6880
//!
//! The part carries two logical sensors sharing one power and clock domain:
//! - Accelerometer (3-axis)
//! - Gyroscope (3-axis)

pub mod accelerometer;
pub mod gyroscope;

// Re-export main types
pub use accelerometer::{AccelDataG, AccelFullScale};
pub use gyroscope::{GyroDataDps, GyroFullScale};

use crate::sampling::{DEFAULT_POLL_INTERVAL_MS, MIN_POLL_INTERVAL_MS};

/// Logical sensor on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sensor {
    /// Accelerometer
    Accel,
    /// Gyroscope
    Gyro,
}

impl Sensor {
    /// The sensor sharing the chip with this one
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Accel => Self::Gyro,
            Self::Gyro => Self::Accel,
        }
    }

    /// Static description of this sensor
    #[must_use]
    pub const fn info(self) -> &'static SensorInfo {
        match self {
            Self::Accel => &ACCEL_INFO,
            Self::Gyro => &GYRO_INFO,
        }
    }
}

/// Sensor class metadata published to the host framework
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorInfo {
    /// Sensor name
    pub name: &'static str,
    /// Vendor name
    pub vendor: &'static str,
    /// Descriptor version
    pub version: u8,
    /// Sensor type code (1 = accelerometer, 4 = gyroscope)
    pub sensor_type: u8,
    /// Maximum range in SI units (m/s² or rad/s)
    pub max_range: f32,
    /// Resolution in SI units
    pub resolution: f32,
    /// Typical current draw in mA
    pub power_ma: f32,
    /// Minimum sampling period in µs
    pub min_delay_us: u32,
    /// Default polling period in ms
    pub default_delay_ms: u32,
}

/// Accelerometer metadata
pub const ACCEL_INFO: SensorInfo = SensorInfo {
    name: "MPU6880-accel",
    vendor: "Invensense",
    version: 1,
    sensor_type: 1,
    max_range: 156.8,
    resolution: 0.000_598_144,
    power_ma: 0.5,
    min_delay_us: MIN_POLL_INTERVAL_MS * 1000,
    default_delay_ms: DEFAULT_POLL_INTERVAL_MS,
};

/// Gyroscope metadata
pub const GYRO_INFO: SensorInfo = SensorInfo {
    name: "MPU6880-gyro",
    vendor: "Invensense",
    version: 1,
    sensor_type: 4,
    max_range: 34.906_586,
    resolution: 0.001_068_115_2,
    power_ma: 3.6,
    min_delay_us: MIN_POLL_INTERVAL_MS * 1000,
    default_delay_ms: DEFAULT_POLL_INTERVAL_MS,
};

/// Gyro / temperature digital low pass filter (CONFIG.DLPF_CFG)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPassFilter {
    /// 256 Hz bandwidth
    #[default]
    Hz256 = 0,
    /// 188 Hz bandwidth
    Hz188 = 1,
    /// 98 Hz bandwidth
    Hz98 = 2,
    /// 42 Hz bandwidth
    Hz42 = 3,
    /// 20 Hz bandwidth
    Hz20 = 4,
    /// 10 Hz bandwidth
    Hz10 = 5,
    /// 5 Hz bandwidth
    Hz5 = 6,
    /// 3600 Hz bandwidth, filter bypassed
    Hz3600 = 7,
}

impl LowPassFilter {
    /// Get the 3dB bandwidth in Hz
    #[must_use]
    pub const fn bandwidth_hz(self) -> u16 {
        match self {
            Self::Hz256 => 256,
            Self::Hz188 => 188,
            Self::Hz98 => 98,
            Self::Hz42 => 42,
            Self::Hz20 => 20,
            Self::Hz10 => 10,
            Self::Hz5 => 5,
            Self::Hz3600 => 3600,
        }
    }

    /// Decode a DLPF_CFG field value
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Hz256,
            1 => Self::Hz188,
            2 => Self::Hz98,
            3 => Self::Hz42,
            4 => Self::Hz20,
            5 => Self::Hz10,
            6 => Self::Hz5,
            _ => Self::Hz3600,
        }
    }
}
