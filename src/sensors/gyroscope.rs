//! Gyroscope types
//!
//! Full-scale ranges and scaled samples for the 3-axis gyroscope.

use crate::device::GyroData;

/// Gyroscope full-scale range (GYRO_CONFIG.GYRO_FS_SEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GyroFullScale {
    /// ±250°/s range
    #[default]
    Dps250 = 0,
    /// ±500°/s range
    Dps500 = 1,
    /// ±1000°/s range
    Dps1000 = 2,
    /// ±2000°/s range
    Dps2000 = 3,
}

impl GyroFullScale {
    /// Get the sensitivity in LSB/(°/s)
    #[must_use]
    pub const fn sensitivity(self) -> f32 {
        match self {
            Self::Dps250 => 131.0,
            Self::Dps500 => 65.5,
            Self::Dps1000 => 32.8,
            Self::Dps2000 => 16.4,
        }
    }

    /// Integer sensitivity (32768 / range), used by the self-test limits
    #[must_use]
    pub const fn sensitivity_int(self) -> i32 {
        match self {
            Self::Dps250 => 131,
            Self::Dps500 => 65,
            Self::Dps1000 => 32,
            Self::Dps2000 => 16,
        }
    }

    /// Get the maximum value in °/s
    #[must_use]
    pub const fn max_value(self) -> u16 {
        match self {
            Self::Dps250 => 250,
            Self::Dps500 => 500,
            Self::Dps1000 => 1000,
            Self::Dps2000 => 2000,
        }
    }

    /// Decode a GYRO_FS_SEL field value
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Dps250,
            1 => Self::Dps500,
            2 => Self::Dps1000,
            _ => Self::Dps2000,
        }
    }
}

/// Gyroscope data in physical units (degrees per second)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroDataDps {
    /// X-axis rotation rate in °/s
    pub x: f32,
    /// Y-axis rotation rate in °/s
    pub y: f32,
    /// Z-axis rotation rate in °/s
    pub z: f32,
}

impl GyroDataDps {
    /// Scale a raw sample for the given range
    #[must_use]
    pub fn from_raw(raw: GyroData, range: GyroFullScale) -> Self {
        let sensitivity = range.sensitivity();
        Self {
            x: f32::from(raw.x) / sensitivity,
            y: f32::from(raw.y) / sensitivity,
            z: f32::from(raw.z) / sensitivity,
        }
    }

    /// Get the magnitude of the rotation rate vector
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        libm::sqrtf(self.x * self.x + self.y * self.y + self.z * self.z)
    }

    /// Convert to rad/s
    #[must_use]
    pub fn to_rps(&self) -> [f32; 3] {
        const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
        [self.x * DEG_TO_RAD, self.y * DEG_TO_RAD, self.z * DEG_TO_RAD]
    }
}
