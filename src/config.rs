//! Chip and platform configuration
//!
//! [`ChipConfig`] is the driver's record of what the chip should look like;
//! it is the source of truth replayed onto the hardware after every reset.
//! [`PlatformConfig`] carries the board-level facts supplied once at attach.

use crate::interrupt::InterruptPinConfig;
use crate::power::LowPowerWakeFreq;
use crate::sampling::DEFAULT_POLL_INTERVAL_MS;
use crate::sensors::{AccelFullScale, GyroFullScale, LowPassFilter, Sensor};

/// Internal sample rate with the DLPF enabled, in Hz
pub const ODR_DLPF_ENABLED_HZ: u16 = 1000;

/// FIFO sample rate programmed by the initial configuration, in Hz
pub const INIT_FIFO_RATE_HZ: u16 = 200;

/// Lowest FIFO rate the 8-bit divider can express, in Hz
pub const MIN_FIFO_RATE_HZ: u16 = 4;

/// Desired chip configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct ChipConfig {
    /// Gyroscope full-scale range
    pub gyro_range: GyroFullScale,
    /// Accelerometer full-scale range
    pub accel_range: AccelFullScale,
    /// Digital low pass filter
    pub lpf: LowPassFilter,
    /// FIFO / output data rate in Hz
    pub fifo_rate: u16,
    /// Accelerometer engine enabled
    pub accel_enable: bool,
    /// Gyroscope engine enabled
    pub gyro_enable: bool,
    /// Accelerometer samples routed to the FIFO
    pub accel_fifo_enable: bool,
    /// Gyroscope samples routed to the FIFO
    pub gyro_fifo_enable: bool,
    /// Master enable, `accel_enable || gyro_enable`
    pub enable: bool,
    /// Driver is suspended (or failed to resume)
    pub is_asleep: bool,
    /// Low-power accelerometer wake frequency
    pub lpa_freq: LowPowerWakeFreq,
}

impl ChipConfig {
    /// Configuration applied right after a reset during attach
    ///
    /// ±2000 °/s, 42 Hz filter, 200 Hz output rate, ±2 g, 5 Hz low-power wake.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            gyro_range: GyroFullScale::Dps2000,
            accel_range: AccelFullScale::G2,
            lpf: LowPassFilter::Hz42,
            fifo_rate: INIT_FIFO_RATE_HZ,
            accel_enable: false,
            gyro_enable: false,
            accel_fifo_enable: false,
            gyro_fifo_enable: false,
            enable: false,
            is_asleep: false,
            lpa_freq: LowPowerWakeFreq::Hz5,
        }
    }

    /// SMPLRT_DIV value for the configured FIFO rate
    ///
    /// The rate is clamped to what the divider can express.
    #[must_use]
    pub fn sample_rate_divider(&self) -> u8 {
        let rate = self.fifo_rate.clamp(MIN_FIFO_RATE_HZ, ODR_DLPF_ENABLED_HZ);
        // 1000 / 4 - 1 = 249 fits in a u8
        u8::try_from(ODR_DLPF_ENABLED_HZ / rate - 1).unwrap_or(u8::MAX)
    }

    /// Whether the engine for `sensor` is enabled
    #[must_use]
    pub const fn engine_enabled(&self, sensor: Sensor) -> bool {
        match sensor {
            Sensor::Accel => self.accel_enable,
            Sensor::Gyro => self.gyro_enable,
        }
    }

    pub(crate) fn set_engine_enabled(&mut self, sensor: Sensor, on: bool) {
        match sensor {
            Sensor::Accel => self.accel_enable = on,
            Sensor::Gyro => self.gyro_enable = on,
        }
    }
}

/// Board placement of the chip, selecting an axis remap entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Index 0
    #[default]
    PortraitUp = 0,
    /// Index 1
    LandscapeRight = 1,
    /// Index 2
    PortraitDown = 2,
    /// Index 3
    LandscapeLeft = 3,
    /// Index 4
    PortraitUpBackSide = 4,
    /// Index 5
    LandscapeRightBackSide = 5,
    /// Index 6
    PortraitDownBackSide = 6,
    /// Index 7
    LandscapeLeftBackSide = 7,
}

const ORIENTATION_NAMES: [(&str, Orientation); 8] = [
    ("Portrait Up", Orientation::PortraitUp),
    ("Landscape Right", Orientation::LandscapeRight),
    ("Portrait Down", Orientation::PortraitDown),
    ("Landscape Left", Orientation::LandscapeLeft),
    ("Portrait Up Back Side", Orientation::PortraitUpBackSide),
    ("Landscape Right Back Side", Orientation::LandscapeRightBackSide),
    ("Portrait Down Back Side", Orientation::PortraitDownBackSide),
    ("Landscape Left Back Side", Orientation::LandscapeLeftBackSide),
];

impl Orientation {
    /// Look up a placement by board name; unknown names fall back to `PortraitUp`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        ORIENTATION_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map_or_else(
                || {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("unknown placement name, using Portrait Up");
                    Self::PortraitUp
                },
                |(_, o)| *o,
            )
    }

    /// Placement for a remap index, `None` outside 0..=7
    #[must_use]
    pub const fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::PortraitUp),
            1 => Some(Self::LandscapeRight),
            2 => Some(Self::PortraitDown),
            3 => Some(Self::LandscapeLeft),
            4 => Some(Self::PortraitUpBackSide),
            5 => Some(Self::LandscapeRightBackSide),
            6 => Some(Self::PortraitDownBackSide),
            7 => Some(Self::LandscapeLeftBackSide),
            _ => None,
        }
    }

    /// Board name of this placement
    #[must_use]
    pub const fn name(self) -> &'static str {
        ORIENTATION_NAMES[self as usize].0
    }
}

/// Which data paths apply the axis remap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemapPolicy {
    /// Remap samples produced by the poll timers
    pub polling: bool,
    /// Remap samples produced by the interrupt handler
    pub interrupt: bool,
}

impl Default for RemapPolicy {
    fn default() -> Self {
        Self {
            polling: true,
            interrupt: true,
        }
    }
}

/// Board-level configuration supplied at attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlatformConfig {
    /// Remap table index; values outside 0..=7 leave samples untouched
    pub place: i32,
    /// Interrupt pin setup; `Some` selects the interrupt data path
    pub interrupt: Option<InterruptPinConfig>,
    /// Initial accelerometer poll interval in ms
    pub accel_poll_ms: u32,
    /// Initial gyroscope poll interval in ms
    pub gyro_poll_ms: u32,
    /// Remap application per data path
    pub remap: RemapPolicy,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            place: Orientation::PortraitUp as i32,
            interrupt: None,
            accel_poll_ms: DEFAULT_POLL_INTERVAL_MS,
            gyro_poll_ms: DEFAULT_POLL_INTERVAL_MS,
            remap: RemapPolicy::default(),
        }
    }
}

impl PlatformConfig {
    /// Platform configuration for a named board placement
    #[must_use]
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            place: orientation as i32,
            ..Self::default()
        }
    }
}
