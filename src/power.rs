//! Supply rail control and power/clock primitives
//!
//! The MPU6880 is fed by two regulators (`vdd` for the core, `vio` for the
//! digital I/O) and optionally gated by an enable GPIO. [`PowerRail`]
//! sequences them; the chip-side half of the power state machine (sleep bit,
//! engine standby, clock source) lives on [`Mpu6880`](crate::Mpu6880).
//!
//! # Sequencing
//! - Power on: `vdd`, `vio`, 10 µs settle, enable pin high, 100 ms power-up.
//! - Power off: 10 µs settle, enable pin low, 10 µs settle, `vdd`, `vio`.
//!
//! # Example
//!
//! ```ignore
//! # use mpu6880::power::{NoPin, PowerRail, RailControl};
//! let mut rail = PowerRail::new(vdd, vio, None::<NoPin>);
//! rail.set_power(true, &mut delay)?;
//! ```

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, OutputPin};

/// Settle time around enable pin transitions
pub const POWER_EN_DELAY_US: u32 = 10;

/// Time from rail enable until the chip accepts register access
pub const POWER_UP_TIME_MS: u32 = 100;

/// Gyroscope stabilisation time after leaving standby
pub const SENSOR_UP_TIME_MS: u32 = 30;

/// A switchable supply
///
/// Implemented by the integrator on top of whatever regulator framework the
/// board uses.
pub trait Regulator {
    /// Regulator failure
    type Error: core::fmt::Debug;

    /// Turn the supply on
    ///
    /// # Errors
    /// Returns the regulator's error if the supply could not be enabled.
    fn enable(&mut self) -> Result<(), Self::Error>;

    /// Turn the supply off
    ///
    /// # Errors
    /// Returns the regulator's error if the supply could not be disabled.
    fn disable(&mut self) -> Result<(), Self::Error>;
}

/// Rail-level power switching as seen by the driver
pub trait RailControl {
    /// Whether the rail is currently considered powered
    fn is_powered(&self) -> bool;

    /// Switch the rail on or off
    ///
    /// Requesting the state the rail is already in is a no-op.
    ///
    /// # Errors
    /// Returns a [`PowerError`] naming the step that failed.
    fn set_power<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> Result<(), PowerError>;
}

/// Supply sequencing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerError {
    /// `vdd` failed to turn on
    VddEnable,
    /// `vio` failed to turn on (`vdd` was turned back off)
    VioEnable,
    /// `vdd` failed to turn off, rail still powered
    VddDisable,
    /// `vio` failed to turn off, `vdd` was restored and the rail is still powered
    VioDisable,
    /// The enable GPIO could not be driven
    EnablePin,
    /// A rollback step failed and the supplies are in an unknown state
    Unrecoverable,
}

/// Placeholder enable pin for boards without an enable GPIO
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Two-regulator supply rail with an optional enable GPIO
pub struct PowerRail<VDD, VIO, EN> {
    vdd: VDD,
    vio: VIO,
    enable_pin: Option<EN>,
    powered: bool,
}

impl<VDD, VIO, EN> PowerRail<VDD, VIO, EN>
where
    VDD: Regulator,
    VIO: Regulator,
    EN: OutputPin,
{
    /// Create a rail in the unpowered state
    pub const fn new(vdd: VDD, vio: VIO, enable_pin: Option<EN>) -> Self {
        Self {
            vdd,
            vio,
            enable_pin,
            powered: false,
        }
    }

    /// Release the regulators and the enable pin
    pub fn release(self) -> (VDD, VIO, Option<EN>) {
        (self.vdd, self.vio, self.enable_pin)
    }

    fn drive_pin<D: DelayNs>(&mut self, high: bool, delay: &mut D) -> Result<(), PowerError> {
        if let Some(pin) = self.enable_pin.as_mut() {
            delay.delay_us(POWER_EN_DELAY_US);
            let result = if high { pin.set_high() } else { pin.set_low() };
            result.map_err(|_| PowerError::EnablePin)?;
        }
        Ok(())
    }

    fn power_on<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        self.vdd.enable().map_err(|_e| {
            #[cfg(feature = "defmt")]
            defmt::error!("vdd enable failed");
            PowerError::VddEnable
        })?;

        if self.vio.enable().is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("vio enable failed");
            let _ = self.vdd.disable();
            return Err(PowerError::VioEnable);
        }

        if let Err(e) = self.drive_pin(true, delay) {
            #[cfg(feature = "defmt")]
            defmt::error!("enable pin failed, releasing supplies");
            if self.vio.disable().is_err() || self.vdd.disable().is_err() {
                return Err(PowerError::Unrecoverable);
            }
            return Err(e);
        }
        delay.delay_ms(POWER_UP_TIME_MS);
        self.powered = true;
        Ok(())
    }

    fn power_off<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), PowerError> {
        self.drive_pin(false, delay)?;
        if self.enable_pin.is_some() {
            delay.delay_us(POWER_EN_DELAY_US);
        }

        if self.vdd.disable().is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("vdd disable failed");
            self.drive_pin(true, delay)?;
            return Err(PowerError::VddDisable);
        }

        if self.vio.disable().is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("vio disable failed");
            if self.vdd.enable().is_err() {
                self.powered = false;
                return Err(PowerError::Unrecoverable);
            }
            self.drive_pin(true, delay)?;
            return Err(PowerError::VioDisable);
        }

        self.powered = false;
        Ok(())
    }
}

impl<VDD, VIO, EN> RailControl for PowerRail<VDD, VIO, EN>
where
    VDD: Regulator,
    VIO: Regulator,
    EN: OutputPin,
{
    fn is_powered(&self) -> bool {
        self.powered
    }

    fn set_power<D: DelayNs>(&mut self, on: bool, delay: &mut D) -> Result<(), PowerError> {
        if on == self.powered {
            #[cfg(feature = "defmt")]
            defmt::warn!("ignoring power change to {}, already in that state", on);
            return Ok(());
        }

        if on {
            self.power_on(delay)
        } else {
            self.power_off(delay)
        }
    }
}

/// Clock source selection (PWR_MGMT_1.CLKSEL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Internal 20 MHz oscillator, required while the gyro is off
    Internal = 0,
    /// Gyro X PLL, preferred while the gyro runs
    Pll = 1,
}

/// Low-power accelerometer wake frequency (PWR_MGMT_2.LP_WAKE_CTRL)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerWakeFreq {
    /// 1.25 Hz
    #[default]
    Hz1_25 = 0,
    /// 5 Hz
    Hz5 = 1,
    /// 20 Hz
    Hz20 = 2,
    /// 40 Hz
    Hz40 = 3,
}

impl LowPowerWakeFreq {
    /// Get the wake-up frequency in Hz
    #[must_use]
    pub const fn rate_hz(self) -> f32 {
        match self {
            Self::Hz1_25 => 1.25,
            Self::Hz5 => 5.0,
            Self::Hz20 => 20.0,
            Self::Hz40 => 40.0,
        }
    }
}

/// Observed power state of the part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerState {
    /// Supply rail is on
    pub rail_powered: bool,
    /// Last value written to PWR_MGMT_1.SLEEP
    pub chip_sleep: bool,
}
