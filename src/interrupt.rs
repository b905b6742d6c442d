//! Interrupt pin configuration and status
//!
//! In interrupt mode the part raises its INT pin when a new raw sample is
//! ready. The host line is armed by [`Mpu6880`](crate::Mpu6880) while any
//! engine is enabled; the integrator forwards each edge to
//! [`Mpu6880::handle_interrupt`](crate::Mpu6880::handle_interrupt).
//!
//! # Example
//!
//! ```ignore
//! # use mpu6880::{InterruptPinConfig, PlatformConfig};
//! let platform = PlatformConfig {
//!     interrupt: Some(InterruptPinConfig::i2c_default()),
//!     ..PlatformConfig::default()
//! };
//! ```

/// Electrical setup of the INT pin (INT_PIN_CFG)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptPinConfig {
    /// Pin asserts low
    pub active_low: bool,
    /// Open-drain output instead of push-pull
    pub open_drain: bool,
    /// Hold the pin asserted until the status is cleared
    pub latch_enabled: bool,
    /// Any register read clears the status, not only INT_STATUS
    pub clear_on_any_read: bool,
}

impl InterruptPinConfig {
    /// Active-low, open-drain, cleared by any read
    pub const fn i2c_default() -> Self {
        Self {
            active_low: true,
            open_drain: true,
            latch_enabled: true,
            clear_on_any_read: true,
        }
    }

    /// Active-high, push-pull, cleared by any read
    pub const fn spi_default() -> Self {
        Self {
            active_low: false,
            open_drain: false,
            latch_enabled: true,
            clear_on_any_read: true,
        }
    }
}

/// Decoded INT_STATUS register
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptStatus {
    /// Raw sensor data ready
    pub raw_data_ready: bool,
    /// FSYNC edge seen
    pub fsync: bool,
    /// FIFO overflowed
    pub fifo_overflow: bool,
    /// Wake-on-motion fired
    pub wake_on_motion: bool,
}

impl InterruptStatus {
    /// Check if any interrupt is pending
    #[must_use]
    pub const fn any(&self) -> bool {
        self.raw_data_ready || self.fsync || self.fifo_overflow || self.wake_on_motion
    }
}
