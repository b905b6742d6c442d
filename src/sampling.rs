//! Sample delivery: data paths, poll timers and the sample sink
//!
//! Samples reach the host either from the interrupt handler (both sensors
//! per edge) or from two independent poll timers (one sensor per expiry).
//! The driver has no clock of its own; the integrator drives the timers by
//! calling [`Mpu6880::service_poll`](crate::Mpu6880::service_poll) with a
//! monotonic millisecond timestamp, and receives samples through a
//! [`SampleSink`].

use crate::device::{AccelData, GyroData};

/// Shortest accepted poll interval in ms
pub const MIN_POLL_INTERVAL_MS: u32 = 5;

/// Longest accepted poll interval in ms
pub const MAX_POLL_INTERVAL_MS: u32 = 5000;

/// Poll interval used until the host asks for another one, in ms
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 200;

/// Clamp a requested poll interval to the supported range
#[must_use]
pub const fn clamp_poll_interval(ms: u32) -> u32 {
    if ms < MIN_POLL_INTERVAL_MS {
        MIN_POLL_INTERVAL_MS
    } else if ms > MAX_POLL_INTERVAL_MS {
        MAX_POLL_INTERVAL_MS
    } else {
        ms
    }
}

/// How samples are produced, fixed at attach
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataPath {
    /// Data-ready interrupt, both sensors per edge
    Interrupt,
    /// Per-sensor poll timers
    Polling,
}

/// A sample published to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleEvent {
    /// Accelerometer sample
    Accel(AccelData),
    /// Gyroscope sample
    Gyro(GyroData),
}

/// Both sensors read back to back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisSample {
    /// Accelerometer triple
    pub accel: AccelData,
    /// Gyroscope triple
    pub gyro: GyroData,
}

/// Receiver of published samples
///
/// Implemented for any `FnMut(SampleEvent)`, so a closure pushing into a
/// channel or queue is enough.
pub trait SampleSink {
    /// Deliver one sample
    fn publish(&mut self, event: SampleEvent);
}

impl<F> SampleSink for F
where
    F: FnMut(SampleEvent),
{
    fn publish(&mut self, event: SampleEvent) {
        self(event);
    }
}

/// Re-arming one-shot timer for one sensor
///
/// A freshly scheduled timer is due on the next service call; after firing it
/// re-arms for `now + interval`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollTimer {
    interval_ms: u32,
    armed: bool,
    deadline: Option<u64>,
}

impl PollTimer {
    /// Create a disarmed timer with a clamped interval
    #[must_use]
    pub const fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms: clamp_poll_interval(interval_ms),
            armed: false,
            deadline: None,
        }
    }

    /// Current interval in ms
    #[must_use]
    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Change the interval, returning the clamped value stored
    pub fn set_interval(&mut self, ms: u32) -> u32 {
        self.interval_ms = clamp_poll_interval(ms);
        self.interval_ms
    }

    /// Arm the timer, due on the next service call
    pub fn schedule(&mut self) {
        self.armed = true;
        self.deadline = None;
    }

    /// Disarm the timer; a pending expiry will not fire
    pub fn cancel(&mut self) {
        self.armed = false;
        self.deadline = None;
    }

    /// Whether the timer is armed
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the timer should fire at `now_ms`
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.armed && self.deadline.is_none_or(|deadline| now_ms >= deadline)
    }

    /// Re-arm for one interval after `now_ms`
    pub fn rearm(&mut self, now_ms: u64) {
        self.armed = true;
        self.deadline = Some(now_ms.saturating_add(u64::from(self.interval_ms)));
    }

    /// Next expiry, `None` when disarmed
    #[must_use]
    pub fn deadline(&self) -> Option<u64> {
        if self.armed {
            Some(self.deadline.unwrap_or(0))
        } else {
            None
        }
    }
}
