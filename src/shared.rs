//! Driver behind a device lock
//!
//! Enable/disable, poll interval changes, suspend/resume, self-test, commands
//! and sample production from the timer or interrupt context all go through
//! one [`embassy_sync::blocking_mutex::Mutex`]. The raw mutex flavour is left
//! to the integrator (`CriticalSectionRawMutex` when the interrupt handler
//! shares the driver, `NoopRawMutex` on a single executor).

use core::cell::RefCell;

use device_driver::RegisterInterface;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embedded_hal::delay::DelayNs;

use crate::control::{Command, Response};
use crate::power::RailControl;
use crate::sampling::SampleSink;
use crate::sensors::Sensor;
use crate::{Error, Mpu6880};

/// [`Mpu6880`] serialized by a blocking mutex
pub struct SharedMpu6880<M: RawMutex, I, P> {
    inner: Mutex<M, RefCell<Mpu6880<I, P>>>,
}

impl<M: RawMutex, I, P> SharedMpu6880<M, I, P> {
    /// Wrap an attached driver
    pub const fn new(driver: Mpu6880<I, P>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(driver)),
        }
    }

    /// Run `f` with exclusive access to the driver
    ///
    /// Do not call back into the same `SharedMpu6880` from `f`; the inner
    /// `RefCell` panics on re-entry.
    pub fn lock<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Mpu6880<I, P>) -> R,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Unwrap the driver
    pub fn into_inner(self) -> Mpu6880<I, P> {
        self.inner.into_inner().into_inner()
    }
}

impl<M, I, P> SharedMpu6880<M, I, P>
where
    M: RawMutex,
    I: RegisterInterface<AddressType = u8>,
    P: RailControl,
{
    /// See [`Mpu6880::set_enable`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn set_enable<D: DelayNs>(
        &self,
        sensor: Sensor,
        on: bool,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>> {
        self.lock(|drv| drv.set_enable(sensor, on, delay))
    }

    /// See [`Mpu6880::is_enabled`]
    pub fn is_enabled(&self, sensor: Sensor) -> bool {
        self.lock(|drv| drv.is_enabled(sensor))
    }

    /// See [`Mpu6880::set_poll_interval`]
    pub fn set_poll_interval(&self, sensor: Sensor, interval_ms: u32) -> u32 {
        self.lock(|drv| drv.set_poll_interval(sensor, interval_ms))
    }

    /// See [`Mpu6880::service_poll`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn service_poll<S>(&self, now_ms: u64, sink: &mut S) -> Result<Option<u64>, Error<I::Error>>
    where
        S: SampleSink + ?Sized,
    {
        self.lock(|drv| drv.service_poll(now_ms, sink))
    }

    /// See [`Mpu6880::handle_interrupt`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn handle_interrupt<S>(&self, sink: &mut S) -> Result<bool, Error<I::Error>>
    where
        S: SampleSink + ?Sized,
    {
        self.lock(|drv| drv.handle_interrupt(sink))
    }

    /// See [`Mpu6880::suspend`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn suspend<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.lock(|drv| drv.suspend(delay))
    }

    /// See [`Mpu6880::resume`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn resume<D: DelayNs>(&self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.lock(|drv| drv.resume(delay))
    }

    /// See [`Mpu6880::dispatch`]
    ///
    /// # Errors
    ///
    /// Forwards the driver error.
    pub fn dispatch<D: DelayNs>(
        &self,
        command: Command<'_>,
        delay: &mut D,
    ) -> Result<Response, Error<I::Error>> {
        self.lock(|drv| drv.dispatch(command, delay))
    }
}
