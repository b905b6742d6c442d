//! High-level driver for the MPU6880 / MPU6500
//!
//! [`Mpu6880`] owns the register device and the supply rail and implements
//! the chip lifecycle: attach, per-sensor enable/disable, sample production
//! on either data path, self-test, suspend and resume. Every method takes
//! `&mut self`; wrap the driver in [`SharedMpu6880`](crate::SharedMpu6880)
//! when several contexts need it.
//!
//! Register access is only legal while the rail is powered. Methods that
//! touch registers outside the lifecycle return [`Error::InvalidState`]
//! otherwise.

use core::num::NonZeroU16;

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::config::{ChipConfig, PlatformConfig};
use crate::interrupt::{InterruptPinConfig, InterruptStatus};
use crate::power::{ClockSource, PowerState, RailControl, SENSOR_UP_TIME_MS};
use crate::registers::{ChipVariant, Mpu6880Registers as RegisterDevice, RegisterMap};
use crate::remap;
use crate::sampling::{AxisSample, DataPath, PollTimer, SampleEvent, SampleSink};
use crate::self_test::{
    self, CaptureBuffer, EXCITATION_SETTLE_US, MAX_SELF_TEST_SAMPLES, MEASUREMENT_MODE,
    NORMAL_MODE_SETTLE_MS, SelfTestReport, SelfTestResult,
};
use crate::sensors::{
    AccelDataG, AccelFullScale, GyroDataDps, GyroFullScale, LowPassFilter, Sensor,
};
use crate::Error;

/// Polls of the reset bit before giving up
pub const RESET_RETRY_COUNT: u8 = 10;

/// Wait between two polls of the reset bit
pub const RESET_WAIT_MS: u32 = 20;

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

impl From<[i16; 3]> for AccelData {
    fn from([x, y, z]: [i16; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<[i16; 3]> for GyroData {
    fn from([x, y, z]: [i16; 3]) -> Self {
        Self { x, y, z }
    }
}

impl AccelData {
    /// Axes as an array
    #[must_use]
    pub const fn to_array(self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }
}

impl GyroData {
    /// Axes as an array
    #[must_use]
    pub const fn to_array(self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }
}

/// Main driver for the MPU6880
pub struct Mpu6880<I, P> {
    device: RegisterDevice<I>,
    rail: P,
    variant: ChipVariant,
    map: RegisterMap,
    config: ChipConfig,
    platform: PlatformConfig,
    data_path: DataPath,
    chip_sleep: bool,
    accel_poll: PollTimer,
    gyro_poll: PollTimer,
    irq_armed: bool,
    self_test: Option<SelfTestResult>,
}

impl<I, P> Mpu6880<I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: RailControl,
{
    /// Bring up the chip and leave it configured and unpowered
    ///
    /// Powers the rail, toggles the sleep bit, identifies the part, puts both
    /// engines in standby, resets the chip and applies
    /// [`ChipConfig::initial`]. The data path is chosen from
    /// `platform.interrupt`. The rail is switched off again before returning;
    /// the first [`set_enable`](Self::set_enable) powers it back on.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rail cannot be powered
    /// - Communication with the device fails
    /// - `WHO_AM_I` does not name a supported part
    /// - The chip does not leave reset
    pub fn attach<D>(
        interface: I,
        rail: P,
        platform: PlatformConfig,
        delay: &mut D,
    ) -> Result<Self, Error<I::Error>>
    where
        D: DelayNs,
    {
        let data_path = if platform.interrupt.is_some() {
            DataPath::Interrupt
        } else {
            DataPath::Polling
        };

        let mut driver = Self {
            device: RegisterDevice::new(interface),
            rail,
            variant: ChipVariant::Mpu6880,
            map: ChipVariant::Mpu6880.register_map(),
            config: ChipConfig::default(),
            platform,
            data_path,
            chip_sleep: true,
            accel_poll: PollTimer::new(platform.accel_poll_ms),
            gyro_poll: PollTimer::new(platform.gyro_poll_ms),
            irq_armed: false,
            self_test: None,
        };

        driver.rail.set_power(true, delay).map_err(Error::Power)?;

        if let Err(e) = driver.bring_up(delay) {
            #[cfg(feature = "defmt")]
            defmt::error!("attach failed, powering down");
            if driver.rail.set_power(false, delay).is_err() {
                #[cfg(feature = "defmt")]
                defmt::warn!("rail still powered after failed attach");
            }
            return Err(e);
        }

        driver.rail.set_power(false, delay).map_err(Error::Power)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "{} attached, data path {}",
            driver.variant,
            driver.data_path
        );

        Ok(driver)
    }

    fn bring_up<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.identify()?;
        self.config.is_asleep = false;
        self.init_config(delay)?;
        self.init_engine(delay)?;
        if let Some(pin) = self.platform.interrupt {
            self.configure_interrupt_pin(&pin)?;
        }
        Ok(())
    }

    /// Cycle the sleep bit and read `WHO_AM_I`
    fn identify(&mut self) -> Result<ChipVariant, Error<I::Error>> {
        self.set_sleep(true)?;
        self.set_sleep(false)?;

        let who_am_i = self.read_who_am_i()?;
        let variant = ChipVariant::from_who_am_i(who_am_i).ok_or_else(|| {
            #[cfg(feature = "defmt")]
            defmt::error!("unsupported WHO_AM_I 0x{:02X}", who_am_i);
            Error::InvalidDevice(who_am_i)
        })?;

        self.variant = variant;
        self.map = variant.register_map();
        Ok(variant)
    }

    /// Put both engines in standby, gyro first
    ///
    /// Runs after the reset so `PWR_MGMT_2` matches the cleared enable flags.
    fn init_engine<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.switch_engine(Sensor::Gyro, false, delay)?;
        self.switch_engine(Sensor::Accel, false, delay)
    }

    /// Reset the chip and program the initial configuration
    fn init_config<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        if self.config.is_asleep {
            return Err(Error::InvalidState);
        }
        self.reset_chip(delay)?;
        self.config = ChipConfig::initial();
        self.apply_config()
    }

    /// Reset every register to its power-on value
    ///
    /// Polls the reset bit up to [`RESET_RETRY_COUNT`] times,
    /// [`RESET_WAIT_MS`] apart. The chip comes out of reset asleep.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResetTimeout`] if the reset bit never clears, or a bus
    /// error if communication fails.
    pub fn reset_chip<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.ensure_powered()?;

        // 0xCF: reset, sleep, temperature off, clock stopped
        self.device.pwr_mgmt_1().write(|w| {
            w.set_device_reset(true);
            w.set_sleep(true);
            w.set_temp_dis(true);
            w.set_clksel(7);
        })?;

        for _attempt in 0..RESET_RETRY_COUNT {
            let pwr_mgmt = self.device.pwr_mgmt_1().read()?;
            if !pwr_mgmt.device_reset() {
                self.chip_sleep = pwr_mgmt.sleep();
                #[cfg(feature = "defmt")]
                defmt::debug!("chip reset after {} polls", _attempt);
                return Ok(());
            }
            delay.delay_ms(RESET_WAIT_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::error!("chip did not leave reset");
        Err(Error::ResetTimeout)
    }

    /// Write the whole [`ChipConfig`] to the chip
    ///
    /// Order: gyro range, low pass filter, accel range, FIFO sources,
    /// low-power wake frequency (MPU6880 only), sample rate divider. The
    /// first failing write aborts; earlier writes are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn apply_config(&mut self) -> Result<(), Error<I::Error>> {
        let config = self.config;

        self.device.gyro_config().write(|w| {
            w.set_gyro_fs_sel(config.gyro_range as u8);
        })?;

        self.device.dlpf_config().write(|w| {
            w.set_dlpf_cfg(config.lpf as u8);
        })?;

        self.device.accel_config().write(|w| {
            w.set_accel_fs_sel(config.accel_range as u8);
        })?;

        self.device.fifo_en().modify(|w| {
            w.set_accel(config.accel_fifo_enable);
            w.set_gyro_xout(config.gyro_fifo_enable);
            w.set_gyro_yout(config.gyro_fifo_enable);
            w.set_gyro_zout(config.gyro_fifo_enable);
        })?;

        if self.variant.supports_lpa_freq() {
            self.device.pwr_mgmt_2().modify(|w| {
                w.set_lp_wake_ctrl(config.lpa_freq as u8);
            })?;
        }

        self.device.smplrt_div().write(|w| {
            w.set_smplrt_div(config.sample_rate_divider());
        })?;

        #[cfg(feature = "defmt")]
        defmt::debug!("configuration applied");
        Ok(())
    }

    /// Set or clear the chip sleep bit
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn set_sleep(&mut self, sleep: bool) -> Result<(), Error<I::Error>> {
        self.ensure_powered()?;
        self.device.pwr_mgmt_1().modify(|w| {
            w.set_sleep(sleep);
        })?;
        self.chip_sleep = sleep;
        Ok(())
    }

    /// Select the chip clock source
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Error<I::Error>> {
        self.ensure_powered()?;
        self.device.pwr_mgmt_1().modify(|w| {
            w.set_clksel(source as u8);
        })?;
        Ok(())
    }

    /// Take one engine in or out of standby
    ///
    /// The gyro PLL can only clock the chip while the gyro runs, so the
    /// clock moves to the internal oscillator before the gyro stops and to
    /// the PLL once it has been up for [`SENSOR_UP_TIME_MS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off or the gyro reports
    /// standby after being enabled, or a bus error if communication fails.
    pub fn switch_engine<D>(
        &mut self,
        sensor: Sensor,
        enable: bool,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.ensure_powered()?;
        let standby = !enable;
        match sensor {
            Sensor::Accel => {
                self.device.pwr_mgmt_2().modify(|w| {
                    w.set_disable_xa(standby);
                    w.set_disable_ya(standby);
                    w.set_disable_za(standby);
                })?;
            }
            Sensor::Gyro => {
                if !enable {
                    self.set_clock_source(ClockSource::Internal)?;
                }

                self.device.pwr_mgmt_2().modify(|w| {
                    w.set_disable_xg(standby);
                    w.set_disable_yg(standby);
                    w.set_disable_zg(standby);
                })?;

                if enable {
                    let pwr_mgmt = self.device.pwr_mgmt_2().read()?;
                    if pwr_mgmt.disable_xg() || pwr_mgmt.disable_yg() || pwr_mgmt.disable_zg() {
                        #[cfg(feature = "defmt")]
                        defmt::error!("gyro engine still in standby");
                        return Err(Error::InvalidState);
                    }
                    delay.delay_ms(SENSOR_UP_TIME_MS);
                    self.set_clock_source(ClockSource::Pll)?;
                }
            }
        }
        Ok(())
    }

    /// Turn one engine on or off and keep the sleep bit consistent
    ///
    /// Enabling wakes the chip. Disabling puts it to sleep only when the
    /// other engine is off as well.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] while suspended, or a bus error if
    /// communication fails.
    pub fn engine_enable<D>(
        &mut self,
        sensor: Sensor,
        on: bool,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        if self.config.is_asleep {
            #[cfg(feature = "defmt")]
            defmt::warn!("cannot switch {} engine while asleep", sensor);
            return Err(Error::InvalidState);
        }

        self.switch_engine(sensor, on, delay)?;
        self.config.set_engine_enabled(sensor, on);

        if on {
            self.set_sleep(false)?;
            self.config.enable = true;
        } else if !self.config.engine_enabled(sensor.other()) {
            self.set_sleep(true)?;
            self.config.enable = false;
        }
        Ok(())
    }

    /// Enable or disable one logical sensor
    ///
    /// The first enable powers the rail, wakes the chip and replays the
    /// configuration. Producers start after the engine is on and stop before
    /// it is turned off. The rail stays powered after the last disable.
    /// Disabling a sensor that is already off touches no register.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] while suspended, [`Error::Power`] if
    /// the rail cannot be powered, or a bus error if communication fails.
    pub fn set_enable<D>(
        &mut self,
        sensor: Sensor,
        on: bool,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        if self.config.is_asleep {
            return Err(Error::InvalidState);
        }

        if on {
            if !self.config.enable {
                self.rail.set_power(true, delay).map_err(Error::Power)?;
                self.set_sleep(false)?;
                self.apply_config()?;
            }
            self.engine_enable(sensor, true, delay)?;
            self.start_producer(sensor)?;
        } else if self.config.engine_enabled(sensor) {
            self.stop_producer(sensor)?;
            self.engine_enable(sensor, false, delay)?;
        } else {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("{} enable = {}", sensor, on);
        Ok(())
    }

    /// Whether a logical sensor is enabled
    #[must_use]
    pub const fn is_enabled(&self, sensor: Sensor) -> bool {
        self.config.engine_enabled(sensor)
    }

    fn start_producer(&mut self, sensor: Sensor) -> Result<(), Error<I::Error>> {
        match self.data_path {
            DataPath::Polling => {
                self.timer_mut(sensor).schedule();
                Ok(())
            }
            DataPath::Interrupt if !self.irq_armed => self.arm_interrupt(),
            DataPath::Interrupt => Ok(()),
        }
    }

    fn stop_producer(&mut self, sensor: Sensor) -> Result<(), Error<I::Error>> {
        match self.data_path {
            DataPath::Polling => {
                self.timer_mut(sensor).cancel();
                Ok(())
            }
            // The line serves both sensors
            DataPath::Interrupt if !self.config.engine_enabled(sensor.other()) => {
                self.disarm_interrupt()
            }
            DataPath::Interrupt => Ok(()),
        }
    }

    /// Program the interrupt pin electrical configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configure_interrupt_pin(
        &mut self,
        config: &InterruptPinConfig,
    ) -> Result<(), Error<I::Error>> {
        self.device.int_pin_cfg().write(|w| {
            w.set_actl(config.active_low);
            w.set_int_open(config.open_drain);
            w.set_latch_int_en(config.latch_enabled);
            w.set_int_anyrd_clear(config.clear_on_any_read);
        })?;
        Ok(())
    }

    /// Arm the data-ready interrupt
    fn arm_interrupt(&mut self) -> Result<(), Error<I::Error>> {
        if let Some(pin) = self.platform.interrupt {
            self.configure_interrupt_pin(&pin)?;
        }
        self.device.int_enable().write(|w| {
            w.set_raw_rdy_en(true);
        })?;
        self.irq_armed = true;
        Ok(())
    }

    /// Disarm the data-ready interrupt; the chip is only touched while powered
    fn disarm_interrupt(&mut self) -> Result<(), Error<I::Error>> {
        self.irq_armed = false;
        if self.rail.is_powered() {
            self.device.int_enable().write(|w| {
                w.set_raw_rdy_en(false);
            })?;
        }
        Ok(())
    }

    /// Whether the interrupt line should be enabled at the host
    #[must_use]
    pub const fn interrupt_armed(&self) -> bool {
        self.irq_armed
    }

    /// Read and decode INT_STATUS
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_interrupt_status(&mut self) -> Result<InterruptStatus, Error<I::Error>> {
        self.ensure_powered()?;
        let status = self.device.int_status().read()?;
        Ok(InterruptStatus {
            raw_data_ready: status.raw_data_rdy_int(),
            fsync: status.fsync_int(),
            fifo_overflow: status.fifo_oflow_int(),
            wake_on_motion: status.wom_int(),
        })
    }

    /// Change the poll interval of one sensor
    ///
    /// The value is clamped to 5..=5000 ms. An enabled sensor is rescheduled
    /// with the new interval. Returns the interval now in effect.
    pub fn set_poll_interval(&mut self, sensor: Sensor, interval_ms: u32) -> u32 {
        let reschedule = self.data_path == DataPath::Polling
            && !self.config.is_asleep
            && self.config.engine_enabled(sensor);

        let timer = self.timer_mut(sensor);
        let effective = timer.set_interval(interval_ms);
        if reschedule {
            timer.cancel();
            timer.schedule();
        }
        effective
    }

    /// Current poll interval of one sensor, in ms
    #[must_use]
    pub const fn poll_interval(&self, sensor: Sensor) -> u32 {
        match sensor {
            Sensor::Accel => self.accel_poll.interval_ms(),
            Sensor::Gyro => self.gyro_poll.interval_ms(),
        }
    }

    fn timer_mut(&mut self, sensor: Sensor) -> &mut PollTimer {
        match sensor {
            Sensor::Accel => &mut self.accel_poll,
            Sensor::Gyro => &mut self.gyro_poll,
        }
    }

    /// Earliest pending poll deadline, `None` when no timer is armed
    #[must_use]
    pub fn next_poll_deadline(&self) -> Option<u64> {
        match (self.accel_poll.deadline(), self.gyro_poll.deadline()) {
            (Some(a), Some(g)) => Some(a.min(g)),
            (a, g) => a.or(g),
        }
    }

    /// Run the poll timers at `now_ms`
    ///
    /// Every due timer of an enabled sensor reads, remaps and publishes one
    /// sample, then re-arms for `now_ms + interval`. Returns the next
    /// deadline. Does nothing on the interrupt data path.
    ///
    /// # Errors
    ///
    /// Returns the bus error of a failed read. The failing timer is already
    /// re-armed, so polling continues on the next deadline.
    pub fn service_poll<S>(
        &mut self,
        now_ms: u64,
        sink: &mut S,
    ) -> Result<Option<u64>, Error<I::Error>>
    where
        S: SampleSink + ?Sized,
    {
        if self.data_path != DataPath::Polling {
            return Ok(None);
        }

        let remap = self.platform.remap.polling;
        for sensor in [Sensor::Accel, Sensor::Gyro] {
            if !self.timer_mut(sensor).is_due(now_ms) {
                continue;
            }
            if !self.config.engine_enabled(sensor) || self.config.is_asleep {
                self.timer_mut(sensor).cancel();
                continue;
            }
            self.timer_mut(sensor).rearm(now_ms);
            self.emit_sample(sensor, remap, sink)?;
        }

        Ok(self.next_poll_deadline())
    }

    /// Handle one data-ready interrupt
    ///
    /// Reads accelerometer then gyroscope and publishes both, in that order.
    /// Returns `false` without touching the bus when the line is not armed.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails; nothing is
    /// published in that case.
    pub fn handle_interrupt<S>(&mut self, sink: &mut S) -> Result<bool, Error<I::Error>>
    where
        S: SampleSink + ?Sized,
    {
        if !self.irq_armed {
            return Ok(false);
        }

        let remap = self.platform.remap.interrupt;
        let accel = self.sample(Sensor::Accel, remap)?;
        let gyro = self.sample(Sensor::Gyro, remap)?;
        sink.publish(accel);
        sink.publish(gyro);
        Ok(true)
    }

    /// Read, optionally remap, and publish one sensor
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn emit_sample<S>(
        &mut self,
        sensor: Sensor,
        remap: bool,
        sink: &mut S,
    ) -> Result<(), Error<I::Error>>
    where
        S: SampleSink + ?Sized,
    {
        let event = self.sample(sensor, remap)?;
        sink.publish(event);
        Ok(())
    }

    fn sample(&mut self, sensor: Sensor, apply_remap: bool) -> Result<SampleEvent, Error<I::Error>> {
        let address = match sensor {
            Sensor::Accel => self.map.raw_accel,
            Sensor::Gyro => self.map.raw_gyro,
        };
        let mut axes = self.read_block(address)?;
        if apply_remap {
            axes = remap::remap(axes, self.platform.place, sensor);
        }
        Ok(match sensor {
            Sensor::Accel => SampleEvent::Accel(AccelData::from(axes)),
            Sensor::Gyro => SampleEvent::Gyro(GyroData::from(axes)),
        })
    }

    /// Read three big-endian axes in one burst
    fn read_block(&mut self, address: u8) -> Result<[i16; 3], Error<I::Error>> {
        let mut buffer = [0u8; 6];
        self.device
            .interface
            .read_register(address, 48, &mut buffer)?;

        Ok([
            i16::from_be_bytes([buffer[0], buffer[1]]),
            i16::from_be_bytes([buffer[2], buffer[3]]),
            i16::from_be_bytes([buffer[4], buffer[5]]),
        ])
    }

    /// Read accelerometer data as stored by the chip, without remapping
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_accel(&mut self) -> Result<AccelData, Error<I::Error>> {
        self.ensure_powered()?;
        self.read_block(self.map.raw_accel).map(AccelData::from)
    }

    /// Read gyroscope data as stored by the chip, without remapping
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_gyro(&mut self) -> Result<GyroData, Error<I::Error>> {
        self.ensure_powered()?;
        self.read_block(self.map.raw_gyro).map(GyroData::from)
    }

    /// Read both sensors back to back
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_all(&mut self) -> Result<AxisSample, Error<I::Error>> {
        Ok(AxisSample {
            accel: self.read_accel()?,
            gyro: self.read_gyro()?,
        })
    }

    /// Read one sensor re-oriented for the board placement
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_snapshot(&mut self, sensor: Sensor) -> Result<[i16; 3], Error<I::Error>> {
        self.ensure_powered()?;
        match self.sample(sensor, true)? {
            SampleEvent::Accel(data) => Ok(data.to_array()),
            SampleEvent::Gyro(data) => Ok(data.to_array()),
        }
    }

    /// Read the accelerometer in g, re-oriented, using the configured range
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_accel_g(&mut self) -> Result<AccelDataG, Error<I::Error>> {
        let raw = AccelData::from(self.read_snapshot(Sensor::Accel)?);
        Ok(AccelDataG::from_raw(raw, self.config.accel_range))
    }

    /// Read the gyroscope in °/s, re-oriented, using the configured range
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_gyro_dps(&mut self) -> Result<GyroDataDps, Error<I::Error>> {
        let raw = GyroData::from(self.read_snapshot(Sensor::Gyro)?);
        Ok(GyroDataDps::from_raw(raw, self.config.gyro_range))
    }

    /// Read the raw die temperature
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_temperature(&mut self) -> Result<i16, Error<I::Error>> {
        self.ensure_powered()?;
        let mut buffer = [0u8; 2];
        self.device
            .interface
            .read_register(self.map.temperature, 16, &mut buffer)?;
        Ok(i16::from_be_bytes(buffer))
    }

    /// Convert raw temperature to degrees Celsius
    #[must_use]
    pub fn temperature_to_celsius(raw: i16) -> f32 {
        f32::from(raw) / 333.87 + 21.0
    }

    /// Read the `WHO_AM_I` register
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        self.ensure_powered()?;
        Ok(self.device.who_am_i().read()?.who_am_i())
    }

    /// Read any register by address
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn read_register(&mut self, address: u8) -> Result<u8, Error<I::Error>> {
        self.ensure_powered()?;
        let mut value = [0u8; 1];
        self.device
            .interface
            .read_register(address, 8, &mut value)?;
        Ok(value[0])
    }

    /// Write any register by address
    ///
    /// Bypasses [`ChipConfig`]; the next [`apply_config`](Self::apply_config)
    /// or reset overwrites configuration registers written this way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] if the rail is off, or a bus error if
    /// communication fails.
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), Error<I::Error>> {
        self.ensure_powered()?;
        self.device
            .interface
            .write_register(address, 8, &[value])?;
        Ok(())
    }

    /// Change the gyroscope range
    ///
    /// # Errors
    ///
    /// Returns an error if the chip is powered and the write fails.
    pub fn set_gyro_range(&mut self, range: GyroFullScale) -> Result<(), Error<I::Error>> {
        self.config.gyro_range = range;
        self.apply_if_live()
    }

    /// Change the accelerometer range
    ///
    /// # Errors
    ///
    /// Returns an error if the chip is powered and the write fails.
    pub fn set_accel_range(&mut self, range: AccelFullScale) -> Result<(), Error<I::Error>> {
        self.config.accel_range = range;
        self.apply_if_live()
    }

    /// Change the digital low pass filter
    ///
    /// # Errors
    ///
    /// Returns an error if the chip is powered and the write fails.
    pub fn set_low_pass_filter(&mut self, lpf: LowPassFilter) -> Result<(), Error<I::Error>> {
        self.config.lpf = lpf;
        self.apply_if_live()
    }

    /// Change the output data rate in Hz
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a zero rate, or an error if the
    /// chip is powered and the write fails.
    pub fn set_fifo_rate(&mut self, rate_hz: u16) -> Result<(), Error<I::Error>> {
        if rate_hz == 0 {
            return Err(Error::InvalidArgument);
        }
        self.config.fifo_rate = rate_hz;
        self.apply_if_live()
    }

    /// Route one sensor's samples to the FIFO
    ///
    /// # Errors
    ///
    /// Returns an error if the chip is powered and the write fails.
    pub fn set_fifo_enable(&mut self, sensor: Sensor, on: bool) -> Result<(), Error<I::Error>> {
        match sensor {
            Sensor::Accel => self.config.accel_fifo_enable = on,
            Sensor::Gyro => self.config.gyro_fifo_enable = on,
        }
        self.apply_if_live()
    }

    fn apply_if_live(&mut self) -> Result<(), Error<I::Error>> {
        if self.rail.is_powered() && !self.config.is_asleep {
            self.apply_config()
        } else {
            Ok(())
        }
    }

    /// Run the gyroscope self-test with `samples` readings per phase
    ///
    /// The chip configuration, engine state, sleep bit and interrupt enable
    /// are restored afterwards, also when the capture fails. The verdict is
    /// kept and returned by [`self_test_result`](Self::self_test_result).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if `samples` exceeds
    /// [`MAX_SELF_TEST_SAMPLES`], [`Error::InvalidState`] if the rail is off
    /// or the driver is suspended, or a bus error if communication fails.
    pub fn run_self_test<D>(
        &mut self,
        samples: NonZeroU16,
        delay: &mut D,
    ) -> Result<SelfTestReport, Error<I::Error>>
    where
        D: DelayNs,
    {
        let count = usize::from(samples.get());
        if count > MAX_SELF_TEST_SAMPLES {
            return Err(Error::ResourceExhausted);
        }
        self.ensure_powered()?;
        if self.config.is_asleep {
            return Err(Error::InvalidState);
        }

        let outcome = self.self_test_sequence(count, delay);
        let restored = self.restore_after_self_test(delay);
        let report = outcome?;
        restored?;

        #[cfg(feature = "defmt")]
        defmt::info!("self-test {}", report.result);

        self.self_test = Some(report.result);
        Ok(report)
    }

    fn self_test_sequence<D: DelayNs>(
        &mut self,
        count: usize,
        delay: &mut D,
    ) -> Result<SelfTestReport, Error<I::Error>> {
        for (address, value) in MEASUREMENT_MODE {
            self.device
                .interface
                .write_register(address, 8, &[value])?;
        }
        self.chip_sleep = false;
        delay.delay_ms(NORMAL_MODE_SETTLE_MS);

        let baseline = self.capture_gyro(count)?;

        self.device.gyro_config().modify(|w| {
            w.set_xg_st(true);
            w.set_yg_st(true);
            w.set_zg_st(true);
        })?;
        delay.delay_us(EXCITATION_SETTLE_US);

        let excited = self.capture_gyro(count)?;

        let range = GyroFullScale::from_bits(self.device.gyro_config().read()?.gyro_fs_sel());
        Ok(SelfTestReport {
            range,
            baseline,
            excited,
            result: self_test::classify(range, baseline, excited),
        })
    }

    fn capture_gyro(&mut self, count: usize) -> Result<[i32; 3], Error<I::Error>> {
        let mut samples = CaptureBuffer::new();
        for _ in 0..count {
            let axes = self.read_block(self.map.raw_gyro)?;
            samples
                .push(GyroData::from(axes))
                .map_err(|_| Error::ResourceExhausted)?;
        }
        Ok(self_test::average(&samples))
    }

    fn restore_after_self_test<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.device.gyro_config().modify(|w| {
            w.set_xg_st(false);
            w.set_yg_st(false);
            w.set_zg_st(false);
        })?;
        self.device.user_ctrl().write(|_| {})?;
        self.apply_config()?;

        let accel_standby = !self.config.accel_enable;
        let gyro_standby = !self.config.gyro_enable;
        self.device.pwr_mgmt_2().modify(|w| {
            w.set_disable_xa(accel_standby);
            w.set_disable_ya(accel_standby);
            w.set_disable_za(accel_standby);
            w.set_disable_xg(gyro_standby);
            w.set_disable_yg(gyro_standby);
            w.set_disable_zg(gyro_standby);
        })?;
        if self.config.gyro_enable {
            delay.delay_ms(SENSOR_UP_TIME_MS);
            self.set_clock_source(ClockSource::Pll)?;
        }
        self.set_sleep(!self.config.enable)?;

        if self.irq_armed {
            self.arm_interrupt()?;
        }
        Ok(())
    }

    /// Last self-test verdict, `None` before the first completed run
    #[must_use]
    pub const fn self_test_result(&self) -> Option<SelfTestResult> {
        self.self_test
    }

    /// Stop producers, put the chip to sleep and power the rail off
    ///
    /// A failure to set the sleep bit is logged and ignored; the rail is cut
    /// anyway.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Power`] if the rail cannot be switched off.
    pub fn suspend<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.accel_poll.cancel();
        self.gyro_poll.cancel();
        if self.irq_armed && self.disarm_interrupt().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to disable data-ready interrupt on suspend");
        }

        self.config.is_asleep = true;

        if self.rail.is_powered() && self.set_sleep(true).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to set sleep bit on suspend");
        }

        self.rail.set_power(false, delay).map_err(Error::Power)?;

        #[cfg(feature = "defmt")]
        defmt::info!("suspended");
        Ok(())
    }

    /// Power up, reset and restore the state held before [`suspend`](Self::suspend)
    ///
    /// Order: rail on, chip reset, configuration replay (or sleep when
    /// nothing is enabled), gyro then accelerometer engine, then producers.
    /// No sample is read before the configuration is back.
    ///
    /// # Errors
    ///
    /// Any failure leaves the driver suspended, so later enables fail with
    /// [`Error::InvalidState`] until a resume succeeds.
    pub fn resume<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let result = self.restore(delay);
        if result.is_err() {
            #[cfg(feature = "defmt")]
            defmt::error!("resume failed, staying asleep");
            self.config.is_asleep = true;
        } else {
            #[cfg(feature = "defmt")]
            defmt::info!("resumed");
        }
        result
    }

    fn restore<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        self.rail.set_power(true, delay).map_err(Error::Power)?;
        self.reset_chip(delay)?;
        self.config.is_asleep = false;

        if self.config.enable {
            self.apply_config()?;
            self.set_sleep(false)?;
        } else {
            self.set_sleep(true)?;
        }

        let accel = self.config.accel_enable;
        let gyro = self.config.gyro_enable;
        if gyro {
            self.engine_enable(Sensor::Gyro, true, delay)?;
        }
        if accel {
            self.engine_enable(Sensor::Accel, true, delay)?;
        }

        if gyro {
            self.start_producer(Sensor::Gyro)?;
        }
        if accel {
            self.start_producer(Sensor::Accel)?;
        }
        Ok(())
    }

    /// Stop producers, power the rail off and hand back the interface and rail
    pub fn release<D>(mut self, delay: &mut D) -> (I, P)
    where
        D: DelayNs,
    {
        self.accel_poll.cancel();
        self.gyro_poll.cancel();
        if self.irq_armed && self.disarm_interrupt().is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("failed to disable data-ready interrupt on release");
        }
        if self.rail.set_power(false, delay).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("rail still powered at release");
        }
        (self.device.interface, self.rail)
    }

    fn ensure_powered(&self) -> Result<(), Error<I::Error>> {
        if self.rail.is_powered() {
            Ok(())
        } else {
            Err(Error::InvalidState)
        }
    }

    /// Current chip configuration record
    #[must_use]
    pub const fn config(&self) -> &ChipConfig {
        &self.config
    }

    /// Board configuration supplied at attach
    #[must_use]
    pub const fn platform(&self) -> &PlatformConfig {
        &self.platform
    }

    /// Detected chip variant
    #[must_use]
    pub const fn variant(&self) -> ChipVariant {
        self.variant
    }

    /// Whether the detected part is an MPU6880
    #[must_use]
    pub const fn is_mpu6880(&self) -> bool {
        matches!(self.variant, ChipVariant::Mpu6880)
    }

    /// Data path chosen at attach
    #[must_use]
    pub const fn data_path(&self) -> DataPath {
        self.data_path
    }

    /// Rail and sleep state
    #[must_use]
    pub fn power_state(&self) -> PowerState {
        PowerState {
            rail_powered: self.rail.is_powered(),
            chip_sleep: self.chip_sleep,
        }
    }

    /// Get a reference to the underlying register device (for advanced usage)
    pub const fn device(&self) -> &RegisterDevice<I> {
        &self.device
    }

    /// Get a mutable reference to the underlying register device (for advanced usage)
    pub const fn device_mut(&mut self) -> &mut RegisterDevice<I> {
        &mut self.device
    }

    /// Get a reference to the supply rail
    pub const fn rail(&self) -> &P {
        &self.rail
    }
}
