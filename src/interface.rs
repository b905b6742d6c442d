//! Bus interface implementations for the MPU6880
//!
//! This module provides implementations of the `device-driver` register
//! interface for I2C and SPI, plus [`Retry`], a wrapper that retries failed
//! register reads and writes with a fixed backoff.

use crate::{Error, I2C_ADDRESS_AD0_LOW};
use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

/// Number of attempts made for a register transfer before giving up
pub const BUS_ATTEMPTS: u8 = 5;

/// Delay between two transfer attempts
pub const BUS_BACKOFF_MS: u32 = 10;

/// I2C interface for the MPU6880
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Create a new I2C interface with the default address (0x68, AD0 pin LOW)
    ///
    /// # Example
    /// ```ignore
    /// let interface = I2cInterface::default(i2c);
    /// let imu = Mpu6880::attach(interface, rail, platform, &mut delay)?;
    /// ```
    pub const fn default(i2c: I2C) -> Self {
        Self {
            i2c,
            address: I2C_ADDRESS_AD0_LOW,
        }
    }

    /// Create a new I2C interface with the alternative address (0x69, AD0 pin HIGH)
    pub const fn alternative(i2c: I2C) -> Self {
        Self {
            i2c,
            address: crate::I2C_ADDRESS_AD0_HIGH,
        }
    }

    /// Create a new I2C interface with a custom device address
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Device address used on the bus
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Consume the interface and return the I2C peripheral
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, E> RegisterInterface for I2cInterface<I2C>
where
    I2C: embedded_hal::i2c::I2c<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[address], read_data)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        // Registers are at most 6 bytes wide; a short frame is plenty
        let mut frame = [0u8; 9];
        frame[0] = address;
        let len = write_data.len().min(frame.len() - 1);
        frame[1..=len].copy_from_slice(&write_data[..len]);

        self.i2c.write(self.address, &frame[..=len])
    }
}

/// SPI interface for the MPU6880
///
/// Chip select is owned by the `SpiDevice` implementation you provide
/// (for example `embedded_hal_bus::spi::ExclusiveDevice`).
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Create a new SPI interface with the given SPI device
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the interface and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, E> RegisterInterface for SpiInterface<SPI>
where
    SPI: embedded_hal::spi::SpiDevice<Error = E>,
{
    type Error = Error<E>;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        // MSB set selects a read
        let mut operations = [
            embedded_hal::spi::Operation::Write(&[address | 0x80]),
            embedded_hal::spi::Operation::Read(read_data),
        ];

        self.spi.transaction(&mut operations).map_err(Error::Bus)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut frame = [0u8; 9];
        frame[0] = address & 0x7F;
        let len = write_data.len().min(frame.len() - 1);
        frame[1..=len].copy_from_slice(&write_data[..len]);

        self.spi.write(&frame[..=len]).map_err(Error::Bus)
    }
}

/// Register interface wrapper with bounded retries
///
/// Every register read and write is attempted up to [`BUS_ATTEMPTS`] times
/// with [`BUS_BACKOFF_MS`] between attempts; the last error is returned when
/// all attempts fail.
///
/// ```ignore
/// let interface = Retry::new(I2cInterface::default(i2c), delay);
/// ```
pub struct Retry<I, D> {
    inner: I,
    delay: D,
}

impl<I, D> Retry<I, D> {
    /// Wrap an interface, using `delay` for the backoff
    pub const fn new(inner: I, delay: D) -> Self {
        Self { inner, delay }
    }

    /// Unwrap and return the inner interface and delay
    pub fn release(self) -> (I, D) {
        (self.inner, self.delay)
    }
}

impl<I, D> Retry<I, D>
where
    D: DelayNs,
{
    fn with_retry<T, E>(
        &mut self,
        _address: u8,
        mut transfer: impl FnMut(&mut I) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match transfer(&mut self.inner) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= BUS_ATTEMPTS => {
                    #[cfg(feature = "defmt")]
                    defmt::error!("transfer at 0x{:02X} failed after {} attempts", _address, attempt);
                    return Err(e);
                }
                Err(_) => {
                    attempt += 1;
                    self.delay.delay_ms(BUS_BACKOFF_MS);
                }
            }
        }
    }
}

impl<I, D> RegisterInterface for Retry<I, D>
where
    I: RegisterInterface<AddressType = u8>,
    D: DelayNs,
{
    type Error = I::Error;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.with_retry(address, |inner| inner.read_register(address, size_bits, read_data))
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        self.with_retry(address, |inner| inner.write_register(address, size_bits, write_data))
    }
}
