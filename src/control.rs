//! Typed control surface
//!
//! [`Command`] and [`Response`] cover everything a host exposes for the two
//! logical sensors: enable state, poll interval, self-test, raw snapshots,
//! sensor metadata and register debug access. [`Mpu6880::dispatch`] handles
//! every command exhaustively.

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::power::RailControl;
use crate::self_test::parse_sample_count;
use crate::sensors::{Sensor, SensorInfo};
use crate::{Error, Mpu6880};

/// Request addressed to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Enable or disable one sensor
    SetEnable {
        /// Target sensor
        sensor: Sensor,
        /// Requested state
        on: bool,
    },
    /// Query the enable state of one sensor
    GetEnable(Sensor),
    /// Change the poll interval of one sensor, in ms
    SetPollInterval {
        /// Target sensor
        sensor: Sensor,
        /// Requested interval, clamped to 5..=5000
        ms: u32,
    },
    /// Query the poll interval of one sensor
    GetPollInterval(Sensor),
    /// Run the gyroscope self-test; `samples` is a decimal count per phase
    RunSelfTest {
        /// Sample count as text; zero or garbage is accepted and ignored
        samples: &'a str,
    },
    /// Query the last self-test verdict
    ReadSelfTestResult,
    /// Read one re-oriented sample
    RawData(Sensor),
    /// Read a register
    ReadRegister(u8),
    /// Write a register
    WriteRegister {
        /// Register address
        address: u8,
        /// Value to write
        value: u8,
    },
    /// Query static metadata of one sensor
    SensorInfo(Sensor),
}

/// Answer to a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Command done, nothing to report
    Ack,
    /// Enable state
    Enabled(bool),
    /// Poll interval in effect, in ms
    PollInterval(u32),
    /// `'y'` or `'n'`, `None` before the first completed self-test
    SelfTestResult(Option<char>),
    /// Re-oriented x, y, z
    RawData([i16; 3]),
    /// Register value
    Register(u8),
    /// Sensor metadata
    Info(&'static SensorInfo),
}

impl<I, P> Mpu6880<I, P>
where
    I: RegisterInterface<AddressType = u8>,
    P: RailControl,
{
    /// Execute one control command
    ///
    /// # Errors
    ///
    /// Forwards the error of the underlying operation.
    ///
    /// # Example
    /// ```ignore
    /// let response = imu.dispatch(Command::GetPollInterval(Sensor::Gyro), &mut delay)?;
    /// assert_eq!(response, Response::PollInterval(200));
    /// ```
    pub fn dispatch<D>(
        &mut self,
        command: Command<'_>,
        delay: &mut D,
    ) -> Result<Response, Error<I::Error>>
    where
        D: DelayNs,
    {
        let response = match command {
            Command::SetEnable { sensor, on } => {
                self.set_enable(sensor, on, delay)?;
                Response::Ack
            }
            Command::GetEnable(sensor) => Response::Enabled(self.is_enabled(sensor)),
            Command::SetPollInterval { sensor, ms } => {
                Response::PollInterval(self.set_poll_interval(sensor, ms))
            }
            Command::GetPollInterval(sensor) => Response::PollInterval(self.poll_interval(sensor)),
            Command::RunSelfTest { samples } => {
                if let Some(count) = parse_sample_count(samples) {
                    self.run_self_test(count, delay)?;
                } else {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("ignoring self-test request without a sample count");
                }
                Response::Ack
            }
            Command::ReadSelfTestResult => {
                Response::SelfTestResult(self.self_test_result().map(|r| r.as_char()))
            }
            Command::RawData(sensor) => Response::RawData(self.read_snapshot(sensor)?),
            Command::ReadRegister(address) => Response::Register(self.read_register(address)?),
            Command::WriteRegister { address, value } => {
                self.write_register(address, value)?;
                Response::Ack
            }
            Command::SensorInfo(sensor) => Response::Info(sensor.info()),
        };
        Ok(response)
    }
}
