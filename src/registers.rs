//! Register definitions for the MPU6880 / MPU6500
//!
//! Both variants share one flat register space (no banking). Typed access to
//! the configuration registers is generated by `device-driver`; the sensor
//! output blocks are read as raw bursts through [`RegisterMap`] addresses.

use crate::{WHO_AM_I_MPU6500, WHO_AM_I_MPU6880};

device_driver::create_device!(
    device_name: Mpu6880Registers,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = BE;
        }

        /// SMPLRT_DIV - Sample Rate Divider (0x19)
        /// Sample rate = internal rate / (1 + divider)
        register SmplrtDiv {
            const ADDRESS = 0x19;
            const SIZE_BITS = 8;

            smplrt_div: uint = 0..8,
        },

        /// CONFIG - FIFO mode, FSYNC and gyro DLPF (0x1A)
        register DlpfConfig {
            const ADDRESS = 0x1A;
            const SIZE_BITS = 8;

            /// Digital low pass filter setting
            dlpf_cfg: uint = 0..3,
            /// External FSYNC pin sampling
            ext_sync_set: uint = 3..6,
            /// Do not overwrite when the FIFO is full
            fifo_mode: bool = 6,
        },

        /// GYRO_CONFIG - Gyroscope full scale and self-test (0x1B)
        register GyroConfig {
            const ADDRESS = 0x1B;
            const SIZE_BITS = 8;

            /// DLPF bypass
            fchoice_b: uint = 0..2,
            /// Full scale select (0=250, 1=500, 2=1000, 3=2000 dps)
            gyro_fs_sel: uint = 3..5,
            /// Z gyro self-test
            zg_st: bool = 5,
            /// Y gyro self-test
            yg_st: bool = 6,
            /// X gyro self-test
            xg_st: bool = 7,
        },

        /// ACCEL_CONFIG - Accelerometer full scale and self-test (0x1C)
        register AccelConfig {
            const ADDRESS = 0x1C;
            const SIZE_BITS = 8;

            /// Full scale select (0=2g, 1=4g, 2=8g, 3=16g)
            accel_fs_sel: uint = 3..5,
            za_st: bool = 5,
            ya_st: bool = 6,
            xa_st: bool = 7,
        },

        /// ACCEL_CONFIG_2 - Accelerometer DLPF (0x1D)
        register AccelConfig2 {
            const ADDRESS = 0x1D;
            const SIZE_BITS = 8;

            accel_dlpf_cfg: uint = 0..3,
            accel_fchoice_b: bool = 3,
        },

        /// FIFO_EN - Sensor FIFO enables (0x23)
        register FifoEn {
            const ADDRESS = 0x23;
            const SIZE_BITS = 8;

            slave_fifo_en: uint = 0..3,
            /// Accelerometer X/Y/Z to FIFO
            accel: bool = 3,
            gyro_zout: bool = 4,
            gyro_yout: bool = 5,
            gyro_xout: bool = 6,
            temp_out: bool = 7,
        },

        /// INT_PIN_CFG - Interrupt pin configuration (0x37)
        register IntPinCfg {
            const ADDRESS = 0x37;
            const SIZE_BITS = 8;

            /// Auxiliary bus bypass
            bypass_en: bool = 1,
            fsync_int_mode_en: bool = 2,
            actl_fsync: bool = 3,
            /// Clear status on any read
            int_anyrd_clear: bool = 4,
            /// Hold the pin level until cleared
            latch_int_en: bool = 5,
            /// Open drain output
            int_open: bool = 6,
            /// Active low
            actl: bool = 7,
        },

        /// INT_ENABLE - Interrupt enable (0x38)
        register IntEnable {
            const ADDRESS = 0x38;
            const SIZE_BITS = 8;

            /// Raw sensor data ready
            raw_rdy_en: bool = 0,
            fsync_int_en: bool = 3,
            fifo_oflow_en: bool = 4,
            wom_en: bool = 6,
        },

        /// INT_STATUS - Interrupt status (0x3A)
        register IntStatus {
            const ADDRESS = 0x3A;
            const SIZE_BITS = 8;

            raw_data_rdy_int: bool = 0,
            fsync_int: bool = 3,
            fifo_oflow_int: bool = 4,
            wom_int: bool = 6,
        },

        /// USER_CTRL - User control (0x6A)
        register UserCtrl {
            const ADDRESS = 0x6A;
            const SIZE_BITS = 8;

            /// Reset signal paths and sensor registers
            sig_cond_rst: bool = 0,
            /// Auxiliary master reset
            mst_rst: bool = 1,
            /// FIFO reset
            fifo_rst: bool = 2,
            /// Disable the serial slave interface (SPI only)
            if_dis: bool = 4,
            /// Auxiliary master enable
            mst_en: bool = 5,
            /// FIFO enable
            fifo_en: bool = 6,
        },

        /// PWR_MGMT_1 - Power management 1 (0x6B)
        register PwrMgmt1 {
            const ADDRESS = 0x6B;
            const SIZE_BITS = 8;

            /// Clock source select (0=internal 20MHz, 1=gyro X PLL)
            clksel: uint = 0..3,
            /// Temperature sensor disable
            temp_dis: bool = 3,
            /// Gyro standby (drive kept on, sense path off)
            gyro_standby: bool = 4,
            /// Cycle between sleep and one sample
            cycle: bool = 5,
            /// Sleep mode enable
            sleep: bool = 6,
            /// Device reset
            device_reset: bool = 7,
        },

        /// PWR_MGMT_2 - Power management 2 (0x6C)
        register PwrMgmt2 {
            const ADDRESS = 0x6C;
            const SIZE_BITS = 8;

            disable_zg: bool = 0,
            disable_yg: bool = 1,
            disable_xg: bool = 2,
            disable_za: bool = 3,
            disable_ya: bool = 4,
            disable_xa: bool = 5,
            /// Low-power accelerometer wake frequency (MPU6880 only)
            lp_wake_ctrl: uint = 6..8,
        },

        /// WHO_AM_I - Device ID (0x75)
        register WhoAmI {
            const ADDRESS = 0x75;
            const SIZE_BITS = 8;

            who_am_i: uint = 0..8,
        },
    }
);

/// Supported chip variants, detected from `WHO_AM_I`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipVariant {
    /// InvenSense MPU6880
    Mpu6880,
    /// InvenSense MPU6500
    Mpu6500,
}

impl ChipVariant {
    /// Map a `WHO_AM_I` value to a variant
    #[must_use]
    pub const fn from_who_am_i(value: u8) -> Option<Self> {
        match value {
            WHO_AM_I_MPU6880 => Some(Self::Mpu6880),
            WHO_AM_I_MPU6500 => Some(Self::Mpu6500),
            _ => None,
        }
    }

    /// Whether PWR_MGMT_2 carries the low-power wake frequency field
    #[must_use]
    pub const fn supports_lpa_freq(self) -> bool {
        matches!(self, Self::Mpu6880)
    }

    /// Addresses of the output blocks read in bursts for this variant
    #[must_use]
    pub const fn register_map(self) -> RegisterMap {
        // Both parts share one layout
        match self {
            Self::Mpu6880 | Self::Mpu6500 => RegisterMap {
                raw_accel: 0x3B,
                temperature: 0x41,
                raw_gyro: 0x43,
            },
        }
    }
}

/// Output block addresses resolved for a detected variant
///
/// Configuration registers are reached through the typed accessors; only the
/// burst-read sample blocks go through raw addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterMap {
    /// First byte of the 6-byte accelerometer block
    pub raw_accel: u8,
    /// High byte of the 16-bit temperature reading
    pub temperature: u8,
    /// First byte of the 6-byte gyroscope block
    pub raw_gyro: u8,
}
