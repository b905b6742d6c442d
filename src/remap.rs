//! Axis remapping for board placement
//!
//! Each placement is a signed permutation of the chip axes. Accelerometer
//! and gyroscope use separate tables because the gyro axes are mounted with
//! the opposite handedness on the reference boards.

use crate::sensors::Sensor;

/// Number of entries in each remap table
pub const REMAP_TABLE_SIZE: usize = 8;

/// One signed axis permutation: `out[i] = in[src[i]] * sign[i]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisRemap {
    /// Source axis for each output axis
    pub src: [usize; 3],
    /// Sign applied to each output axis
    pub sign: [i8; 3],
}

const fn entry(src: [usize; 3], sign: [i8; 3]) -> AxisRemap {
    AxisRemap { src, sign }
}

/// Accelerometer placements
pub const ACCEL_REMAP: [AxisRemap; REMAP_TABLE_SIZE] = [
    entry([0, 1, 2], [1, 1, 1]),
    entry([1, 0, 2], [1, -1, 1]),
    entry([0, 1, 2], [-1, -1, 1]),
    entry([1, 0, 2], [-1, 1, 1]),
    entry([0, 1, 2], [-1, 1, -1]),
    entry([1, 0, 2], [-1, -1, -1]),
    entry([0, 1, 2], [1, -1, -1]),
    entry([1, 0, 2], [1, 1, -1]),
];

/// Gyroscope placements
pub const GYRO_REMAP: [AxisRemap; REMAP_TABLE_SIZE] = [
    entry([0, 1, 2], [-1, 1, -1]),
    entry([1, 0, 2], [-1, -1, -1]),
    entry([0, 1, 2], [1, -1, -1]),
    entry([1, 0, 2], [1, 1, -1]),
    entry([0, 1, 2], [1, 1, 1]),
    entry([1, 0, 2], [1, -1, 1]),
    entry([0, 1, 2], [-1, -1, 1]),
    entry([1, 0, 2], [-1, 1, 1]),
];

impl AxisRemap {
    /// Apply this permutation
    ///
    /// Negating `i16::MIN` saturates to `i16::MAX`.
    #[must_use]
    pub fn apply(&self, axes: [i16; 3]) -> [i16; 3] {
        core::array::from_fn(|i| {
            let value = axes[self.src[i]];
            if self.sign[i] < 0 {
                value.saturating_neg()
            } else {
                value
            }
        })
    }
}

/// Table entry for `place`, `None` when out of range
#[must_use]
pub fn lookup(place: i32, sensor: Sensor) -> Option<&'static AxisRemap> {
    let index = usize::try_from(place).ok()?;
    match sensor {
        Sensor::Accel => ACCEL_REMAP.get(index),
        Sensor::Gyro => GYRO_REMAP.get(index),
    }
}

/// Re-orient a raw sample for the board placement
///
/// A `place` outside 0..=7 returns the sample unchanged.
#[must_use]
pub fn remap(axes: [i16; 3], place: i32, sensor: Sensor) -> [i16; 3] {
    lookup(place, sensor).map_or(axes, |entry| entry.apply(axes))
}
