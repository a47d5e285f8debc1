//! Hard-iron offset calibration from running per-axis extremes

use nalgebra::Vector3;

use crate::units::RawAxes;

/// Number of samples for a batch calibration
pub const CALIBRATION_SAMPLES: usize = 1000;

/// Interval between batch calibration samples, in milliseconds
pub const CALIBRATION_INTERVAL_MS: u32 = 10;

/// Running per-axis minimum and maximum of raw readings.
///
/// The window only ever widens. Until the first sample the extremes hold
/// sentinels and the offset is zero.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CalibrationState {
    min: RawAxes,
    max: RawAxes,
    samples: u32,
}

// nalgebra vectors carry no `defmt::Format`
#[cfg(feature = "defmt")]
impl defmt::Format for CalibrationState {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "CalibrationState min: ({}, {}, {}) max: ({}, {}, {}) samples: {}",
            self.min.x,
            self.min.y,
            self.min.z,
            self.max.x,
            self.max.y,
            self.max.z,
            self.samples
        )
    }
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationState {
    pub fn new() -> Self {
        Self {
            min: Vector3::from_element(i16::MAX),
            max: Vector3::from_element(i16::MIN),
            samples: 0,
        }
    }

    /// Widen the window with a new raw sample
    pub fn update(&mut self, raw: RawAxes) {
        self.min = self.min.zip_map(&raw, |m, r| m.min(r));
        self.max = self.max.zip_map(&raw, |m, r| m.max(r));
        self.samples = self.samples.saturating_add(1);
    }

    /// Number of samples observed
    pub fn samples(&self) -> u32 {
        self.samples
    }

    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Smallest value seen per axis, `None` before the first sample
    pub fn min(&self) -> Option<RawAxes> {
        (!self.is_empty()).then_some(self.min)
    }

    /// Largest value seen per axis, `None` before the first sample
    pub fn max(&self) -> Option<RawAxes> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Offset `-(min + max) / 2` to add to raw readings
    pub fn offset(&self) -> RawAxes {
        if self.is_empty() {
            return Vector3::zeros();
        }
        self.min.zip_map(&self.max, |lo, hi| {
            let center = (i32::from(lo) + i32::from(hi)) / 2;
            saturate(-center)
        })
    }

    /// Apply the current offset to a raw reading
    pub fn apply(&self, raw: RawAxes) -> RawAxes {
        raw.zip_map(&self.offset(), |r, o| saturate(i32::from(r) + i32::from(o)))
    }

    /// Record `raw` and return it corrected by the updated offset
    pub fn track(&mut self, raw: RawAxes) -> RawAxes {
        self.update(raw);
        self.apply(raw)
    }
}

fn saturate(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
