//! Byte merging and conversion of raw readings to physical units

use nalgebra::{RealField, Vector3};

use crate::cfg::GaussRange;

/// Raw axis readings, signed 16-bit LSB
pub type RawAxes = Vector3<i16>;

/// Magnetic field in micro tesla
pub type MagAxes = Vector3<f32>;

/// Temperature sensitivity in LSB per degree Celsius
pub const TEMP_SENSITIVITY: f32 = 8.0;

/// Merge a low and high byte into a signed 16-bit value
pub const fn merge(low: u8, high: u8) -> i16 {
    i16::from_le_bytes([low, high])
}

/// Split a signed 16-bit value into its low and high byte
pub const fn split(value: i16) -> [u8; 2] {
    value.to_le_bytes()
}

/// Collects 6 little-endian bytes (`X_L, X_H, Y_L, Y_H, Z_L, Z_H`) into axes
pub fn collect_3xi16(values: [u8; 6]) -> RawAxes {
    let [xl, xh, yl, yh, zl, zh] = values;
    Vector3::new(merge(xl, xh), merge(yl, yh), merge(zl, zh))
}

/// Inverse of [`collect_3xi16`]
pub fn spread_3xi16(axes: RawAxes) -> [u8; 6] {
    let [xl, xh] = split(axes.x);
    let [yl, yh] = split(axes.y);
    let [zl, zh] = split(axes.z);
    [xl, xh, yl, yh, zl, zh]
}

/// Convert a single raw reading to micro tesla. `range` must be the range the
/// device is configured with.
pub fn to_microtesla(raw: i16, range: GaussRange) -> f32 {
    // 1 gauss = 100 uT
    f32::from(raw) / range.divisor() * 100.0
}

/// Convert raw axes to micro tesla
pub fn axes_to_microtesla(raw: RawAxes, range: GaussRange) -> MagAxes {
    raw.map(|x| to_microtesla(x, range))
}

/// Convert a raw temperature reading to degrees Celsius
pub fn temperature_celsius(raw: i16) -> f32 {
    f32::from(raw) / TEMP_SENSITIVITY
}

/// Compass heading in degrees within `[0, 360)`, measured from the X axis
/// towards the Y axis. `heading(0, 0)` is `0`.
pub fn heading(x: f32, y: f32) -> f32 {
    let heading = RealField::atan2(y, x).to_degrees();
    if heading < 0.0 {
        // -0.0 and tiny negatives must not round up to 360
        let wrapped = heading + 360.0;
        if wrapped >= 360.0 {
            0.0
        } else {
            wrapped
        }
    } else {
        heading
    }
}
