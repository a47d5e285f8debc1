//! Decoding of the `STATUS_REG` and `INT_SRC` registers

/// Content of `STATUS_REG`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct Status {
    /// New data on any axis overwrote unread data
    pub overrun: bool,
    pub z_overrun: bool,
    pub y_overrun: bool,
    pub x_overrun: bool,
    /// A new set of data is available on all axes
    pub data_available: bool,
    pub z_data_available: bool,
    pub y_data_available: bool,
    pub x_data_available: bool,
}

impl From<u8> for Status {
    fn from(byte: u8) -> Self {
        Self {
            overrun: byte & 0x80 != 0,
            z_overrun: byte & 0x40 != 0,
            y_overrun: byte & 0x20 != 0,
            x_overrun: byte & 0x10 != 0,
            data_available: byte & 0x08 != 0,
            z_data_available: byte & 0x04 != 0,
            y_data_available: byte & 0x02 != 0,
            x_data_available: byte & 0x01 != 0,
        }
    }
}

/// Content of `INT_SRC`. Reading the register on the device clears a latched
/// interrupt.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptSource {
    pub x_positive: bool,
    pub y_positive: bool,
    pub z_positive: bool,
    pub x_negative: bool,
    pub y_negative: bool,
    pub z_negative: bool,
    /// Internal measurement range overflowed
    pub range_overflow: bool,
    /// An interrupt event occurred
    pub active: bool,
}

impl From<u8> for InterruptSource {
    fn from(byte: u8) -> Self {
        Self {
            x_positive: byte & 0x80 != 0,
            y_positive: byte & 0x40 != 0,
            z_positive: byte & 0x20 != 0,
            x_negative: byte & 0x10 != 0,
            y_negative: byte & 0x08 != 0,
            z_negative: byte & 0x04 != 0,
            range_overflow: byte & 0x02 != 0,
            active: byte & 0x01 != 0,
        }
    }
}

impl InterruptSource {
    /// True if any axis exceeded the threshold in either direction
    pub const fn threshold_exceeded(&self) -> bool {
        self.x_positive
            || self.y_positive
            || self.z_positive
            || self.x_negative
            || self.y_negative
            || self.z_negative
    }
}
