use crate::reg::*;

/// Default transaction timeout, in microseconds
pub const BUS_TIMEOUT_US: u32 = 500_000;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Lis3mdlConfig {
    pub range: GaussRange,
    pub profile: Profile,
    pub temperature: bool,
    pub int: Option<Interrupt>,
    pub timeout_us: u32,
}

impl Default for Lis3mdlConfig {
    fn default() -> Self {
        Self {
            range: GaussRange::Gauss4,
            profile: Profile::HighResolution,
            temperature: true,
            int: None,
            timeout_us: BUS_TIMEOUT_US,
        }
    }
}

impl Lis3mdlConfig {
    /// Control register contents in write order, `CTRL_REG1` through `CTRL_REG5`
    pub(crate) fn ctrl_regs(&self) -> [(Register, u8); 5] {
        let temp = if self.temperature { TEMP_EN } else { 0 };
        [
            (Register::CtrlReg1, self.profile.ctrl_reg1() | temp),
            (Register::CtrlReg2, self.range.ctrl_reg2()),
            (Register::CtrlReg3, self.profile.ctrl_reg3()),
            // Z axis ultra-high performance, little endian output
            (Register::CtrlReg4, 0b11 << OMZ_SHIFT),
            (Register::CtrlReg5, BDU),
        ]
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cAddress {
    /// `0x1C` if pin `SDO/SA1` is low
    #[default]
    X1C,
    /// `0x1E` if pin `SDO/SA1` is high
    X1E,
    /// In case the module has a different address
    Any(u8),
}

impl From<u8> for I2cAddress {
    fn from(address: u8) -> Self {
        I2cAddress::Any(address)
    }
}

impl I2cAddress {
    pub const fn get(&self) -> u8 {
        match self {
            I2cAddress::X1C => 0x1C,
            I2cAddress::X1E => 0x1E,
            I2cAddress::Any(a) => *a,
        }
    }
}

/// Full-scale range of the magnetometer in gauss
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GaussRange {
    Gauss4 = 0b00,
    Gauss8 = 0b01,
    Gauss12 = 0b10,
    Gauss16 = 0b11,
}

impl GaussRange {
    /// Sensitivity in LSB per gauss
    pub const fn divisor(self) -> f32 {
        match self {
            Self::Gauss4 => 6842.0,
            Self::Gauss8 => 3421.0,
            Self::Gauss12 => 2281.0,
            Self::Gauss16 => 1711.0,
        }
    }

    const fn ctrl_reg2(self) -> u8 {
        (self as u8) << FS_SHIFT
    }
}

/// Operating profile, selects the axis operative mode and output data rate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Low-power X/Y mode at 10 Hz, low-power interface mode
    PowerOptimized,
    /// Ultra-high performance X/Y mode with `FAST_ODR` (155 Hz)
    HighResolution,
}

impl Profile {
    const fn ctrl_reg1(self) -> u8 {
        match self {
            // Operative mode bits left at zero (low power)
            Self::PowerOptimized => 0b100 << DO_SHIFT,
            Self::HighResolution => 0b11 << OM_SHIFT | 0b111 << DO_SHIFT | FAST_ODR,
        }
    }

    // Continuous conversion in both cases
    const fn ctrl_reg3(self) -> u8 {
        match self {
            Self::PowerOptimized => LP,
            Self::HighResolution => 0x00,
        }
    }
}

/// Threshold interrupt generation on the `INT` pin
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interrupt {
    /// Enable interrupt generation on X axis
    pub x: bool,

    /// Enable interrupt generation on Y axis
    pub y: bool,

    /// Enable interrupt generation on Z axis
    pub z: bool,

    // Interrupt pin active high
    pub active_high: bool,

    // Latch interrupt until `INT_SRC` is read
    pub latched: bool,

    /// Absolute threshold in LSB, 15 bits
    pub threshold: u16,
}

impl Interrupt {
    /// Interrupts on all axes, active low and latched
    pub const fn all_axes(threshold: u16) -> Self {
        Self {
            x: true,
            y: true,
            z: true,
            active_high: false,
            latched: true,
            threshold,
        }
    }

    pub(crate) const fn int_cfg(&self) -> u8 {
        (self.x as u8) << 7
            | (self.y as u8) << 6
            | (self.z as u8) << 5
            | INT_CFG_FIXED
            | (if self.active_high { IEA } else { 0 })
            // LIR is inverted, zero latches the request
            | (if self.latched { 0 } else { LIR })
            | IEN
    }
}
