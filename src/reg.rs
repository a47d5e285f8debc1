/// Expected content of the `WHO_AM_I` register
pub const WHO_AM_I_VALUE: u8 = 0x3D;

#[allow(unused)]
#[repr(u8)]
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Register {
    OffsetXL = 0x05,
    OffsetXH = 0x06,
    OffsetYL = 0x07,
    OffsetYH = 0x08,
    OffsetZL = 0x09,
    OffsetZH = 0x0A,
    WhoAmI = 0x0F,
    CtrlReg1 = 0x20,
    CtrlReg2 = 0x21,
    CtrlReg3 = 0x22,
    CtrlReg4 = 0x23,
    CtrlReg5 = 0x24,
    Status = 0x27,
    OutXL = 0x28,
    OutXH = 0x29,
    OutYL = 0x2A,
    OutYH = 0x2B,
    OutZL = 0x2C,
    OutZH = 0x2D,
    TempOutL = 0x2E,
    TempOutH = 0x2F,
    IntCfg = 0x30,
    IntSrc = 0x31,
    IntThsL = 0x32,
    IntThsH = 0x33,
}

impl Register {
    pub const fn reg(self) -> u8 {
        self as u8
    }
}

// CTRL_REG1
pub const TEMP_EN: u8 = 1 << 7;
pub const OM_SHIFT: u8 = 5;
pub const DO_SHIFT: u8 = 2;
pub const FAST_ODR: u8 = 1 << 1;

// CTRL_REG2
pub const FS_SHIFT: u8 = 5;

// CTRL_REG3
pub const LP: u8 = 1 << 5;

// CTRL_REG4
pub const OMZ_SHIFT: u8 = 2;

// CTRL_REG5
pub const BDU: u8 = 1 << 6;

// INT_CFG, bit 3 must always be written as one
pub const INT_CFG_FIXED: u8 = 1 << 3;
pub const IEA: u8 = 1 << 2;
pub const LIR: u8 = 1 << 1;
pub const IEN: u8 = 1 << 0;

/// Auto-increment flag of the I2C sub-address
pub const I2C_AUTO_INCREMENT: u8 = 1 << 7;

/// Read flag of the SPI address byte
pub const SPI_READ: u8 = 1 << 7;
/// Auto-increment flag of the SPI address byte
pub const SPI_AUTO_INCREMENT: u8 = 1 << 6;
