//! Register map definitions for the INA229 power monitor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::Direction;

/// Register addresses exposed over SPI.
///
/// The driver treats register contents as opaque; only the address and the
/// number of bytes the register spans are known here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// `CONFIG`, device configuration.
    Config = 0x00,
    /// `ADC_CONFIG`, ADC configuration.
    AdcConfig = 0x01,
    /// `SHUNT_CAL`, shunt calibration.
    ShuntCal = 0x02,
    /// `SHUNT_TEMPCO`, shunt temperature coefficient.
    ShuntTempco = 0x03,
    /// `VSHUNT`, shunt voltage measurement.
    Vshunt = 0x04,
    /// `VBUS`, bus voltage measurement.
    Vbus = 0x05,
    /// `DIETEMP`, die temperature measurement.
    Dietemp = 0x06,
    /// `CURRENT`, current result.
    Current = 0x07,
    /// `POWER`, power result.
    Power = 0x08,
    /// `ENERGY`, energy accumulator.
    Energy = 0x09,
    /// `CHARGE`, charge accumulator.
    Charge = 0x0A,
    /// `DIAG_ALRT`, diagnostic flags and alert.
    DiagAlrt = 0x0B,
    /// `SOVL`, shunt overvoltage threshold.
    Sovl = 0x0C,
    /// `SUVL`, shunt undervoltage threshold.
    Suvl = 0x0D,
    /// `BOVL`, bus overvoltage threshold.
    Bovl = 0x0E,
    /// `BUVL`, bus undervoltage threshold.
    Buvl = 0x0F,
    /// `TEMP_LIMIT`, temperature over-limit threshold.
    TempLimit = 0x10,
    /// `PWR_LIMIT`, power over-limit threshold.
    PwrLimit = 0x11,
    /// `MANUFACTURER_ID`.
    ManufacturerId = 0x3E,
    /// `DEVICE_ID`.
    DeviceId = 0x3F,
}

impl Register {
    /// Every register, in address order.
    pub const ALL: [Register; 20] = [
        Register::Config,
        Register::AdcConfig,
        Register::ShuntCal,
        Register::ShuntTempco,
        Register::Vshunt,
        Register::Vbus,
        Register::Dietemp,
        Register::Current,
        Register::Power,
        Register::Energy,
        Register::Charge,
        Register::DiagAlrt,
        Register::Sovl,
        Register::Suvl,
        Register::Bovl,
        Register::Buvl,
        Register::TempLimit,
        Register::PwrLimit,
        Register::ManufacturerId,
        Register::DeviceId,
    ];

    /// Returns the register address as documented in the datasheet.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Returns the number of bytes the register spans on the bus.
    pub const fn width(self) -> usize {
        match self {
            Self::Vshunt | Self::Vbus | Self::Current | Self::Power => 3,
            Self::Energy | Self::Charge => 5,
            _ => 2,
        }
    }
}

/// Raised when a raw address does not name a known register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidRegister(pub u8);

impl TryFrom<u8> for Register {
    type Error = InvalidRegister;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Register::ALL
            .into_iter()
            .find(|register| register.address() == value)
            .ok_or(InvalidRegister(value))
    }
}

impl From<Register> for u8 {
    fn from(value: Register) -> Self {
        value.address()
    }
}

/// Bit layout of the command byte that opens every register access.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlByte {
    // Read/write flag (bit 0).
    pub direction: Direction,
    #[skip]
    __: B1,
    // Register address (bits 7:2).
    pub address: B6,
}

impl ControlByte {
    /// Builds the control byte addressing `register` in the given direction.
    pub fn for_access(register: Register, direction: Direction) -> Self {
        // Every `Register` address fits in six bits.
        Self::new()
            .with_direction(direction)
            .with_address(register.address())
    }
}

impl From<u8> for ControlByte {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<ControlByte> for u8 {
    fn from(value: ControlByte) -> Self {
        value.into_bytes()[0]
    }
}
