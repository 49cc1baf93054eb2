//! Strongly typed bus parameter enumerations for the INA229 driver.
//!
//! # Examples
//!
//! ```rust
//! use ina229::params::{BitOrder, Direction};
//!
//! let order = BitOrder::MsbFirst;
//! let direction = Direction::Read;
//! assert_eq!(direction.flag(), 1);
//! let _ = order;
//! ```

use modular_bitfield::prelude::Specifier;

/// Transfer direction encoded in bit 0 of every control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 1]
pub enum Direction {
    /// Register write.
    Write = 0,
    /// Register read.
    Read = 1,
}

impl Direction {
    /// Returns the raw flag value placed in the control byte.
    pub const fn flag(self) -> u8 {
        self as u8
    }
}

/// Bit ordering of each SPI word on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first (the only order the device supports).
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}
