//! Register operations and their wire encoding.
//!
//! Every access starts with a [`ControlByte`] followed by one byte per register
//! byte. Reads clock out [`FILLER`] while the device shifts the register value
//! back; writes clock out the caller's bytes verbatim.

use crate::interface::Frame;
use crate::params::Direction;
use crate::registers::{ControlByte, Register};

/// Position of the register address inside the control byte.
///
/// Mirrors the `address` field position of [`ControlByte`], which does the encoding.
pub const ADDRESS_OFFSET: u8 = 2;
/// Position of the read/write flag inside the control byte.
///
/// Mirrors the `direction` field position of [`ControlByte`].
pub const DIRECTION_OFFSET: u8 = 0;
/// Bits per SPI word.
pub const WORD_BIT_COUNT: u8 = 8;
/// Byte clocked out while a read response is shifted in.
pub const FILLER: u8 = ((1u16 << WORD_BIT_COUNT) - 1) as u8;

/// A single register access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation<'a> {
    /// Reads `byte_count` bytes from `register`.
    Read {
        /// Target register.
        register: Register,
        /// Number of bytes to clock in; must match the register width.
        byte_count: usize,
    },
    /// Writes `data` to `register`, most significant byte first.
    Write {
        /// Target register.
        register: Register,
        /// Bytes sent after the control byte.
        data: &'a [u8],
    },
}

/// Raised when an encoded operation does not fit in the remaining frame capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFull;

impl<'a> Operation<'a> {
    /// Reads an explicit number of bytes from `register`.
    ///
    /// The byte count is not checked against [`Register::width`].
    pub const fn read(register: Register, byte_count: usize) -> Self {
        Self::Read {
            register,
            byte_count,
        }
    }

    /// Reads the full width of `register`.
    pub const fn read_register(register: Register) -> Self {
        Self::read(register, register.width())
    }

    /// Writes `data` to `register`.
    pub const fn write(register: Register, data: &'a [u8]) -> Self {
        Self::Write { register, data }
    }

    /// Returns the addressed register.
    pub const fn register(&self) -> Register {
        match *self {
            Self::Read { register, .. } | Self::Write { register, .. } => register,
        }
    }

    /// Returns the transfer direction.
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Read { .. } => Direction::Read,
            Self::Write { .. } => Direction::Write,
        }
    }

    /// Derives the control byte from the register address and direction.
    pub fn control_byte(&self) -> u8 {
        u8::from(ControlByte::for_access(self.register(), self.direction()))
    }

    /// Number of data bytes following the control byte.
    pub const fn data_len(&self) -> usize {
        match self {
            Self::Read { byte_count, .. } => *byte_count,
            Self::Write { data, .. } => data.len(),
        }
    }

    /// Total bytes this operation occupies on the bus.
    pub const fn transmit_len(&self) -> usize {
        1 + self.data_len()
    }

    /// Appends the transmit payload to `frame`.
    ///
    /// On failure `frame` is left as it was.
    pub fn encode(&self, frame: &mut Frame) -> Result<(), FrameFull> {
        if frame.capacity() - frame.len() < self.transmit_len() {
            return Err(FrameFull);
        }

        frame.push(self.control_byte()).map_err(|_| FrameFull)?;
        match self {
            Self::Read { byte_count, .. } => frame
                .resize(frame.len() + byte_count, FILLER)
                .map_err(|_| FrameFull),
            Self::Write { data, .. } => frame.extend_from_slice(data).map_err(|_| FrameFull),
        }
    }

    /// Interprets the bytes received while this operation was clocked out.
    ///
    /// `response` is this operation's slice of the transaction, control byte
    /// included. Reads fold their trailing `byte_count` bytes big-endian into an
    /// integer; writes yield `None`.
    pub fn parse(&self, response: &[u8]) -> Option<u64> {
        match self {
            Self::Read { byte_count, .. } => {
                let start = response.len().saturating_sub(*byte_count);
                Some(
                    response[start..]
                        .iter()
                        .fold(0u64, |value, &byte| (value << WORD_BIT_COUNT) | u64::from(byte)),
                )
            }
            Self::Write { .. } => None,
        }
    }
}
