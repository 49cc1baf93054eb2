//! Error handling primitives for the INA229 driver.

use crate::config::ConfigError;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Any error reported by the underlying bus interface.
    Interface(E),
    /// The bus configuration is not supported by the device.
    InvalidConfig(ConfigError),
    /// The transport returned a different number of bytes than it was given.
    ///
    /// No per-operation results are produced when this happens.
    LengthMismatch {
        /// Number of bytes transmitted.
        expected: usize,
        /// Number of bytes received.
        actual: usize,
    },
    /// The flattened transaction does not fit in a [`Frame`](crate::interface::Frame).
    FrameOverflow,
    /// More operations were submitted than [`MAX_OPERATIONS`](crate::interface::MAX_OPERATIONS).
    TooManyOperations,
}

impl<E> From<E> for Error<E> {
    fn from(err: E) -> Self {
        Self::Interface(err)
    }
}
