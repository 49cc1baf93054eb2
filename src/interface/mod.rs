//! Bus interface abstraction for the INA229 driver.

pub mod spi;

/// Largest transaction, in bytes, the driver will clock in one go.
pub const MAX_FRAME_LEN: usize = 128;
/// Largest number of operations accepted in one transaction.
pub const MAX_OPERATIONS: usize = 32;

/// Fixed-capacity byte buffer holding one transaction on the wire.
pub type Frame = heapless::Vec<u8, MAX_FRAME_LEN>;
/// Per-operation results of one transaction, in submission order.
///
/// Reads yield `Some(value)`, writes yield `None`.
pub type Responses = heapless::Vec<Option<u64>, MAX_OPERATIONS>;

/// Abstraction over the full-duplex bus exchange required by the driver.
pub trait Ina229Interface {
    /// Error type produced by the concrete bus implementation.
    type Error;

    /// Clocks `tx` out while clocking the device's reply into `rx`.
    ///
    /// One byte must be received per byte sent, within a single chip-select
    /// assertion. `rx` arrives empty.
    fn transfer(&mut self, tx: &[u8], rx: &mut Frame) -> core::result::Result<(), Self::Error>;
}
