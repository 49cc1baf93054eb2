//! SPI interface implementation built on top of `embedded-hal` `SpiDevice`.

use embedded_hal::spi::SpiDevice;

use super::{Frame, Ina229Interface};

/// SPI-based interface implementation for the INA229 driver.
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new interface from the provided SPI device abstraction.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Provides mutable access to the wrapped SPI device.
    pub fn spi_mut(&mut self) -> &mut SPI {
        &mut self.spi
    }

    /// Consumes the interface and returns the owned SPI device.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Ina229Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    type Error = SPI::Error;

    fn transfer(&mut self, tx: &[u8], rx: &mut Frame) -> core::result::Result<(), Self::Error> {
        rx.clear();
        // An oversized payload never reaches the bus; the empty reply fails
        // the caller's length check.
        if tx.is_empty() || tx.len() > rx.capacity() {
            return Ok(());
        }

        rx.extend(tx.iter().copied());
        self.spi.transfer_in_place(rx.as_mut_slice())
    }
}
