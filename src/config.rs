//! Bus configuration primitives for the INA229 driver.

use embedded_hal::spi::{MODE_0, MODE_3, Mode};

use crate::operation::WORD_BIT_COUNT;
use crate::params::BitOrder;

/// SPI modes the device accepts (CPOL = CPHA).
pub const SUPPORTED_MODES: [Mode; 2] = [MODE_0, MODE_3];
/// Highest SPI clock the device accepts, in hertz.
pub const MAX_SPI_SPEED_HZ: u32 = 10_000_000;

/// Description of how the SPI bus handed to the driver is set up.
///
/// `embedded-hal` bus handles do not expose their configuration, so the
/// caller states it here and the driver checks it once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Clock polarity and phase.
    pub mode: Mode,
    /// Maximum clock speed, in hertz.
    pub max_speed_hz: u32,
    /// Bit ordering within each word.
    pub bit_order: BitOrder,
    /// Bits per SPI word.
    pub bits_per_word: u8,
    /// Transport-specific flags outside the set above.
    pub extra_flags: u32,
}

impl BusConfig {
    /// Begins building a [`BusConfig`] using the builder pattern.
    pub fn new() -> BusConfigBuilder {
        BusConfigBuilder::new()
    }

    /// Checks whether the device supports this bus setup.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        if !SUPPORTED_MODES.contains(&self.mode) {
            return Err(ConfigError::UnsupportedMode);
        }
        if self.max_speed_hz > MAX_SPI_SPEED_HZ {
            return Err(ConfigError::UnsupportedSpeed);
        }
        if self.bit_order != BitOrder::MsbFirst {
            return Err(ConfigError::UnsupportedBitOrder);
        }
        if self.bits_per_word != WORD_BIT_COUNT {
            return Err(ConfigError::UnsupportedWordSize);
        }

        Ok(())
    }

    /// Returns `true` when transport flags the driver does not know about are set.
    pub fn has_extra_flags(&self) -> bool {
        self.extra_flags != 0
    }
}

/// Builder for [`BusConfig`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct BusConfigBuilder {
    config: BusConfig,
}

impl BusConfigBuilder {
    /// Creates a new builder seeded with [`BusConfig::default()`].
    pub fn new() -> Self {
        Self {
            config: BusConfig::default(),
        }
    }

    /// Overrides the SPI mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Overrides the maximum clock speed.
    pub fn max_speed_hz(mut self, hz: u32) -> Self {
        self.config.max_speed_hz = hz;
        self
    }

    /// Overrides the bit order.
    pub fn bit_order(mut self, order: BitOrder) -> Self {
        self.config.bit_order = order;
        self
    }

    /// Overrides the word size.
    pub fn bits_per_word(mut self, bits: u8) -> Self {
        self.config.bits_per_word = bits;
        self
    }

    /// Records transport-specific flags.
    pub fn extra_flags(mut self, flags: u32) -> Self {
        self.config.extra_flags = flags;
        self
    }

    /// Finalizes the builder and returns the [`BusConfig`].
    pub fn build(self) -> BusConfig {
        self.config
    }
}

impl Default for BusConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            mode: MODE_0,
            max_speed_hz: MAX_SPI_SPEED_HZ,
            bit_order: BitOrder::MsbFirst,
            bits_per_word: WORD_BIT_COUNT,
            extra_flags: 0,
        }
    }
}

/// Validation errors generated while verifying a [`BusConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// SPI mode other than 0 or 3.
    UnsupportedMode,
    /// Clock faster than [`MAX_SPI_SPEED_HZ`].
    UnsupportedSpeed,
    /// Bit order other than MSB first.
    UnsupportedBitOrder,
    /// Word size other than eight bits.
    UnsupportedWordSize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{MODE_1, MODE_2};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(BusConfig::default().validate(), Ok(()));
        assert_eq!(BusConfig::new().build(), BusConfig::default());
    }

    #[test]
    fn modes_zero_and_three_are_accepted() {
        assert_eq!(BusConfig::new().mode(MODE_3).build().validate(), Ok(()));
        assert_eq!(
            BusConfig::new().mode(MODE_1).build().validate(),
            Err(ConfigError::UnsupportedMode)
        );
        assert_eq!(
            BusConfig::new().mode(MODE_2).build().validate(),
            Err(ConfigError::UnsupportedMode)
        );
    }

    #[test]
    fn speed_ceiling_is_inclusive() {
        assert_eq!(
            BusConfig::new().max_speed_hz(MAX_SPI_SPEED_HZ).build().validate(),
            Ok(())
        );
        assert_eq!(
            BusConfig::new().max_speed_hz(MAX_SPI_SPEED_HZ + 1).build().validate(),
            Err(ConfigError::UnsupportedSpeed)
        );
    }

    #[test]
    fn lsb_first_is_rejected() {
        assert_eq!(
            BusConfig::new().bit_order(BitOrder::LsbFirst).build().validate(),
            Err(ConfigError::UnsupportedBitOrder)
        );
    }

    #[test]
    fn only_eight_bit_words_are_accepted() {
        assert_eq!(
            BusConfig::new().bits_per_word(16).build().validate(),
            Err(ConfigError::UnsupportedWordSize)
        );
    }

    #[test]
    fn first_failing_check_wins() {
        let config = BusConfig::new()
            .mode(MODE_1)
            .max_speed_hz(20_000_000)
            .bits_per_word(9)
            .build();
        assert_eq!(config.validate(), Err(ConfigError::UnsupportedMode));
    }

    #[test]
    fn extra_flags_do_not_fail_validation() {
        let config = BusConfig::new().extra_flags(0x40).build();
        assert!(config.has_extra_flags());
        assert_eq!(config.validate(), Ok(()));
    }
}
