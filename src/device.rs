//! High-level INA229 device driver and transaction coordinator.

use embedded_hal::spi::SpiDevice;

use crate::config::BusConfig;
use crate::error::{Error, Result};
use crate::interface::spi::SpiInterface;
use crate::interface::{Frame, Ina229Interface, MAX_OPERATIONS, Responses};
use crate::operation::Operation;
use crate::registers::Register;

/// High-level synchronous driver for the INA229 power monitor.
///
/// The driver holds no register state between calls; each [`operate`](Self::operate)
/// is a self-contained bus transaction.
pub struct Ina229<IFACE> {
    interface: IFACE,
    config: BusConfig,
}

impl<IFACE> Ina229<IFACE> {
    // ==================================================================
    // == Driver Ownership ==============================================
    // ==================================================================
    /// Consumes the driver and returns the owned interface.
    pub fn release(self) -> (IFACE, BusConfig) {
        (self.interface, self.config)
    }

    /// Provides mutable access to the underlying interface.
    pub fn interface_mut(&mut self) -> &mut IFACE {
        &mut self.interface
    }

    /// Returns the bus configuration the driver was built with.
    pub fn config(&self) -> &BusConfig {
        &self.config
    }
}

impl<SPI> Ina229<SpiInterface<SPI>>
where
    SPI: SpiDevice,
{
    // ==================================================================
    // == SPI Convenience Constructors ==================================
    // ==================================================================
    /// Convenience constructor for SPI transports.
    pub fn new_spi(spi: SPI, config: BusConfig) -> Result<Self, SPI::Error> {
        Self::new(SpiInterface::new(spi), config)
    }

    /// Releases the driver, returning the SPI device and configuration.
    pub fn release_spi(self) -> (SPI, BusConfig) {
        let (iface, config) = self.release();
        (iface.release(), config)
    }
}

impl<IFACE, CommE> Ina229<IFACE>
where
    IFACE: Ina229Interface<Error = CommE>,
{
    // ==================================================================
    // == Construction ==================================================
    // ==================================================================
    /// Creates a new driver instance after checking the bus configuration.
    ///
    /// Unknown transport flags are logged as a warning and otherwise ignored.
    pub fn new(interface: IFACE, config: BusConfig) -> Result<Self, CommE> {
        config.validate().map_err(Error::InvalidConfig)?;

        if config.has_extra_flags() {
            log_warn!("unknown spi extra flags {=u32:#x}", config.extra_flags);
        }

        Ok(Self { interface, config })
    }

    // ==================================================================
    // == Transactions ==================================================
    // ==================================================================
    /// Runs `operations` as one bus transaction.
    ///
    /// The transmit payloads are concatenated, exchanged in a single transfer,
    /// and the reply is cut back into one slice per operation. The returned
    /// results line up with `operations`. If the transport replies with a
    /// different number of bytes than it was sent, the whole batch fails.
    pub fn operate(&mut self, operations: &[Operation<'_>]) -> Result<Responses, CommE> {
        if operations.len() > MAX_OPERATIONS {
            return Err(Error::TooManyOperations);
        }
        if operations.is_empty() {
            return Ok(Responses::new());
        }

        let mut tx = Frame::new();
        for operation in operations {
            operation.encode(&mut tx).map_err(|_| Error::FrameOverflow)?;
        }

        log_trace!(
            "transfer {=usize} bytes for {=usize} operations",
            tx.len(),
            operations.len()
        );

        let mut rx = Frame::new();
        self.interface.transfer(&tx, &mut rx).map_err(Error::from)?;

        if rx.len() != tx.len() {
            log_warn!(
                "transport returned {=usize} bytes, expected {=usize}",
                rx.len(),
                tx.len()
            );
            return Err(Error::LengthMismatch {
                expected: tx.len(),
                actual: rx.len(),
            });
        }

        let mut responses = Responses::new();
        let mut begin = 0;
        for operation in operations {
            let end = begin + operation.transmit_len();
            responses
                .push(operation.parse(&rx[begin..end]))
                .map_err(|_| Error::TooManyOperations)?;
            begin = end;
        }

        Ok(responses)
    }

    // ==================================================================
    // == Register Access ===============================================
    // ==================================================================
    /// Reads the full width of a single register.
    pub fn read_register(&mut self, register: Register) -> Result<u64, CommE> {
        let responses = self.operate(&[Operation::read_register(register)])?;
        let value = responses.first().copied().flatten().unwrap_or_default();

        log_debug!("read {} = {=u64:#x}", register, value);
        Ok(value)
    }

    /// Reads several registers in one transaction, each at its full width.
    pub fn read_registers(&mut self, registers: &[Register]) -> Result<Responses, CommE> {
        if registers.len() > MAX_OPERATIONS {
            return Err(Error::TooManyOperations);
        }

        let mut operations: heapless::Vec<Operation<'_>, MAX_OPERATIONS> = heapless::Vec::new();
        for &register in registers {
            operations
                .push(Operation::read_register(register))
                .map_err(|_| Error::TooManyOperations)?;
        }

        self.operate(&operations)
    }

    /// Writes `data` to a register, most significant byte first.
    pub fn write_register(&mut self, register: Register, data: &[u8]) -> Result<(), CommE> {
        log_debug!("write {} <- {=[u8]:#x}", register, data);
        self.operate(&[Operation::write(register, data)])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::interface::MAX_FRAME_LEN;
    use embedded_hal::spi::{ErrorKind, MODE_1};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

    /// Scripted transport that records what was sent and replies with a fixed buffer.
    struct ScriptedInterface {
        reply: Vec<u8>,
        sent: Vec<Vec<u8>>,
        fail: bool,
    }

    impl ScriptedInterface {
        fn replying(reply: &[u8]) -> Self {
            Self {
                reply: reply.to_vec(),
                sent: Vec::new(),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                reply: Vec::new(),
                sent: Vec::new(),
                fail: true,
            }
        }
    }

    impl Ina229Interface for ScriptedInterface {
        type Error = ErrorKind;

        fn transfer(&mut self, tx: &[u8], rx: &mut Frame) -> core::result::Result<(), Self::Error> {
            self.sent.push(tx.to_vec());
            if self.fail {
                return Err(ErrorKind::Other);
            }
            rx.extend_from_slice(&self.reply).unwrap();
            Ok(())
        }
    }

    fn scripted(reply: &[u8]) -> Ina229<ScriptedInterface> {
        Ina229::new(ScriptedInterface::replying(reply), BusConfig::default()).unwrap()
    }

    #[test]
    fn operate_batches_read_and_write_into_one_transfer() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(
                vec![0x1D, 0xFF, 0xFF, 0xFF, 0x08, 0x12, 0x34],
                vec![0x00, 0x01, 0x02, 0x03, 0x00, 0x00, 0x00],
            ),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut ina = Ina229::new_spi(spi.clone(), BusConfig::default()).unwrap();

        let responses = ina
            .operate(&[
                Operation::read(Register::Current, 3),
                Operation::write(Register::ShuntCal, &[0x12, 0x34]),
            ])
            .unwrap();

        assert_eq!(responses.as_slice(), &[Some(0x01_0203), None]);
        spi.done();
    }

    #[test]
    fn operate_sends_concatenated_payloads_once() {
        let mut ina = scripted(&[0u8; 7]);
        ina.operate(&[
            Operation::read(Register::Current, 3),
            Operation::write(Register::ShuntCal, &[0x12, 0x34]),
        ])
        .unwrap();

        let (interface, _) = ina.release();
        assert_eq!(interface.sent, vec![vec![0x1D, 0xFF, 0xFF, 0xFF, 0x08, 0x12, 0x34]]);
    }

    #[test]
    fn results_follow_operation_order() {
        let mut ina = scripted(&[0xAA, 0xBB, 0xCC, 0xEE, 0x11, 0x22, 0x33]);
        let responses = ina
            .operate(&[
                Operation::write(Register::Config, &[0x80]),
                Operation::read(Register::Vbus, 3),
                Operation::write(Register::AdcConfig, &[]),
            ])
            .unwrap();

        assert_eq!(responses.as_slice(), &[None, Some(0xEE_1122), None]);
    }

    #[test]
    fn each_read_only_sees_its_own_slice() {
        let operations = [
            Operation::read(Register::Config, 2),
            Operation::read(Register::Current, 3),
        ];
        let base = [0x00, 0x12, 0x34, 0x00, 0x56, 0x78, 0x9A];

        let responses = scripted(&base).operate(&operations).unwrap();
        assert_eq!(responses.as_slice(), &[Some(0x1234), Some(0x56_789A)]);

        let mut tampered_tail = base;
        tampered_tail[4..].copy_from_slice(&[0xFF, 0xFF, 0xFF]);
        let responses = scripted(&tampered_tail).operate(&operations).unwrap();
        assert_eq!(responses[0], Some(0x1234));
        assert_eq!(responses[1], Some(0xFF_FFFF));

        let mut tampered_head = base;
        tampered_head[..3].copy_from_slice(&[0xFF, 0xFF, 0xFF]);
        let responses = scripted(&tampered_head).operate(&operations).unwrap();
        assert_eq!(responses[0], Some(0xFFFF));
        assert_eq!(responses[1], Some(0x56_789A));
    }

    #[test]
    fn short_reply_fails_whole_batch() {
        let mut ina = scripted(&[0x00, 0x01, 0x02]);
        let result = ina.operate(&[
            Operation::read(Register::Config, 2),
            Operation::read(Register::DeviceId, 2),
        ]);

        assert_eq!(
            result,
            Err(Error::LengthMismatch {
                expected: 6,
                actual: 3
            })
        );
    }

    #[test]
    fn long_reply_fails_whole_batch() {
        let mut ina = scripted(&[0x00; 4]);
        let result = ina.operate(&[Operation::read(Register::Config, 2)]);

        assert_eq!(
            result,
            Err(Error::LengthMismatch {
                expected: 3,
                actual: 4
            })
        );
    }

    #[test]
    fn transport_errors_propagate() {
        let mut ina = Ina229::new(ScriptedInterface::failing(), BusConfig::default()).unwrap();
        let result = ina.operate(&[Operation::read(Register::Vbus, 3)]);

        assert_eq!(result, Err(Error::Interface(ErrorKind::Other)));
    }

    #[test]
    fn empty_batch_does_not_touch_the_bus() {
        let mut ina = scripted(&[]);
        let responses = ina.operate(&[]).unwrap();

        assert!(responses.is_empty());
        let (interface, _) = ina.release();
        assert!(interface.sent.is_empty());
    }

    #[test]
    fn oversized_batch_is_rejected_before_transfer() {
        let data = [0u8; MAX_FRAME_LEN];
        let mut ina = scripted(&[]);
        let result = ina.operate(&[Operation::write(Register::Config, &data)]);

        assert_eq!(result, Err(Error::FrameOverflow));
        let (interface, _) = ina.release();
        assert!(interface.sent.is_empty());
    }

    #[test]
    fn too_many_operations_are_rejected() {
        let operations = [Operation::read(Register::Config, 0); MAX_OPERATIONS + 1];
        let mut ina = scripted(&[]);

        assert_eq!(ina.operate(&operations), Err(Error::TooManyOperations));
    }

    #[test]
    fn read_registers_rejects_oversized_batch_before_transfer() {
        let registers = [Register::Config; MAX_OPERATIONS + 1];
        let mut ina = scripted(&[]);

        assert_eq!(ina.read_registers(&registers), Err(Error::TooManyOperations));
        let (interface, _) = ina.release();
        assert!(interface.sent.is_empty());
    }

    #[test]
    fn invalid_config_aborts_construction() {
        let config = BusConfig::new().mode(MODE_1).build();
        let result = Ina229::new(ScriptedInterface::replying(&[]), config);

        assert!(matches!(
            result,
            Err(Error::InvalidConfig(ConfigError::UnsupportedMode))
        ));
    }

    #[test]
    fn extra_flags_only_warn() {
        let config = BusConfig::new().extra_flags(0x8).build();
        let ina = Ina229::new(ScriptedInterface::replying(&[]), config).unwrap();

        assert_eq!(ina.config().extra_flags, 0x8);
    }

    #[test]
    fn read_register_uses_full_width() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(
                vec![0xFD, 0xFF, 0xFF],
                vec![0x00, 0x22, 0x91],
            ),
            SpiTransaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expectations);
        let mut ina = Ina229::new_spi(spi.clone(), BusConfig::default()).unwrap();

        assert_eq!(ina.read_register(Register::DeviceId).unwrap(), 0x2291);
        spi.done();
    }

    #[test]
    fn read_registers_batches_into_one_transfer() {
        let mut ina = scripted(&[0x00, 0x54, 0x49, 0x00, 0x22, 0x91]);
        let responses = ina
            .read_registers(&[Register::ManufacturerId, Register::DeviceId])
            .unwrap();

        assert_eq!(responses.as_slice(), &[Some(0x5449), Some(0x2291)]);
        let (interface, _) = ina.release();
        assert_eq!(interface.sent, vec![vec![0xF9, 0xFF, 0xFF, 0xFD, 0xFF, 0xFF]]);
    }

    #[test]
    fn write_register_sends_control_byte_then_data() {
        let expectations = [
            SpiTransaction::transaction_start(),
            SpiTransaction::transfer_in_place(vec![0x08, 0x10, 0x00], vec![0x00; 3]),
            SpiTransaction::transaction_end(),
        ];
        let spi = SpiMock::new(&expectations);
        let mut ina = Ina229::new_spi(spi, BusConfig::default()).unwrap();

        ina.write_register(Register::ShuntCal, &[0x10, 0x00]).unwrap();

        let (mut spi, _) = ina.release_spi();
        spi.done();
    }
}
