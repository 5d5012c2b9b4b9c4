use crate::typelevel::Sealed;
use bitflags::bitflags;
use polled_uart_common::uart::baud::Divisor;

use super::{FrameFormat, Interrupts, ReadErrorType, ResolvedConfig};

/// Error type for UART operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The resolved configuration selects a different set of polled
    /// directions or a different flow control scheme than the handle type.
    CapabilityMismatch,
    /// A stream was requested while the configuration has no stdio mode.
    StreamDisabled,
}

/// State of the UART Peripheral.
pub trait State: Sealed {}

/// UART is enabled.
///
/// Carries the configuration the peripheral was enabled with.
pub struct Enabled {
    pub(super) config: ResolvedConfig,
}

/// UART is disabled.
pub struct Disabled;

impl State for Enabled {}
impl Sealed for Enabled {}
impl State for Disabled {}
impl Sealed for Disabled {}

/// Which directions are served by the polling functions of this crate.
///
/// A direction that is not polled is assumed to be driven by an interrupt
/// handler the application provides; the polling functions for it are not
/// available on the handle.
pub trait Directions: Sealed {
    /// Transmit path is polled.
    const TX_POLLED: bool;
    /// Receive path is polled.
    const RX_POLLED: bool;
}

/// Directions where the transmit path is polled.
pub trait PolledTx: Directions {}

/// Directions where the receive path is polled.
pub trait PolledRx: Directions {}

/// Both directions are polled.
pub struct Duplex;

/// Only transmit is polled, receive is interrupt driven.
pub struct TxPolled;

/// Only receive is polled, transmit is interrupt driven.
pub struct RxPolled;

/// Both directions are interrupt driven.
pub struct InterruptDriven;

impl Sealed for Duplex {}
impl Directions for Duplex {
    const TX_POLLED: bool = true;
    const RX_POLLED: bool = true;
}
impl PolledTx for Duplex {}
impl PolledRx for Duplex {}

impl Sealed for TxPolled {}
impl Directions for TxPolled {
    const TX_POLLED: bool = true;
    const RX_POLLED: bool = false;
}
impl PolledTx for TxPolled {}

impl Sealed for RxPolled {}
impl Directions for RxPolled {
    const TX_POLLED: bool = false;
    const RX_POLLED: bool = true;
}
impl PolledRx for RxPolled {}

impl Sealed for InterruptDriven {}
impl Directions for InterruptDriven {
    const TX_POLLED: bool = false;
    const RX_POLLED: bool = false;
}

bitflags! {
    /// Receive error flags.
    ///
    /// The driver accumulates them: once set, a flag stays set until
    /// [`UartPeripheral::clear_errors`](super::UartPeripheral::clear_errors)
    /// is called.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct ErrorFlags: u8 {
        /// A frame had no valid stop bit.
        const FRAME = 1 << 0;
        /// The parity bit did not match the configured parity.
        const PARITY = 1 << 1;
        /// A byte arrived before the previous one was read.
        const OVERRUN = 1 << 2;
        /// A byte arrived while the pending slot was occupied and was dropped.
        const BUFFER_FULL = 1 << 3;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ErrorFlags {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "ErrorFlags({=u8:#x})", self.bits())
    }
}

/// One frame as read from the data/status register pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame {
    /// Received data bits.
    pub data: u8,
    /// Error flags the hardware attached to this frame.
    pub status: ErrorFlags,
}

/// A byte handed out by the receive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceivedByte {
    /// The received byte.
    pub value: u8,
    /// Error flags pending at delivery time, this frame's included.
    pub status: ErrorFlags,
    /// Error flags the hardware attached to this frame alone.
    pub frame: ErrorFlags,
}

impl ReceivedByte {
    /// Whether no error flag is pending.
    pub fn is_ok(&self) -> bool {
        self.status.is_empty()
    }

    /// The most severe pending error, if any.
    pub fn error(&self) -> Option<ReadErrorType> {
        ReadErrorType::from_flags(self.status)
    }

    /// The most severe error of this frame, if any.
    pub fn frame_error(&self) -> Option<ReadErrorType> {
        ReadErrorType::from_flags(self.frame)
    }
}

/// Register level access to one USART instance.
///
/// Implementations translate each call into accesses to the chip's
/// registers. A [`UartPeripheral`](super::UartPeripheral) takes its device
/// by value, so as long as a device value is only ever created once per
/// physical peripheral, no two handles can address the same hardware.
pub trait UartDevice {
    /// Load the baud rate divisor.
    fn set_divisor(&mut self, divisor: Divisor);

    /// Program data bits, parity and stop bits.
    fn set_frame_format(&mut self, frame: FrameFormat);

    /// Enable exactly the given interrupt sources.
    fn set_interrupts(&mut self, interrupts: Interrupts);

    /// Enable or disable the transmitter and the receiver.
    fn set_directions(&mut self, tx: bool, rx: bool);

    /// The transmit data register can take another byte.
    fn is_data_register_empty(&self) -> bool;

    /// The last byte has left the shift register.
    fn is_transmit_complete(&self) -> bool;

    /// A received byte is waiting in the data register.
    fn is_receive_complete(&self) -> bool;

    /// Load a byte into the transmit data register.
    fn write_data(&mut self, byte: u8);

    /// Read the status bits and the received byte they belong to.
    ///
    /// The status must be sampled before the data register is read, since
    /// reading the data register releases the status of that byte.
    fn read_frame(&mut self) -> RawFrame;
}
