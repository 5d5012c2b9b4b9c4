//! Universal Asynchronous Receiver Transmitter - Receiver Code
//!
//! This module is for receiving data with a UART.
//!
//! A received frame passes these stages before it reaches the caller:
//!
//! 1. status and data are read from the hardware, status first;
//! 2. the status is folded into the sticky error flags;
//! 3. an overrun raises receive pressure (see [`handshake`](super::handshake));
//! 4. flow control gets to swallow control bytes;
//! 5. with echo enabled, the byte is sent back out.

use core::convert::Infallible;
use nb::Error::WouldBlock;

use super::{
    Directions, Enabled, ErrorFlags, FlowControl, PolledRx, RawFrame, ReceivedByte, UartDevice,
    UartPeripheral,
};

/// Possible types of read errors, in decreasing severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadErrorType {
    /// Triggered when the received character didn't have a valid stop bit.
    Framing,

    /// Triggered when there is a parity mismatch between what's received and our settings.
    Parity,

    /// Triggered when a byte arrived before the previous one was read.
    Overrun,

    /// Triggered when the pending slot was full and a byte had to be dropped.
    BufferFull,
}

impl ReadErrorType {
    /// The most severe error among `flags`.
    pub fn from_flags(flags: ErrorFlags) -> Option<Self> {
        if flags.contains(ErrorFlags::FRAME) {
            Some(ReadErrorType::Framing)
        } else if flags.contains(ErrorFlags::PARITY) {
            Some(ReadErrorType::Parity)
        } else if flags.contains(ErrorFlags::OVERRUN) {
            Some(ReadErrorType::Overrun)
        } else if flags.contains(ErrorFlags::BUFFER_FULL) {
            Some(ReadErrorType::BufferFull)
        } else {
            None
        }
    }
}

impl embedded_hal_nb::serial::Error for ReadErrorType {
    fn kind(&self) -> embedded_hal_nb::serial::ErrorKind {
        match self {
            ReadErrorType::Framing => embedded_hal_nb::serial::ErrorKind::FrameFormat,
            ReadErrorType::Parity => embedded_hal_nb::serial::ErrorKind::Parity,
            ReadErrorType::Overrun => embedded_hal_nb::serial::ErrorKind::Overrun,
            ReadErrorType::BufferFull => embedded_hal_nb::serial::ErrorKind::Other,
        }
    }
}

impl embedded_io::Error for ReadErrorType {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::InvalidData
    }
}

pub(crate) fn is_readable<D: UartDevice>(device: &D) -> bool {
    device.is_receive_complete()
}

impl<D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Reads one frame from the hardware and runs it through the filter.
    ///
    /// Returns `None` when flow control consumed the byte.
    pub(super) fn take_frame(&mut self) -> Option<RawFrame> {
        let frame = self.device.read_frame();
        self.errors |= frame.status;

        if frame.status.contains(ErrorFlags::OVERRUN) {
            self.signal_pressure();
        }

        let data = frame.data & self.state.config.frame().data_bits.mask();

        // A damaged frame is never taken for a control symbol.
        let damaged = frame.status.intersects(ErrorFlags::FRAME | ErrorFlags::PARITY);
        if !damaged && self.flow.intercept(data) {
            return None;
        }
        Some(RawFrame {
            data,
            status: frame.status,
        })
    }

    /// Drains the receiver while the transmit path waits for the peer.
    ///
    /// The first data byte is parked in the pending slot. Once the slot is
    /// taken, reading stops as soon as the peer is clear again; until then
    /// further data bytes are dropped with `BUFFER_FULL`.
    pub(super) fn service_receiver(&mut self) {
        while is_readable(&self.device) {
            if self.pending.is_some() && self.flow.clear_to_send() {
                break;
            }
            if let Some(frame) = self.take_frame() {
                if self.pending.is_none() {
                    self.pending = Some(frame);
                } else {
                    self.errors |= ErrorFlags::BUFFER_FULL;
                    self.signal_pressure();
                }
            }
        }
    }

    fn deliver(&mut self, frame: RawFrame) -> ReceivedByte {
        let status = self.errors;
        if M::TX_POLLED && self.state.config.echo() {
            self.transmit(frame.data);
        }
        ReceivedByte {
            value: frame.data,
            status,
            frame: frame.status,
        }
    }
}

impl<D: UartDevice, M: PolledRx, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Is there data ready to be read?
    pub fn uart_is_readable(&self) -> bool {
        self.pending.is_some() || is_readable(&self.device)
    }

    /// Non-blocking [`receive_byte`](Self::receive_byte).
    ///
    /// Returns `Err(WouldBlock)` when nothing but control bytes, or nothing
    /// at all, was waiting.
    pub fn try_receive_byte(&mut self) -> nb::Result<ReceivedByte, Infallible> {
        if let Some(frame) = self.pending.take() {
            return Ok(self.deliver(frame));
        }
        while is_readable(&self.device) {
            if let Some(frame) = self.take_frame() {
                return Ok(self.deliver(frame));
            }
        }
        Err(WouldBlock)
    }

    /// Receives one byte, blocking until one is available.
    ///
    /// The returned status holds every error flag raised since the last
    /// [`clear_errors`](Self::clear_errors), this byte's included. Bytes with
    /// errors are delivered all the same; discarding them is up to the caller.
    pub fn receive_byte(&mut self) -> ReceivedByte {
        match nb::block!(self.try_receive_byte()) {
            Ok(byte) => byte,
            Err(never) => match never {},
        }
    }

    /// The sticky error flags, without consuming a byte.
    pub fn read_error_flags(&self) -> ErrorFlags {
        self.errors
    }

    /// Resets the sticky error flags.
    pub fn clear_errors(&mut self) {
        self.errors = ErrorFlags::empty();
    }

    /// Reads bytes from the UART.
    ///
    /// This function blocks until the full buffer has been received, or
    /// stops at the first damaged frame. Earlier errors still pending in
    /// [`read_error_flags`](Self::read_error_flags) do not stop it.
    pub fn read_full_blocking(&mut self, buffer: &mut [u8]) -> Result<(), ReadErrorType> {
        for slot in buffer.iter_mut() {
            let byte = self.receive_byte();
            if let Some(err) = byte.frame_error() {
                return Err(err);
            }
            *slot = byte.value;
        }
        Ok(())
    }
}
