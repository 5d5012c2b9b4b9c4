//! Universal Asynchronous Receiver Transmitter - Transmitter Code
//!
//! This module is for transmitting data with a UART.
//!
//! Every wait in here is a busy loop without timeout: a peer that never
//! sends XON, a CTS line that never rises or a stopped clock hang the caller.

use core::convert::Infallible;
use nb::Error::WouldBlock;

use super::{Directions, Enabled, FlowControl, PolledTx, UartDevice, UartPeripheral};

/// Returns `Err(WouldBlock)` while the last byte is still being shifted out,
/// `Ok(())` once the line is idle.
pub(crate) fn transmit_flushed<D: UartDevice>(device: &D) -> nb::Result<(), Infallible> {
    if device.is_transmit_complete() {
        Ok(())
    } else {
        Err(WouldBlock)
    }
}

/// Returns `true` if the data register can take a byte.
pub(crate) fn uart_is_writable<D: UartDevice>(device: &D) -> bool {
    device.is_data_register_empty()
}

/// Waits for the data register to empty, then loads `byte`.
///
/// No flow control gating; used for control bytes and by the gated path.
pub(crate) fn write_byte<D: UartDevice>(device: &mut D, byte: u8) {
    while !uart_is_writable(device) {}
    device.write_data(byte);
}

impl<D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Blocks while the peer holds us off, then sends `byte`.
    pub(super) fn transmit(&mut self, byte: u8) {
        loop {
            if F::SERVICES_RECEIVER {
                self.service_receiver();
            }
            if self.flow.clear_to_send() {
                break;
            }
            core::hint::spin_loop();
        }
        write_byte(&mut self.device, byte);
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Sends one byte.
    ///
    /// With flow control, blocks until the peer allows transmission; then
    /// blocks until the data register is empty and loads `byte`.
    pub fn send_byte(&mut self, byte: u8) {
        self.transmit(byte);
    }

    /// Writes bytes to the UART.
    ///
    /// This function blocks until the full buffer has been sent.
    pub fn write_full_blocking(&mut self, data: &[u8]) {
        for &byte in data {
            self.transmit(byte);
        }
    }

    /// Blocks until the last byte has left the shift register.
    pub fn flush(&mut self) {
        while transmit_flushed(&self.device).is_err() {}
    }

    /// Is there space in the transmit data register for new data to be written?
    pub fn uart_is_writable(&self) -> bool {
        uart_is_writable(&self.device)
    }

    /// Is the UART still busy transmitting data?
    pub fn uart_is_busy(&self) -> bool {
        transmit_flushed(&self.device).is_err()
    }

    /// Non-blocking [`send_byte`](Self::send_byte).
    ///
    /// Returns `Err(WouldBlock)` while the peer holds us off or the data
    /// register is full.
    pub fn try_send_byte(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        if F::SERVICES_RECEIVER {
            self.service_receiver();
        }
        if !self.flow.clear_to_send() || !uart_is_writable(&self.device) {
            return Err(WouldBlock);
        }
        self.device.write_data(byte);
        Ok(())
    }
}
