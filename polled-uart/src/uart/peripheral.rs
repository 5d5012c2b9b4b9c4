//! Universal Asynchronous Receiver Transmitter - Bi-directional Peripheral Code
//!
//! This module owns the enable/disable lifecycle of the peripheral. The
//! transmit path lives in `uart::writer`, the receive path in `uart::reader`
//! and flow control in `uart::handshake`; all of them operate on the
//! [`UartPeripheral`] defined here.

use core::marker::PhantomData;
use embedded_hal_nb::serial::{ErrorType, Read, Write};
use nb::Error::{Other, WouldBlock};

use super::*;

/// An UART Peripheral based on an underlying UART device.
///
/// - `S`: [`Enabled`] or [`Disabled`].
/// - `D`: register access, see [`UartDevice`].
/// - `M`: which directions are polled, see [`Directions`].
/// - `F`: flow control, see [`FlowControl`].
pub struct UartPeripheral<S: State, D: UartDevice, M: Directions, F: FlowControl> {
    pub(super) device: D,
    pub(super) flow: F,
    pub(super) state: S,
    pub(super) errors: ErrorFlags,
    pub(super) pending: Option<RawFrame>,
    _directions: PhantomData<M>,
}

impl<S: State, D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<S, D, M, F> {
    fn transition<To: State>(self, state: To) -> UartPeripheral<To, D, M, F> {
        UartPeripheral {
            device: self.device,
            flow: self.flow,
            state,
            errors: ErrorFlags::empty(),
            pending: None,
            _directions: PhantomData,
        }
    }
}

impl<D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<Disabled, D, M, F> {
    /// Creates an UartPeripheral in Disabled state.
    ///
    /// Turns off the transmitter, the receiver and all interrupt sources.
    pub fn new(mut device: D, flow: F) -> UartPeripheral<Disabled, D, M, F> {
        device.set_directions(false, false);
        device.set_interrupts(Interrupts::empty());

        UartPeripheral {
            device,
            flow,
            state: Disabled,
            errors: ErrorFlags::empty(),
            pending: None,
            _directions: PhantomData,
        }
    }

    /// Releases the underlying device and flow control.
    pub fn free(self) -> (D, F) {
        (self.device, self.flow)
    }

    /// Enables the provided UART device with the given configuration.
    ///
    /// Fails if `config` polls other directions than `M`, or selects another
    /// flow control scheme than `F`.
    pub fn enable(self, config: ResolvedConfig) -> Result<UartPeripheral<Enabled, D, M, F>, Error> {
        if config.tx_polled() != M::TX_POLLED
            || config.rx_polled() != M::RX_POLLED
            || config.handshake().kind() != F::KIND
        {
            return Err(Error::CapabilityMismatch);
        }

        let mut uart = self.transition(Enabled { config });
        let device = &mut uart.device;

        device.set_directions(false, false);
        device.set_divisor(config.divisor());
        device.set_frame_format(config.frame());
        device.set_interrupts(config.interrupts());

        // Every direction is either polled or interrupt driven.
        let tx = M::TX_POLLED || config.interrupts().intersects(Interrupts::TRANSMIT);
        let rx = M::RX_POLLED || config.interrupts().contains(Interrupts::RX_COMPLETE);
        device.set_directions(tx, rx);

        uart.flow.reset(&config);

        #[cfg(feature = "defmt")]
        {
            let divisor = config.divisor();
            defmt::debug!(
                "uart: enabled at {=u32} baud (ubrr={=u16}, u2x={=bool})",
                config.baudrate().raw(),
                divisor.ubrr,
                divisor.double_speed,
            );
            if !config.within_tolerance() {
                defmt::warn!(
                    "uart: baud rate off by {=u32} per-mille",
                    config.error_permille()
                );
            }
        }

        Ok(uart)
    }
}

impl<D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Disable this UART Peripheral, falling back to the Disabled state.
    ///
    /// Sticky errors, a pending byte and the handshake state are discarded.
    pub fn disable(mut self) -> UartPeripheral<Disabled, D, M, F> {
        self.device.set_interrupts(Interrupts::empty());
        self.device.set_directions(false, false);
        self.flow.release();

        #[cfg(feature = "defmt")]
        defmt::debug!("uart: disabled");

        self.transition(Disabled)
    }

    /// The configuration the peripheral was enabled with.
    pub fn config(&self) -> &ResolvedConfig {
        &self.state.config
    }
}

impl<D: UartDevice, M: Directions, F: FlowControl> ErrorType for UartPeripheral<Enabled, D, M, F> {
    type Error = ReadErrorType;
}

/// Fails only for a byte whose own frame is damaged; flags left pending by
/// earlier frames stay in [`read_error_flags`](UartPeripheral::read_error_flags).
impl<D: UartDevice, M: PolledRx, F: FlowControl> Read<u8> for UartPeripheral<Enabled, D, M, F> {
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        match self.try_receive_byte() {
            Ok(byte) => match byte.frame_error() {
                Some(err) => Err(Other(err)),
                None => Ok(byte.value),
            },
            Err(WouldBlock) => Err(WouldBlock),
            Err(Other(never)) => match never {},
        }
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> Write<u8> for UartPeripheral<Enabled, D, M, F> {
    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.try_send_byte(word).map_err(|e| match e {
            WouldBlock => WouldBlock,
            Other(never) => match never {},
        })
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        super::writer::transmit_flushed(&self.device).map_err(|e| match e {
            WouldBlock => WouldBlock,
            Other(never) => match never {},
        })
    }
}
