//! Universal Asynchronous Receiver Transmitter - Flow Control
//!
//! Two schemes guard the line, selected by the flow control type parameter
//! of [`UartPeripheral`]:
//!
//! - [`XonXoff`]: in-band control bytes. The receive path swallows incoming
//!   XON/XOFF bytes before they reach the application, and the transmit path
//!   holds back while the peer has sent XOFF.
//! - [`RtsCts`]: discrete lines. The transmit path only loads a byte while
//!   CTS is high; RTS tells the peer whether we accept data.
//!
//! # Receive pressure
//!
//! The driver holds at most one byte, so "cannot accept more" has no natural
//! meaning. Pressure is raised when the hardware reports an overrun or the
//! pending slot overflows; the driver then sends XOFF (or drops RTS) once.
//! Nothing releases it automatically: the application calls
//! [`UartPeripheral::handshake`] with [`HandshakeState::Ready`] once it has
//! caught up. Applications with their own buffers signal pressure the same
//! way with [`HandshakeState::Paused`].

use embedded_hal::digital::{InputPin, OutputPin};

use super::writer::write_byte;
use super::{
    Duplex, Enabled, HandshakeKind, HandshakeMode, ResolvedConfig, UartDevice, UartPeripheral,
    DEFAULT_XOFF, DEFAULT_XON,
};
use crate::typelevel::Sealed;

/// Readiness of one side of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// Data may flow.
    Ready,
    /// Data must be held back.
    Paused,
}

/// Flow control scheme.
///
/// Implemented by [`NoHandshake`], [`XonXoff`] and [`RtsCts`] only.
pub trait FlowControl: Sealed {
    /// Scheme, compared with the configuration on enable.
    const KIND: HandshakeKind;

    /// The transmit path has to keep reading the receiver while it waits,
    /// since the resume signal arrives in-band.
    const SERVICES_RECEIVER: bool;

    /// Start over with both sides ready.
    fn reset(&mut self, config: &ResolvedConfig);

    /// The peripheral is being disabled.
    fn release(&mut self);

    /// Filter stage of the receive path. Returns `true` when `byte` was a
    /// control symbol and must not be delivered.
    fn intercept(&mut self, byte: u8) -> bool;

    /// The peer currently accepts data.
    fn clear_to_send(&mut self) -> bool;

    /// Tell the peer whether we accept data.
    fn signal<D: UartDevice>(&mut self, device: &mut D, state: HandshakeState);

    /// What we last told the peer.
    fn local_state(&self) -> HandshakeState;
}

/// Flow control schemes that expose [`UartPeripheral::handshake`].
pub trait Handshaking: FlowControl {}

/// No flow control.
#[derive(Debug, Default)]
pub struct NoHandshake;

impl Sealed for NoHandshake {}
impl FlowControl for NoHandshake {
    const KIND: HandshakeKind = HandshakeKind::Disabled;
    const SERVICES_RECEIVER: bool = false;

    fn reset(&mut self, _config: &ResolvedConfig) {}

    fn release(&mut self) {}

    fn intercept(&mut self, _byte: u8) -> bool {
        false
    }

    fn clear_to_send(&mut self) -> bool {
        true
    }

    fn signal<D: UartDevice>(&mut self, _device: &mut D, _state: HandshakeState) {}

    fn local_state(&self) -> HandshakeState {
        HandshakeState::Ready
    }
}

/// Software flow control with XON/XOFF control bytes.
///
/// The control byte values are taken from the configuration on enable.
#[derive(Debug)]
pub struct XonXoff {
    xon: u8,
    xoff: u8,
    sent: HandshakeState,
    peer: HandshakeState,
}

impl XonXoff {
    /// Create the negotiator; both sides start ready.
    pub const fn new() -> Self {
        XonXoff {
            xon: DEFAULT_XON,
            xoff: DEFAULT_XOFF,
            sent: HandshakeState::Ready,
            peer: HandshakeState::Ready,
        }
    }
}

impl Default for XonXoff {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for XonXoff {}
impl FlowControl for XonXoff {
    const KIND: HandshakeKind = HandshakeKind::Software;
    const SERVICES_RECEIVER: bool = true;

    fn reset(&mut self, config: &ResolvedConfig) {
        if let HandshakeMode::Software { xon, xoff } = config.handshake() {
            self.xon = xon;
            self.xoff = xoff;
        }
        self.sent = HandshakeState::Ready;
        self.peer = HandshakeState::Ready;
    }

    fn release(&mut self) {}

    fn intercept(&mut self, byte: u8) -> bool {
        if byte == self.xoff {
            #[cfg(feature = "defmt")]
            defmt::trace!("uart: XOFF from peer");
            self.peer = HandshakeState::Paused;
            true
        } else if byte == self.xon {
            #[cfg(feature = "defmt")]
            defmt::trace!("uart: XON from peer");
            self.peer = HandshakeState::Ready;
            true
        } else {
            false
        }
    }

    fn clear_to_send(&mut self) -> bool {
        self.peer == HandshakeState::Ready
    }

    fn signal<D: UartDevice>(&mut self, device: &mut D, state: HandshakeState) {
        // Each symbol is sent once per transition.
        if state == self.sent {
            return;
        }
        // Control bytes are not subject to the peer's XOFF.
        write_byte(
            device,
            match state {
                HandshakeState::Ready => self.xon,
                HandshakeState::Paused => self.xoff,
            },
        );
        self.sent = state;
    }

    fn local_state(&self) -> HandshakeState {
        self.sent
    }
}

impl Handshaking for XonXoff {}

/// Hardware flow control on two GPIO lines, both active high.
///
/// CTS is the peer's permission for us to transmit; RTS is our permission
/// for the peer. A CTS pin that fails to read counts as low.
#[derive(Debug)]
pub struct RtsCts<CTS, RTS> {
    cts: CTS,
    rts: RTS,
    sent: HandshakeState,
}

impl<CTS, RTS> RtsCts<CTS, RTS>
where
    CTS: InputPin,
    RTS: OutputPin,
{
    /// Take ownership of the CTS input and the RTS output.
    pub fn new(cts: CTS, rts: RTS) -> Self {
        RtsCts {
            cts,
            rts,
            sent: HandshakeState::Paused,
        }
    }

    /// Release the pins.
    pub fn free(self) -> (CTS, RTS) {
        (self.cts, self.rts)
    }

    fn drive(&mut self, state: HandshakeState) {
        // A failing RTS pin surfaces as a stalled peer, not as an error here.
        let _ = match state {
            HandshakeState::Ready => self.rts.set_high(),
            HandshakeState::Paused => self.rts.set_low(),
        };
        self.sent = state;
    }
}

impl<CTS, RTS> Sealed for RtsCts<CTS, RTS> {}
impl<CTS, RTS> FlowControl for RtsCts<CTS, RTS>
where
    CTS: InputPin,
    RTS: OutputPin,
{
    const KIND: HandshakeKind = HandshakeKind::Hardware;
    const SERVICES_RECEIVER: bool = false;

    fn reset(&mut self, _config: &ResolvedConfig) {
        self.drive(HandshakeState::Ready);
    }

    fn release(&mut self) {
        self.drive(HandshakeState::Paused);
    }

    fn intercept(&mut self, _byte: u8) -> bool {
        false
    }

    fn clear_to_send(&mut self) -> bool {
        self.cts.is_high().unwrap_or(false)
    }

    fn signal<D: UartDevice>(&mut self, _device: &mut D, state: HandshakeState) {
        self.drive(state);
    }

    fn local_state(&self) -> HandshakeState {
        self.sent
    }
}

impl<CTS, RTS> Handshaking for RtsCts<CTS, RTS>
where
    CTS: InputPin,
    RTS: OutputPin,
{
}

impl<D: UartDevice, F: Handshaking> UartPeripheral<Enabled, D, Duplex, F> {
    /// Request a local state and report the peer's state.
    ///
    /// `request` is what we tell the peer: [`HandshakeState::Paused`] sends
    /// XOFF or drops RTS, [`HandshakeState::Ready`] sends XON or raises RTS.
    /// The return value is whether the peer currently lets us transmit; with
    /// hardware flow control that is the CTS line, whatever was requested.
    pub fn handshake(&mut self, request: HandshakeState) -> HandshakeState {
        self.flow.signal(&mut self.device, request);
        self.handshake_state()
    }

    /// Report the peer's state without changing ours.
    ///
    /// With software flow control this picks up control bytes already
    /// waiting in the receiver.
    pub fn handshake_state(&mut self) -> HandshakeState {
        if F::SERVICES_RECEIVER {
            self.service_receiver();
        }
        if self.flow.clear_to_send() {
            HandshakeState::Ready
        } else {
            HandshakeState::Paused
        }
    }

    /// What we last told the peer.
    pub fn local_handshake_state(&self) -> HandshakeState {
        self.flow.local_state()
    }
}

impl<D: UartDevice, M: super::Directions, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Receive path pressure: ask the peer to pause, once.
    pub(super) fn signal_pressure(&mut self) {
        if self.flow.local_state() == HandshakeState::Ready && F::KIND != HandshakeKind::Disabled {
            #[cfg(feature = "defmt")]
            defmt::warn!("uart: receive pressure, pausing peer");
            self.flow.signal(&mut self.device, HandshakeState::Paused);
        }
    }
}

