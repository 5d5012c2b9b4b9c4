//! Software and hardware flow control.

mod common;

use common::{enable, wire, CtsPin, Event, RtsPin};
use polled_uart::uart::{
    common_configs, Duplex, ErrorFlags, HandshakeMode, HandshakeState, ReadErrorType,
    ResolvedConfig, RtsCts, XonXoff, DEFAULT_XOFF, DEFAULT_XON,
};

const SOFTWARE: ResolvedConfig = common_configs::_9600_8_N_1
    .with_handshake(HandshakeMode::XON_XOFF)
    .build();

const HARDWARE: ResolvedConfig = common_configs::_9600_8_N_1
    .with_handshake(HandshakeMode::Hardware)
    .build();

#[test]
fn xoff_pauses_until_xon() {
    let wire = wire();
    {
        let mut wire = wire.borrow_mut();
        wire.push(DEFAULT_XOFF);
        wire.push(b'a');
        wire.push_frame(5, DEFAULT_XON, ErrorFlags::empty());
    }
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    uart.send_byte(b'x');
    assert_eq!(
        wire.borrow().events,
        [
            Event::Rx(DEFAULT_XOFF),
            Event::Rx(b'a'),
            Event::Rx(DEFAULT_XON),
            Event::Tx(b'x'),
        ]
    );

    // The byte read while waiting is handed out, the control bytes are not.
    let received = uart.receive_byte();
    assert_eq!(received.value, b'a');
    assert!(received.is_ok());
    assert!(!uart.uart_is_readable());
}

#[test]
fn control_bytes_never_delivered() {
    let wire = wire();
    wire.borrow_mut()
        .push_all(&[DEFAULT_XOFF, DEFAULT_XON, b'1', DEFAULT_XON, b'2']);
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    assert_eq!(uart.receive_byte().value, b'1');
    assert_eq!(uart.receive_byte().value, b'2');
    assert_eq!(uart.handshake_state(), HandshakeState::Ready);
    assert!(wire.borrow().tx.is_empty());
}

#[test]
fn only_control_bytes_would_block() {
    use embedded_hal_nb::serial::Read;

    let wire = wire();
    wire.borrow_mut().push(DEFAULT_XOFF);
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    assert!(matches!(uart.read(), Err(nb::Error::WouldBlock)));
    assert_eq!(uart.handshake_state(), HandshakeState::Paused);
}

#[test]
fn damaged_control_byte_is_data() {
    let wire = wire();
    wire.borrow_mut()
        .push_frame(0, DEFAULT_XOFF, ErrorFlags::FRAME);
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    let received = uart.receive_byte();
    assert_eq!(received.value, DEFAULT_XOFF);
    assert_eq!(received.error(), Some(ReadErrorType::Framing));
    assert_eq!(uart.handshake_state(), HandshakeState::Ready);
}

#[test]
fn custom_control_bytes() {
    const CUSTOM: ResolvedConfig = common_configs::_9600_8_N_1
        .with_handshake(HandshakeMode::Software {
            xon: b'+',
            xoff: b'-',
        })
        .build();
    let wire = wire();
    wire.borrow_mut().push_all(&[DEFAULT_XOFF, b'-']);
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), CUSTOM);

    assert_eq!(uart.receive_byte().value, DEFAULT_XOFF);
    assert_eq!(uart.handshake_state(), HandshakeState::Paused);
    assert_eq!(uart.handshake(HandshakeState::Paused), HandshakeState::Paused);
    assert_eq!(wire.borrow().tx, b"-");
}

#[test]
fn handshake_sends_once_per_transition() {
    let wire = wire();
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    assert_eq!(uart.handshake(HandshakeState::Ready), HandshakeState::Ready);
    assert!(wire.borrow().tx.is_empty());

    uart.handshake(HandshakeState::Paused);
    uart.handshake(HandshakeState::Paused);
    assert_eq!(uart.local_handshake_state(), HandshakeState::Paused);
    uart.handshake(HandshakeState::Ready);
    assert_eq!(wire.borrow().tx, [DEFAULT_XOFF, DEFAULT_XON]);
}

#[test]
fn overrun_pauses_peer_once() {
    let wire = wire();
    {
        let mut wire = wire.borrow_mut();
        wire.push_frame(0, b'a', ErrorFlags::OVERRUN);
        wire.push_frame(0, b'b', ErrorFlags::OVERRUN);
    }
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    let first = uart.receive_byte();
    assert_eq!(first.error(), Some(ReadErrorType::Overrun));
    uart.receive_byte();
    assert_eq!(wire.borrow().tx, [DEFAULT_XOFF]);
    assert_eq!(uart.local_handshake_state(), HandshakeState::Paused);

    // Released by the application only.
    assert_eq!(uart.handshake(HandshakeState::Ready), HandshakeState::Ready);
    assert_eq!(wire.borrow().tx, [DEFAULT_XOFF, DEFAULT_XON]);
}

#[test]
fn pending_slot_overflow() {
    let wire = wire();
    {
        let mut wire = wire.borrow_mut();
        wire.push_all(&[DEFAULT_XOFF, b'a', b'b']);
        wire.push_frame(3, DEFAULT_XON, ErrorFlags::empty());
    }
    let mut uart = enable::<Duplex, _>(&wire, XonXoff::new(), SOFTWARE);

    uart.send_byte(b'x');
    assert_eq!(wire.borrow().tx, [DEFAULT_XOFF, b'x']);

    let received = uart.receive_byte();
    assert_eq!(received.value, b'a');
    assert_eq!(received.error(), Some(ReadErrorType::BufferFull));
    assert_eq!(uart.read_error_flags(), ErrorFlags::BUFFER_FULL);
}

#[test]
fn hardware_follows_cts() {
    let wire = wire();
    let flow = RtsCts::new(
        CtsPin { low_for: 2 },
        RtsPin {
            wire: wire.clone(),
        },
    );
    let mut uart = enable::<Duplex, _>(&wire, flow, HARDWARE);
    assert_eq!(wire.borrow().events, [Event::Rts(true)]);

    // CTS is authoritative, whatever we request.
    assert_eq!(uart.handshake(HandshakeState::Ready), HandshakeState::Paused);
    assert_eq!(uart.local_handshake_state(), HandshakeState::Ready);

    uart.send_byte(b'x');
    assert_eq!(uart.handshake(HandshakeState::Paused), HandshakeState::Ready);
    assert_eq!(
        wire.borrow().events,
        [
            Event::Rts(true),
            Event::Rts(true),
            Event::Tx(b'x'),
            Event::Rts(false),
        ]
    );

    let uart = uart.disable();
    let (_device, flow) = uart.free();
    let (_cts, _rts) = flow.free();
}

#[test]
fn hardware_overrun_drops_rts() {
    let wire = wire();
    wire.borrow_mut().push_frame(0, b'a', ErrorFlags::OVERRUN);
    let flow = RtsCts::new(
        CtsPin { low_for: 0 },
        RtsPin {
            wire: wire.clone(),
        },
    );
    let mut uart = enable::<Duplex, _>(&wire, flow, HARDWARE);

    uart.receive_byte();
    assert_eq!(uart.local_handshake_state(), HandshakeState::Paused);
    assert_eq!(
        wire.borrow().events,
        [Event::Rts(true), Event::Rx(b'a'), Event::Rts(false)]
    );
}
