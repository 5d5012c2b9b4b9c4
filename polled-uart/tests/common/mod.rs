//! Scripted USART for host tests.
//!
//! The device and the flow control pins share one [`Wire`], which records
//! everything that crosses it in order.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::convert::Infallible;
use std::rc::Rc;

use polled_uart::uart::{
    Directions, Divisor, Enabled, ErrorFlags, FlowControl, FrameFormat, Interrupts, RawFrame,
    ResolvedConfig, UartDevice, UartPeripheral,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Tx(u8),
    Rx(u8),
    Rts(bool),
}

/// A frame the peer sends, readable once `delay` receive polls have passed.
#[derive(Debug, Clone, Copy)]
pub struct Incoming {
    pub delay: u32,
    pub frame: RawFrame,
}

#[derive(Debug, Default)]
pub struct Wire {
    pub rx: VecDeque<Incoming>,
    pub tx: Vec<u8>,
    pub events: Vec<Event>,
    pub loopback: bool,
    pub tx_latency: u32,
    pub tx_busy: u32,
    pub divisor: Option<Divisor>,
    pub frame: Option<FrameFormat>,
    pub interrupts: Interrupts,
    pub directions: (bool, bool),
}

pub type SharedWire = Rc<RefCell<Wire>>;

pub fn wire() -> SharedWire {
    Rc::new(RefCell::new(Wire::default()))
}

impl Wire {
    pub fn push(&mut self, data: u8) {
        self.push_frame(0, data, ErrorFlags::empty());
    }

    pub fn push_all(&mut self, data: &[u8]) {
        for &byte in data {
            self.push(byte);
        }
    }

    pub fn push_frame(&mut self, delay: u32, data: u8, status: ErrorFlags) {
        self.rx.push_back(Incoming {
            delay,
            frame: RawFrame { data, status },
        });
    }
}

pub struct MockUart {
    pub wire: SharedWire,
}

impl UartDevice for MockUart {
    fn set_divisor(&mut self, divisor: Divisor) {
        self.wire.borrow_mut().divisor = Some(divisor);
    }

    fn set_frame_format(&mut self, frame: FrameFormat) {
        self.wire.borrow_mut().frame = Some(frame);
    }

    fn set_interrupts(&mut self, interrupts: Interrupts) {
        self.wire.borrow_mut().interrupts = interrupts;
    }

    fn set_directions(&mut self, tx: bool, rx: bool) {
        self.wire.borrow_mut().directions = (tx, rx);
    }

    fn is_data_register_empty(&self) -> bool {
        true
    }

    fn is_transmit_complete(&self) -> bool {
        let mut wire = self.wire.borrow_mut();
        if wire.tx_busy == 0 {
            true
        } else {
            wire.tx_busy -= 1;
            false
        }
    }

    fn is_receive_complete(&self) -> bool {
        let mut wire = self.wire.borrow_mut();
        match wire.rx.front_mut() {
            Some(incoming) if incoming.delay == 0 => true,
            Some(incoming) => {
                incoming.delay -= 1;
                false
            }
            None => false,
        }
    }

    fn write_data(&mut self, byte: u8) {
        let mut wire = self.wire.borrow_mut();
        wire.tx.push(byte);
        wire.events.push(Event::Tx(byte));
        wire.tx_busy = wire.tx_latency;
        if wire.loopback {
            wire.push(byte);
        }
    }

    fn read_frame(&mut self) -> RawFrame {
        let mut wire = self.wire.borrow_mut();
        let frame = wire
            .rx
            .pop_front()
            .expect("read_frame without receive complete")
            .frame;
        wire.events.push(Event::Rx(frame.data));
        frame
    }
}

/// CTS input that rises after a number of reads.
pub struct CtsPin {
    pub low_for: u32,
}

impl embedded_hal::digital::ErrorType for CtsPin {
    type Error = Infallible;
}

impl embedded_hal::digital::InputPin for CtsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.low_for == 0 {
            Ok(true)
        } else {
            self.low_for -= 1;
            Ok(false)
        }
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// RTS output logging its level to the wire.
pub struct RtsPin {
    pub wire: SharedWire,
}

impl embedded_hal::digital::ErrorType for RtsPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for RtsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().events.push(Event::Rts(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.wire.borrow_mut().events.push(Event::Rts(true));
        Ok(())
    }
}

pub fn enable<M: Directions, F: FlowControl>(
    wire: &SharedWire,
    flow: F,
    config: ResolvedConfig,
) -> UartPeripheral<Enabled, MockUart, M, F> {
    UartPeripheral::new(MockUart { wire: wire.clone() }, flow)
        .enable(config)
        .unwrap()
}
