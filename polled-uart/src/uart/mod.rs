//! Universal Asynchronous Receiver Transmitter (UART)
//!
//! Polling driver for AVR style USARTs: a data register, a status register
//! with receive complete, transmit complete and data register empty bits,
//! and a 12 bit baud rate divisor with an optional double speed mode.
//!
//! ## Usage
//!
//! ```no_run
//! use fugit::HertzU32;
//! use polled_uart::uart::{
//!     atmega::{Usart, USART0_BASE},
//!     Duplex, HandshakeMode, HandshakeState, ResolvedConfig, Settings, UartPeripheral, XonXoff,
//! };
//!
//! const CONFIG: ResolvedConfig = Settings::new(HertzU32::from_raw(9600))
//!     .with_clock(HertzU32::from_raw(16_000_000))
//!     .with_handshake(HandshakeMode::XON_XOFF)
//!     .build();
//!
//! // SAFETY: USART0 is not used anywhere else.
//! let usart = unsafe { Usart::from_address(USART0_BASE) };
//! let mut uart = UartPeripheral::<_, _, Duplex, _>::new(usart, XonXoff::new())
//!     .enable(CONFIG)
//!     .unwrap();
//!
//! uart.write_full_blocking(b"Hello World!\r\n");
//!
//! let byte = uart.receive_byte();
//! if byte.is_ok() {
//!     uart.send_byte(byte.value);
//! }
//! uart.handshake(HandshakeState::Ready);
//! ```

mod config;
pub mod handshake;
mod peripheral;
mod reader;
mod stream;
mod utils;
mod writer;

pub mod atmega;

pub use self::config::*;
pub use self::handshake::{FlowControl, HandshakeState, Handshaking, NoHandshake, RtsCts, XonXoff};
pub use self::peripheral::UartPeripheral;
pub use self::reader::ReadErrorType;
pub use self::stream::{Stream, StreamError};
pub use self::utils::*;
pub use polled_uart_common::uart::baud::{Divisor, MAX_UBRR};
pub use polled_uart_common::uart::{DataBits, FrameFormat, Parity, StopBits};

/// Common configurations for UART.
pub mod common_configs;
