//! Polling UART driver for AVR style USARTs
//!
//! This is an implementation of the [`embedded-hal`] serial traits for
//! microcontrollers with the classic USART register layout: data register,
//! three control/status registers and a 12 bit baud rate divisor.
//!
//! The driver waits by polling status bits. Interrupt driven directions are
//! supported in the sense that the driver configures them and then stays out
//! of their way. Flow control is available in software (XON/XOFF) or on two
//! GPIO lines (RTS/CTS).
//!
//! Register access goes through the [`uart::UartDevice`] trait;
//! [`uart::atmega::Usart`] implements it for the memory mapped register
//! block found on ATmega parts.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal

#![deny(missing_docs)]
#![no_std]

pub use polled_uart_common as common;

pub mod typelevel;
pub mod uart;
