//! Common UART code
//!
//! This library contains the frame-format types and the baud-rate divisor
//! arithmetic shared by every `polled-uart` backend.
//!
//! You shouldn't include anything here which touches device registers.

#![deny(missing_docs)]
#![no_std]

pub mod uart;
