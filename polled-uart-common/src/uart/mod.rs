//! Useful UART types

pub mod baud;
mod utils;

pub use utils::*;
