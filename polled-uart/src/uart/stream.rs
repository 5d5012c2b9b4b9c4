//! Universal Asynchronous Receiver Transmitter - Stream Adapter
//!
//! Binds the transmit and receive paths to character stream interfaces:
//! [`core::fmt::Write`] for formatted output and the [`embedded_io`] traits
//! for byte streams. The adapter keeps no state of its own.

use core::fmt;

use super::{
    Directions, Enabled, Error, FlowControl, PolledRx, PolledTx, ReadErrorType, StdioMode,
    UartDevice, UartPeripheral,
};

/// Stream errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamError {
    /// The stdio mode does not bind this direction.
    Unsupported,
    /// A byte arrived with error flags, or error flags are pending.
    Read(ReadErrorType),
}

impl From<ReadErrorType> for StreamError {
    fn from(err: ReadErrorType) -> Self {
        StreamError::Read(err)
    }
}

impl embedded_io::Error for StreamError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            StreamError::Unsupported => embedded_io::ErrorKind::Unsupported,
            StreamError::Read(err) => embedded_io::Error::kind(err),
        }
    }
}

/// A character stream over an enabled UART.
///
/// Obtained with [`UartPeripheral::stream`].
///
/// Receive errors are sticky here: once a damaged byte was reported,
/// [`scan`](Self::scan) and [`embedded_io::Read::read`] keep failing,
/// without consuming input, until [`clear`](Self::clear) is called
/// ([`embedded_io::ReadReady::read_ready`] reports `true` meanwhile).
/// Generic `embedded_io` code that never calls `clear` stops receiving after
/// the first error; use the peripheral's `embedded_hal_nb::serial::Read`
/// impl there, which only reports the damaged byte itself.
pub struct Stream<'u, D: UartDevice, M: Directions, F: FlowControl> {
    uart: &'u mut UartPeripheral<Enabled, D, M, F>,
    mode: StdioMode,
}

impl<D: UartDevice, M: Directions, F: FlowControl> UartPeripheral<Enabled, D, M, F> {
    /// Bind a character stream to this UART.
    ///
    /// Fails when the configuration has [`StdioMode::None`].
    pub fn stream(&mut self) -> Result<Stream<'_, D, M, F>, Error> {
        let mode = self.state.config.stdio();
        if mode == StdioMode::None {
            return Err(Error::StreamDisabled);
        }
        Ok(Stream { uart: self, mode })
    }
}

impl<D: UartDevice, M: Directions, F: FlowControl> Stream<'_, D, M, F> {
    /// The bound directions.
    pub fn mode(&self) -> StdioMode {
        self.mode
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> Stream<'_, D, M, F> {
    /// Put one character.
    pub fn put(&mut self, byte: u8) -> Result<(), StreamError> {
        if !self.mode.printf() {
            return Err(StreamError::Unsupported);
        }
        self.uart.send_byte(byte);
        Ok(())
    }
}

impl<D: UartDevice, M: PolledRx, F: FlowControl> Stream<'_, D, M, F> {
    /// Scan one character.
    ///
    /// While error flags are pending this fails without consuming anything;
    /// a byte that arrives with errors is consumed and reported as the
    /// error. Call [`clear`](Self::clear) to resume.
    pub fn scan(&mut self) -> Result<u8, StreamError> {
        if !self.mode.scanf() {
            return Err(StreamError::Unsupported);
        }
        if let Some(err) = ReadErrorType::from_flags(self.uart.read_error_flags()) {
            return Err(err.into());
        }
        let byte = self.uart.receive_byte();
        match byte.error() {
            Some(err) => Err(err.into()),
            None => Ok(byte.value),
        }
    }

    /// Reset the error flags after a failed [`scan`](Self::scan).
    pub fn clear(&mut self) {
        self.uart.clear_errors();
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> fmt::Write for Stream<'_, D, M, F> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.bytes()
            .try_for_each(|c| self.put(c))
            .map_err(|_| fmt::Error)
    }
}

impl<D: UartDevice, M: Directions, F: FlowControl> embedded_io::ErrorType
    for Stream<'_, D, M, F>
{
    type Error = StreamError;
}

impl<D: UartDevice, M: PolledRx, F: FlowControl> embedded_io::Read for Stream<'_, D, M, F> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Block for the first byte only, then take what is already there.
        buf[0] = self.scan()?;
        let mut read = 1;
        while read < buf.len() && self.uart.uart_is_readable() {
            match self.scan() {
                Ok(byte) => {
                    buf[read] = byte;
                    read += 1;
                }
                // Reported by the next call, the flags are sticky.
                Err(_) => break,
            }
        }
        Ok(read)
    }
}

impl<D: UartDevice, M: PolledRx, F: FlowControl> embedded_io::ReadReady
    for Stream<'_, D, M, F>
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        if !self.mode.scanf() {
            return Err(StreamError::Unsupported);
        }
        Ok(self.uart.uart_is_readable() || !self.uart.read_error_flags().is_empty())
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> embedded_io::Write for Stream<'_, D, M, F> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Blocks only for the first byte.
        self.put(buf[0])?;
        let mut written = 1;
        while written < buf.len() {
            match self.uart.try_send_byte(buf[written]) {
                Ok(()) => written += 1,
                Err(_) => break,
            }
        }
        Ok(written)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        if !self.mode.printf() {
            return Err(StreamError::Unsupported);
        }
        self.uart.flush();
        Ok(())
    }
}

impl<D: UartDevice, M: PolledTx, F: FlowControl> embedded_io::WriteReady
    for Stream<'_, D, M, F>
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        if !self.mode.printf() {
            return Err(StreamError::Unsupported);
        }
        Ok(self.uart.uart_is_writable())
    }
}
