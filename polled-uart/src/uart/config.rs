//! Universal Asynchronous Receiver Transmitter - Configuration
//!
//! Static settings are turned into a [`ResolvedConfig`] by
//! [`Settings::resolve`], a `const fn`. Binding the result of
//! [`Settings::build`] to a `const` item moves every configuration error to
//! compile time:
//!
//! ```
//! use fugit::HertzU32;
//! use polled_uart::uart::{HandshakeMode, ResolvedConfig, Settings};
//!
//! const CONFIG: ResolvedConfig = Settings::new(HertzU32::from_raw(9600))
//!     .with_clock(HertzU32::from_raw(16_000_000))
//!     .with_handshake(HandshakeMode::XON_XOFF)
//!     .build();
//!
//! assert_eq!(CONFIG.divisor().ubrr, 103);
//! ```
//!
//! A conflicting combination fails to build:
//!
//! ```compile_fail
//! use fugit::HertzU32;
//! use polled_uart::uart::{Interrupts, ResolvedConfig, Settings};
//!
//! const CONFIG: ResolvedConfig = Settings::new(HertzU32::from_raw(9600))
//!     .with_interrupts(Interrupts::TX_COMPLETE.union(Interrupts::DATA_EMPTY))
//!     .build();
//! ```

use bitflags::bitflags;
use core::fmt;
use fugit::HertzU32;
use polled_uart_common::uart::baud::{self, Divisor, DEFAULT_TOLERANCE_PERMILLE};

use super::FrameFormat;

/// Default resume (XON) control byte.
pub const DEFAULT_XON: u8 = 0x11;

/// Default pause (XOFF) control byte.
pub const DEFAULT_XOFF: u8 = 0x13;

/// Default peripheral clock.
pub const DEFAULT_CLOCK: HertzU32 = HertzU32::from_raw(12_000_000);

bitflags! {
    /// Interrupt sources handed over to application interrupt handlers.
    ///
    /// Each source removes the polling functions of its direction.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct Interrupts: u8 {
        /// Receive complete.
        const RX_COMPLETE = 1 << 0;
        /// Transmit complete.
        const TX_COMPLETE = 1 << 1;
        /// Transmit data register empty.
        const DATA_EMPTY = 1 << 2;
    }
}

impl Interrupts {
    /// Sources belonging to the transmit direction.
    pub const TRANSMIT: Self = Self::TX_COMPLETE.union(Self::DATA_EMPTY);
}

#[cfg(feature = "defmt")]
impl defmt::Format for Interrupts {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Interrupts({=u8:#x})", self.bits())
    }
}

/// Flow control selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeMode {
    /// No flow control.
    Disabled,
    /// In-band XON/XOFF control bytes.
    Software {
        /// Byte requesting the peer to resume.
        xon: u8,
        /// Byte requesting the peer to pause.
        xoff: u8,
    },
    /// RTS/CTS signal lines.
    Hardware,
}

impl HandshakeMode {
    /// Software flow control with the customary control bytes.
    pub const XON_XOFF: Self = HandshakeMode::Software {
        xon: DEFAULT_XON,
        xoff: DEFAULT_XOFF,
    };

    /// The scheme, without its parameters.
    pub const fn kind(&self) -> HandshakeKind {
        match self {
            HandshakeMode::Disabled => HandshakeKind::Disabled,
            HandshakeMode::Software { .. } => HandshakeKind::Software,
            HandshakeMode::Hardware => HandshakeKind::Hardware,
        }
    }
}

/// Flow control scheme, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeKind {
    /// No flow control.
    Disabled,
    /// XON/XOFF.
    Software,
    /// RTS/CTS.
    Hardware,
}

/// Formatted I/O integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StdioMode {
    /// No stream binding.
    None,
    /// Formatted output and input.
    PrintfScanf,
    /// Formatted output only.
    PrintfOnly,
    /// Formatted input only.
    ScanfOnly,
}

impl StdioMode {
    /// Output is bound.
    pub const fn printf(&self) -> bool {
        matches!(self, StdioMode::PrintfScanf | StdioMode::PrintfOnly)
    }

    /// Input is bound.
    pub const fn scanf(&self) -> bool {
        matches!(self, StdioMode::PrintfScanf | StdioMode::ScanfOnly)
    }
}

/// Configuration errors.
///
/// These are meant to surface while building, see [`Settings::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Transmit complete and data register empty interrupts both selected.
    ConflictingTransmitInterrupts,
    /// Echo needs a polled transmitter.
    EchoRequiresPolledTransmit,
    /// Flow control is only available when no interrupt source is selected.
    HandshakeRequiresPolling,
    /// XON and XOFF are the same byte.
    AmbiguousControlBytes,
    /// Formatted output needs a polled transmitter.
    StreamRequiresPolledTransmit,
    /// Formatted input needs a polled receiver.
    StreamRequiresPolledReceive,
    /// No divisor produces the baud rate from the clock.
    BaudRateOutOfRange,
}

impl ConfigError {
    /// Human readable description.
    pub const fn message(&self) -> &'static str {
        match self {
            ConfigError::ConflictingTransmitInterrupts => {
                "transmit complete and data register empty interrupts cannot be used together"
            }
            ConfigError::EchoRequiresPolledTransmit => {
                "echo cannot be used with transmit interrupts"
            }
            ConfigError::HandshakeRequiresPolling => {
                "flow control cannot be used with interrupts"
            }
            ConfigError::AmbiguousControlBytes => "XON and XOFF must differ",
            ConfigError::StreamRequiresPolledTransmit => {
                "formatted output cannot be used with transmit interrupts"
            }
            ConfigError::StreamRequiresPolledReceive => {
                "formatted input cannot be used with the receive interrupt"
            }
            ConfigError::BaudRateOutOfRange => "baud rate not reachable from the clock",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Static settings for the UART.
///
/// The `Default` implementation is 9600 baud 8N1 at 12MHz, no echo, no flow
/// control, formatted input and output, no interrupts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub struct Settings {
    /// Peripheral clock frequency.
    pub clock: HertzU32,
    /// Wanted baud rate.
    pub baudrate: HertzU32,
    /// Frame format.
    pub frame: FrameFormat,
    /// Echo every received byte back.
    pub echo: bool,
    /// Flow control.
    pub handshake: HandshakeMode,
    /// Stream integration.
    pub stdio: StdioMode,
    /// Interrupt sources left to the application.
    pub interrupts: Interrupts,
    /// Acceptable baud rate error in per-mille.
    pub tolerance_permille: u32,
}

impl Settings {
    /// Default settings at the given baud rate.
    pub const fn new(baudrate: HertzU32) -> Self {
        Settings {
            clock: DEFAULT_CLOCK,
            baudrate,
            frame: FrameFormat::new(
                super::DataBits::Eight,
                None,
                super::StopBits::One,
            ),
            echo: false,
            handshake: HandshakeMode::Disabled,
            stdio: StdioMode::PrintfScanf,
            interrupts: Interrupts::empty(),
            tolerance_permille: DEFAULT_TOLERANCE_PERMILLE,
        }
    }

    /// Set the peripheral clock.
    pub const fn with_clock(mut self, clock: HertzU32) -> Self {
        self.clock = clock;
        self
    }

    /// Set the frame format.
    pub const fn with_frame(mut self, frame: FrameFormat) -> Self {
        self.frame = frame;
        self
    }

    /// Enable or disable echo.
    pub const fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Select flow control.
    pub const fn with_handshake(mut self, handshake: HandshakeMode) -> Self {
        self.handshake = handshake;
        self
    }

    /// Select stream integration.
    pub const fn with_stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }

    /// Hand interrupt sources over to the application.
    pub const fn with_interrupts(mut self, interrupts: Interrupts) -> Self {
        self.interrupts = interrupts;
        self
    }

    /// Change the acceptable baud rate error.
    pub const fn with_tolerance_permille(mut self, tolerance_permille: u32) -> Self {
        self.tolerance_permille = tolerance_permille;
        self
    }

    /// Validate the settings and compute the baud rate divisor.
    pub const fn resolve(self) -> Result<ResolvedConfig, ConfigError> {
        let tx_irq = self.interrupts.intersects(Interrupts::TRANSMIT);
        let rx_irq = self.interrupts.contains(Interrupts::RX_COMPLETE);

        if self.interrupts.contains(Interrupts::TRANSMIT) {
            return Err(ConfigError::ConflictingTransmitInterrupts);
        }
        if self.echo && tx_irq {
            return Err(ConfigError::EchoRequiresPolledTransmit);
        }
        match self.handshake {
            HandshakeMode::Disabled => {}
            HandshakeMode::Software { xon, xoff } => {
                if !self.interrupts.is_empty() {
                    return Err(ConfigError::HandshakeRequiresPolling);
                }
                if xon == xoff {
                    return Err(ConfigError::AmbiguousControlBytes);
                }
            }
            HandshakeMode::Hardware => {
                if !self.interrupts.is_empty() {
                    return Err(ConfigError::HandshakeRequiresPolling);
                }
            }
        }
        if self.stdio.printf() && tx_irq {
            return Err(ConfigError::StreamRequiresPolledTransmit);
        }
        if self.stdio.scanf() && rx_irq {
            return Err(ConfigError::StreamRequiresPolledReceive);
        }

        let divisor =
            match baud::calculate_divisor(self.clock, self.baudrate, self.tolerance_permille) {
                Ok(divisor) => divisor,
                Err(_) => return Err(ConfigError::BaudRateOutOfRange),
            };

        Ok(ResolvedConfig {
            frame: self.frame,
            divisor,
            baudrate: divisor.baudrate(self.clock),
            error_permille: divisor.error_permille(self.clock, self.baudrate),
            tolerance_permille: self.tolerance_permille,
            echo: self.echo,
            handshake: self.handshake,
            stdio: self.stdio,
            interrupts: self.interrupts,
        })
    }

    /// Like [`resolve`](Self::resolve), but panics on error.
    ///
    /// Used in a `const` item, the panic is a compile error.
    pub const fn build(self) -> ResolvedConfig {
        match self.resolve() {
            Ok(config) => config,
            Err(err) => panic!("{}", err.message()),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(HertzU32::from_raw(9600))
    }
}

/// Validated configuration, consumed by
/// [`UartPeripheral::enable`](super::UartPeripheral::enable).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResolvedConfig {
    frame: FrameFormat,
    divisor: Divisor,
    baudrate: HertzU32,
    error_permille: u32,
    tolerance_permille: u32,
    echo: bool,
    handshake: HandshakeMode,
    stdio: StdioMode,
    interrupts: Interrupts,
}

impl ResolvedConfig {
    /// Frame format.
    pub const fn frame(&self) -> FrameFormat {
        self.frame
    }

    /// Baud rate divisor.
    pub const fn divisor(&self) -> Divisor {
        self.divisor
    }

    /// The baud rate the divisor actually produces.
    pub const fn baudrate(&self) -> HertzU32 {
        self.baudrate
    }

    /// Deviation of the actual from the wanted baud rate, in per-mille.
    pub const fn error_permille(&self) -> u32 {
        self.error_permille
    }

    /// Whether the baud rate error is acceptable.
    ///
    /// Out of tolerance rates are not rejected; the peer may still cope.
    pub const fn within_tolerance(&self) -> bool {
        self.error_permille <= self.tolerance_permille
    }

    /// Echo received bytes.
    pub const fn echo(&self) -> bool {
        self.echo
    }

    /// Flow control.
    pub const fn handshake(&self) -> HandshakeMode {
        self.handshake
    }

    /// Stream integration.
    pub const fn stdio(&self) -> StdioMode {
        self.stdio
    }

    /// Interrupt sources left to the application.
    pub const fn interrupts(&self) -> Interrupts {
        self.interrupts
    }

    /// The transmit path is polled.
    pub const fn tx_polled(&self) -> bool {
        !self.interrupts.intersects(Interrupts::TRANSMIT)
    }

    /// The receive path is polled.
    pub const fn rx_polled(&self) -> bool {
        !self.interrupts.contains(Interrupts::RX_COMPLETE)
    }
}
