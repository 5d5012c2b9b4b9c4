//! Register backend for the ATmega48/88/168/328 USART
//!
//! The register block is memory mapped in the extended I/O space; USART0
//! starts at [`USART0_BASE`]. Parts where UCSRC shares its address with
//! UBRRH (URSEL) are not covered.

use vcell::VolatileCell;

use super::{DataBits, Divisor, ErrorFlags, FrameFormat, Interrupts, Parity, RawFrame, StopBits};
use super::UartDevice;

/// Data memory address of the USART0 register block.
pub const USART0_BASE: usize = 0xC0;

/// USART register block.
#[repr(C)]
pub struct RegisterBlock {
    /// Control and status register A.
    pub ucsra: VolatileCell<u8>,
    /// Control and status register B.
    pub ucsrb: VolatileCell<u8>,
    /// Control and status register C.
    pub ucsrc: VolatileCell<u8>,
    _reserved: VolatileCell<u8>,
    /// Baud rate register, low byte.
    pub ubrrl: VolatileCell<u8>,
    /// Baud rate register, high nibble.
    pub ubrrh: VolatileCell<u8>,
    /// Data register.
    pub udr: VolatileCell<u8>,
}

impl RegisterBlock {
    /// A block with all registers at their reset value, for use outside of
    /// the memory map.
    pub const fn new() -> Self {
        RegisterBlock {
            ucsra: VolatileCell::new(UCSRA_UDRE),
            ucsrb: VolatileCell::new(0),
            ucsrc: VolatileCell::new(UCSRC_UCSZ_8),
            _reserved: VolatileCell::new(0),
            ubrrl: VolatileCell::new(0),
            ubrrh: VolatileCell::new(0),
            udr: VolatileCell::new(0),
        }
    }
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self::new()
    }
}

// UCSRA
const UCSRA_RXC: u8 = 1 << 7;
const UCSRA_TXC: u8 = 1 << 6;
const UCSRA_UDRE: u8 = 1 << 5;
const UCSRA_FE: u8 = 1 << 4;
const UCSRA_DOR: u8 = 1 << 3;
const UCSRA_UPE: u8 = 1 << 2;
const UCSRA_U2X: u8 = 1 << 1;

// UCSRB
const UCSRB_RXCIE: u8 = 1 << 7;
const UCSRB_TXCIE: u8 = 1 << 6;
const UCSRB_UDRIE: u8 = 1 << 5;
const UCSRB_RXEN: u8 = 1 << 4;
const UCSRB_TXEN: u8 = 1 << 3;
const UCSRB_UCSZ2: u8 = 1 << 2;
const UCSRB_INTERRUPTS: u8 = UCSRB_RXCIE | UCSRB_TXCIE | UCSRB_UDRIE;

// UCSRC
const UCSRC_UPM_EVEN: u8 = 0b10 << 4;
const UCSRC_UPM_ODD: u8 = 0b11 << 4;
const UCSRC_USBS: u8 = 1 << 3;
const UCSRC_UCSZ_8: u8 = 0b11 << 1;

/// USART driven through its memory mapped registers.
pub struct Usart<'r> {
    rb: &'r RegisterBlock,
    // TXC only rises after a byte was sent.
    sent: bool,
}

impl<'r> Usart<'r> {
    /// Take exclusive use of a register block.
    pub fn new(rb: &'r mut RegisterBlock) -> Self {
        Usart { rb, sent: false }
    }

    /// Address the register block at `address`.
    ///
    /// # Safety
    ///
    /// `address` must be the base of a USART register block, and no other
    /// [`Usart`] may exist for it.
    pub unsafe fn from_address(address: usize) -> Usart<'static> {
        Usart {
            rb: &*(address as *const RegisterBlock),
            sent: false,
        }
    }

    /// Direct access to the registers.
    pub fn registers(&self) -> &RegisterBlock {
        self.rb
    }

    fn modify_ucsrb(&mut self, keep: u8, set: u8) {
        let value = self.rb.ucsrb.get() & keep;
        self.rb.ucsrb.set(value | set);
    }
}

fn frame_bits(frame: FrameFormat) -> u8 {
    let parity = match frame.parity {
        None => 0,
        Some(Parity::Even) => UCSRC_UPM_EVEN,
        Some(Parity::Odd) => UCSRC_UPM_ODD,
    };
    let stop = match frame.stop_bits {
        StopBits::One => 0,
        StopBits::Two => UCSRC_USBS,
    };
    let size = match frame.data_bits {
        DataBits::Five => 0b00,
        DataBits::Six => 0b01,
        DataBits::Seven => 0b10,
        DataBits::Eight => 0b11,
    };
    parity | stop | (size << 1)
}

impl UartDevice for Usart<'_> {
    fn set_divisor(&mut self, divisor: Divisor) {
        // UBRRL updates the prescaler, so the high byte goes first.
        self.rb.ubrrh.set((divisor.ubrr >> 8) as u8 & 0x0F);
        self.rb.ubrrl.set(divisor.ubrr as u8);
        // Flag bits must be written as zero.
        self.rb
            .ucsra
            .set(if divisor.double_speed { UCSRA_U2X } else { 0 });
    }

    fn set_frame_format(&mut self, frame: FrameFormat) {
        self.modify_ucsrb(!UCSRB_UCSZ2, 0);
        self.rb.ucsrc.set(frame_bits(frame));
    }

    fn set_interrupts(&mut self, interrupts: Interrupts) {
        let mut set = 0;
        if interrupts.contains(Interrupts::RX_COMPLETE) {
            set |= UCSRB_RXCIE;
        }
        if interrupts.contains(Interrupts::TX_COMPLETE) {
            set |= UCSRB_TXCIE;
        }
        if interrupts.contains(Interrupts::DATA_EMPTY) {
            set |= UCSRB_UDRIE;
        }
        self.modify_ucsrb(!UCSRB_INTERRUPTS, set);
    }

    fn set_directions(&mut self, tx: bool, rx: bool) {
        let mut set = 0;
        if tx {
            set |= UCSRB_TXEN;
        }
        if rx {
            set |= UCSRB_RXEN;
        }
        self.modify_ucsrb(!(UCSRB_TXEN | UCSRB_RXEN), set);
        self.sent = false;
    }

    fn is_data_register_empty(&self) -> bool {
        self.rb.ucsra.get() & UCSRA_UDRE != 0
    }

    fn is_transmit_complete(&self) -> bool {
        !self.sent || self.rb.ucsra.get() & UCSRA_TXC != 0
    }

    fn is_receive_complete(&self) -> bool {
        self.rb.ucsra.get() & UCSRA_RXC != 0
    }

    fn write_data(&mut self, byte: u8) {
        // TXC is cleared by writing a one; U2X has to be kept.
        let u2x = self.rb.ucsra.get() & UCSRA_U2X;
        self.rb.ucsra.set(u2x | UCSRA_TXC);
        self.rb.udr.set(byte);
        self.sent = true;
    }

    fn read_frame(&mut self) -> RawFrame {
        let ucsra = self.rb.ucsra.get();
        let data = self.rb.udr.get();

        let mut status = ErrorFlags::empty();
        if ucsra & UCSRA_FE != 0 {
            status |= ErrorFlags::FRAME;
        }
        if ucsra & UCSRA_UPE != 0 {
            status |= ErrorFlags::PARITY;
        }
        if ucsra & UCSRA_DOR != 0 {
            status |= ErrorFlags::OVERRUN;
        }
        RawFrame { data, status }
    }
}
