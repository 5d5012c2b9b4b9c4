//! Frame format types

/// Data bits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    /// 5 bits
    Five,
    /// 6 bits
    Six,
    /// 7 bits
    Seven,
    /// 8 bits
    Eight,
}

impl DataBits {
    /// Number of data bits carried by one frame.
    pub const fn count(self) -> u8 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }

    /// Mask selecting the bits of a byte that actually go on the wire.
    pub const fn mask(self) -> u8 {
        0xFF >> (8 - self.count())
    }
}

/// Stop bits
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// 1 bit
    One,
    /// 2 bits
    Two,
}

/// Parity
///
/// The "none" state of parity is represented with the Option type (None).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// Odd parity
    Odd,
    /// Even parity
    Even,
}

/// Shape of a single frame on the wire: start bit, data bits, optional
/// parity bit and stop bit(s).
///
/// The `Default` implementation is 8N1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameFormat {
    /// The amount of data bits per frame.
    pub data_bits: DataBits,

    /// The parity bit, if any.
    pub parity: Option<Parity>,

    /// The amount of stop bits per frame.
    pub stop_bits: StopBits,
}

impl FrameFormat {
    /// Create a new frame format
    pub const fn new(data_bits: DataBits, parity: Option<Parity>, stop_bits: StopBits) -> Self {
        FrameFormat {
            data_bits,
            parity,
            stop_bits,
        }
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::new(DataBits::Eight, None, StopBits::One)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks() {
        assert_eq!(DataBits::Five.mask(), 0x1F);
        assert_eq!(DataBits::Seven.mask(), 0x7F);
        assert_eq!(DataBits::Eight.mask(), 0xFF);
    }
}
