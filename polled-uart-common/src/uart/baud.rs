//! Baud rate divisor arithmetic
//!
//! Classic AVR style USARTs divide the peripheral clock by `16 * (UBRR + 1)`,
//! or by `8 * (UBRR + 1)` when the double speed bit is set. The resolution
//! below follows the `setbaud` procedure: use normal speed when it lands
//! within tolerance, otherwise fall back to double speed.

use fugit::HertzU32;

/// Largest value the 12 bit UBRR register can hold.
pub const MAX_UBRR: u16 = 0x0FFF;

/// Default acceptable baud rate error, in per-mille (2 %).
pub const DEFAULT_TOLERANCE_PERMILLE: u32 = 20;

/// A resolved baud rate divisor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Divisor {
    /// Value for the UBRR register pair.
    pub ubrr: u16,
    /// Whether the double speed (U2X) mode has to be enabled.
    pub double_speed: bool,
}

/// Reasons why no divisor can be produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BaudError {
    /// Baud rate or clock frequency is zero.
    Zero,
    /// The requested rate is too fast or too slow for the clock.
    OutOfRange,
}

impl Divisor {
    const fn samples(&self) -> u64 {
        if self.double_speed {
            8
        } else {
            16
        }
    }

    /// The baud rate this divisor actually produces at `clock`.
    pub const fn baudrate(&self, clock: HertzU32) -> HertzU32 {
        let rate = clock.raw() as u64 / (self.samples() * (self.ubrr as u64 + 1));
        HertzU32::from_raw(rate as u32)
    }

    /// Deviation from `wanted`, in per-mille.
    pub const fn error_permille(&self, clock: HertzU32, wanted: HertzU32) -> u32 {
        error_permille(self.baudrate(clock).raw(), wanted.raw())
    }
}

const fn error_permille(actual: u32, wanted: u32) -> u32 {
    if wanted == 0 {
        return u32::MAX;
    }
    let diff = if actual > wanted {
        actual - wanted
    } else {
        wanted - actual
    };
    ((diff as u64 * 1000) / wanted as u64) as u32
}

const fn candidate(clock: u64, wanted: u64, double_speed: bool) -> Option<Divisor> {
    let samples = if double_speed { 8 } else { 16 };
    // Rounded `clock / (samples * wanted)`.
    let quotient = (clock + samples * wanted / 2) / (samples * wanted);
    if quotient == 0 || quotient - 1 > MAX_UBRR as u64 {
        return None;
    }
    Some(Divisor {
        ubrr: (quotient - 1) as u16,
        double_speed,
    })
}

/// Compute the divisor for `wanted` baud at the given peripheral `clock`.
///
/// Normal speed is preferred whenever its error is within
/// `tolerance_permille`; otherwise the candidate with the smaller error wins.
/// Out of tolerance results are still returned, callers decide what to make
/// of [`Divisor::error_permille`].
pub const fn calculate_divisor(
    clock: HertzU32,
    wanted: HertzU32,
    tolerance_permille: u32,
) -> Result<Divisor, BaudError> {
    if clock.raw() == 0 || wanted.raw() == 0 {
        return Err(BaudError::Zero);
    }
    let (f, b) = (clock.raw() as u64, wanted.raw() as u64);

    match (candidate(f, b, false), candidate(f, b, true)) {
        (Some(normal), Some(double)) => {
            let normal_err = normal.error_permille(clock, wanted);
            if normal_err <= tolerance_permille
                || normal_err <= double.error_permille(clock, wanted)
            {
                Ok(normal)
            } else {
                Ok(double)
            }
        }
        (Some(normal), None) => Ok(normal),
        (None, Some(double)) => Ok(double),
        (None, None) => Err(BaudError::OutOfRange),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MHZ_12: HertzU32 = HertzU32::from_raw(12_000_000);

    #[test]
    fn datasheet_9600_at_16mhz() {
        let div = calculate_divisor(
            HertzU32::from_raw(16_000_000),
            HertzU32::from_raw(9600),
            DEFAULT_TOLERANCE_PERMILLE,
        )
        .unwrap();
        assert_eq!(
            div,
            Divisor {
                ubrr: 103,
                double_speed: false
            }
        );
    }

    #[test]
    fn default_clock_9600() {
        let wanted = HertzU32::from_raw(9600);
        let div = calculate_divisor(MHZ_12, wanted, DEFAULT_TOLERANCE_PERMILLE).unwrap();
        assert_eq!(div.ubrr, 77);
        assert!(!div.double_speed);
        assert_eq!(div.baudrate(MHZ_12).raw(), 9615);
        assert_eq!(div.error_permille(MHZ_12, wanted), 1);
    }

    #[test]
    fn falls_back_to_double_speed() {
        // 115200 at 12MHz is ~7% off at normal speed.
        let wanted = HertzU32::from_raw(115_200);
        let div = calculate_divisor(MHZ_12, wanted, DEFAULT_TOLERANCE_PERMILLE).unwrap();
        assert_eq!(
            div,
            Divisor {
                ubrr: 12,
                double_speed: true
            }
        );
        assert!(div.error_permille(MHZ_12, wanted) <= DEFAULT_TOLERANCE_PERMILLE);
    }

    #[test]
    fn too_slow_for_register() {
        assert_eq!(
            calculate_divisor(MHZ_12, HertzU32::from_raw(50), DEFAULT_TOLERANCE_PERMILLE),
            Err(BaudError::OutOfRange)
        );
    }

    #[test]
    fn too_fast_for_clock() {
        assert_eq!(
            calculate_divisor(
                MHZ_12,
                HertzU32::from_raw(20_000_000),
                DEFAULT_TOLERANCE_PERMILLE
            ),
            Err(BaudError::OutOfRange)
        );
    }

    #[test]
    fn zero_rate() {
        assert_eq!(
            calculate_divisor(MHZ_12, HertzU32::from_raw(0), DEFAULT_TOLERANCE_PERMILLE),
            Err(BaudError::Zero)
        );
    }
}
