use super::Settings;
use fugit::HertzU32;

/// 9600 baud, 8 data bits, no parity, 1 stop bit
pub const _9600_8_N_1: Settings = Settings::new(HertzU32::from_raw(9600));

/// 19200 baud, 8 data bits, no parity, 1 stop bit
pub const _19200_8_N_1: Settings = Settings::new(HertzU32::from_raw(19200));

/// 38400 baud, 8 data bits, no parity, 1 stop bit
pub const _38400_8_N_1: Settings = Settings::new(HertzU32::from_raw(38400));

/// 57600 baud, 8 data bits, no parity, 1 stop bit
pub const _57600_8_N_1: Settings = Settings::new(HertzU32::from_raw(57600));

/// 115200 baud, 8 data bits, no parity, 1 stop bit
pub const _115200_8_N_1: Settings = Settings::new(HertzU32::from_raw(115200));
