//! Register definitions for the PCA9685
//! Taken from the PCA9685 product data sheet
//!
//! The address constants cover the whole map, including registers that have
//! no typed counterpart (per-channel LED blocks are addressed through
//! [`Channel::register`], TESTMODE is only reachable through raw access).

mod address;
mod mode;
mod pwm;

pub use address::*;
pub use mode::*;
pub use pwm::*;

/// Mode register 1
pub const MODE1: u8 = 0x00;
/// Mode register 2
pub const MODE2: u8 = 0x01;
/// Bus subaddress 1
pub const SUBADR1: u8 = 0x02;
/// Bus subaddress 2
pub const SUBADR2: u8 = 0x03;
/// Bus subaddress 3
pub const SUBADR3: u8 = 0x04;
/// LED All Call bus address
pub const ALLCALLADR: u8 = 0x05;
/// LED0 on tick, low byte. Channel n starts at `LED0_ON_L + 4 * n`.
pub const LED0_ON_L: u8 = 0x06;
/// All LEDs on tick, low byte
pub const ALL_LED_ON_L: u8 = 0xFA;
/// Prescaler for the PWM output frequency
pub const PRESCALE: u8 = 0xFE;
/// Test mode selector. Do not write outside of factory test.
pub const TESTMODE: u8 = 0xFF;
