//! Mode registers
//!
//! This module contains the two mode registers that control the chip's
//! global behaviour:
//! - MODE1: oscillator sleep, restart, external clock, auto-increment and
//!   which alternate bus addresses the chip answers to
//! - MODE2: output driver structure, output change timing, inversion and
//!   the output state while OE is high
//!
//! Both registers are read and written as plain bytes. Every bit is kept as
//! read, so a read-modify-write never disturbs bits the caller did not ask
//! to change.

use bitflags::bitflags;
use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

bitflags! {
    /// MODE1 register bits
    ///
    /// Power-on value is `SLEEP | ALLCALL` (0x11).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mode1Flags: u8 {
        /// Respond to the LED All Call bus address (default set)
        const ALLCALL = 1 << 0;
        /// Respond to bus subaddress 3
        const SUB3 = 1 << 1;
        /// Respond to bus subaddress 2
        const SUB2 = 1 << 2;
        /// Respond to bus subaddress 1
        const SUB1 = 1 << 3;
        /// Low power mode, oscillator off (default set)
        ///
        /// The prescaler can only be written while this bit is set.
        const SLEEP = 1 << 4;
        /// Register auto-increment after every byte
        const AI = 1 << 5;
        /// Use the EXTCLK pin as clock source
        ///
        /// Sticky: only a power cycle or software reset clears it.
        /// Can only be set while SLEEP is set.
        const EXTCLK = 1 << 6;
        /// Restart enabled
        ///
        /// Reads as set when PWM channels were halted by entering sleep.
        /// Writing a one clears it and resumes the channels.
        const RESTART = 1 << 7;
    }
}

bitflags! {
    /// MODE2 register bits
    ///
    /// Power-on value is `OUTDRV` (0x04).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mode2Flags: u8 {
        /// Output state when OE is high, low bit
        const OUTNE_L = 1 << 0;
        /// Output state when OE is high, high bit (high impedance)
        const OUTNE_H = 1 << 1;
        /// Totem pole outputs when set, open-drain when clear
        const OUTDRV = 1 << 2;
        /// Outputs change on ACK when set, on STOP when clear
        const OCH = 1 << 3;
        /// Invert output logic state
        const INVRT = 1 << 4;
    }
}

/// Output driver structure, selected by MODE2.OUTDRV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    /// Outputs are open-drain (OUTDRV clear)
    OpenDrain,
    /// Outputs are totem pole (OUTDRV set, power-on default)
    TotemPole,
}

impl OutputType {
    /// Applies this output type to a MODE2 value, leaving every other bit untouched.
    pub fn apply(self, mode: Mode2Flags) -> Mode2Flags {
        match self {
            Self::TotemPole => mode | Mode2Flags::OUTDRV,
            Self::OpenDrain => mode.difference(Mode2Flags::OUTDRV),
        }
    }
}

impl From<Mode2Flags> for OutputType {
    fn from(mode: Mode2Flags) -> Self {
        if mode.contains(Mode2Flags::OUTDRV) {
            Self::TotemPole
        } else {
            Self::OpenDrain
        }
    }
}

/// Mode register 1 (address: 0x00)
///
/// # Important Notes
/// - EXTCLK may only be set while SLEEP is already set
/// - After clearing SLEEP the oscillator needs 500μs before RESTART is written
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Mode1 {
    /// Raw MODE1 bits
    pub flags: Mode1Flags,
}

impl Default for Mode1 {
    fn default() -> Self {
        Self {
            flags: Mode1Flags::SLEEP | Mode1Flags::ALLCALL,
        }
    }
}

/// Mode register 2 (address: 0x01)
#[register(0x01u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Mode2 {
    /// Raw MODE2 bits
    pub flags: Mode2Flags,
}

impl Default for Mode2 {
    fn default() -> Self {
        Self {
            flags: Mode2Flags::OUTDRV,
        }
    }
}

impl FromByteArray for Mode1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Mode1Flags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for Mode1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

impl FromByteArray for Mode2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Mode2Flags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for Mode2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}
