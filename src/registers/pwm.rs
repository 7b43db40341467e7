//! PWM output registers
//!
//! This module contains the registers that shape the PWM outputs:
//! - Per-channel on/off windows (LEDn_ON_L .. LEDn_OFF_H, 4 bytes per channel)
//! - The ALL_LED block, which loads every channel's window at once
//! - The prescaler that divides the oscillator down to the PWM cycle rate
//!
//! Each PWM cycle is 4096 counter steps long. A channel's output goes high
//! when the counter reaches its on tick and low when it reaches its off tick.
//! Bit 12 of either tick is the chip's "full on"/"full off" flag.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

use super::LED0_ON_L;

/// Number of PWM channels on the chip
pub const CHANNEL_COUNT: u8 = 16;

/// Bit in the high tick byte that forces the output fully on (ON_H) or off (OFF_H)
pub const FULL_TICK: u16 = 1 << 12;

/// Error type for channel index conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidChannel(pub u8);

/// One of the 16 PWM output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Output LED0
    C0 = 0,
    /// Output LED1
    C1 = 1,
    /// Output LED2
    C2 = 2,
    /// Output LED3
    C3 = 3,
    /// Output LED4
    C4 = 4,
    /// Output LED5
    C5 = 5,
    /// Output LED6
    C6 = 6,
    /// Output LED7
    C7 = 7,
    /// Output LED8
    C8 = 8,
    /// Output LED9
    C9 = 9,
    /// Output LED10
    C10 = 10,
    /// Output LED11
    C11 = 11,
    /// Output LED12
    C12 = 12,
    /// Output LED13
    C13 = 13,
    /// Output LED14
    C14 = 14,
    /// Output LED15
    C15 = 15,
}

impl Channel {
    /// All channels in register order
    pub const ALL: [Channel; CHANNEL_COUNT as usize] = [
        Self::C0,
        Self::C1,
        Self::C2,
        Self::C3,
        Self::C4,
        Self::C5,
        Self::C6,
        Self::C7,
        Self::C8,
        Self::C9,
        Self::C10,
        Self::C11,
        Self::C12,
        Self::C13,
        Self::C14,
        Self::C15,
    ];

    /// Channel index, 0..=15
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Address of this channel's LEDn_ON_L register, the first of its 4-byte block
    pub fn register(self) -> u8 {
        LED0_ON_L + 4 * self.index()
    }
}

impl TryFrom<u8> for Channel {
    type Error = InvalidChannel;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(InvalidChannel(value))
    }
}

impl From<Channel> for u8 {
    fn from(channel: Channel) -> Self {
        channel.index()
    }
}

/// On/off window of a PWM output
///
/// Serialized as 4 bytes in register order: ON_L, ON_H, OFF_L, OFF_H.
/// Ticks are written as given; nothing is masked to 12 bits, so callers can
/// set [`FULL_TICK`] directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmWindow {
    /// Counter position where the output turns on, 0..=4095
    pub on: u16,
    /// Counter position where the output turns off, 0..=4095
    pub off: u16,
}

impl PwmWindow {
    /// Window with the given on and off ticks, passed through unmodified.
    ///
    /// Bit 12 of either value is the full-on/full-off flag.
    pub fn new(on: u16, off: u16) -> Self {
        Self { on, off }
    }

    /// Output permanently high, ignoring the off tick
    pub fn full_on() -> Self {
        Self {
            on: FULL_TICK,
            off: 0,
        }
    }

    /// Output permanently low. Takes precedence over full on.
    pub fn full_off() -> Self {
        Self {
            on: 0,
            off: FULL_TICK,
        }
    }
}

impl FromByteArray for PwmWindow {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            on: u16::from_le_bytes([bytes[0], bytes[1]]),
            off: u16::from_le_bytes([bytes[2], bytes[3]]),
        })
    }
}

impl ToByteArray for PwmWindow {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        let [on_l, on_h] = self.on.to_le_bytes();
        let [off_l, off_h] = self.off.to_le_bytes();
        Ok([on_l, on_h, off_l, off_h])
    }
}

/// ALL_LED on/off block (address: 0xFA)
///
/// Writing this block loads the same window into every channel.
///
/// # Important Notes
/// - Write-only; reads return zero
/// - Requires MODE1.AI for the 4-byte burst to land in ON_L..OFF_H
#[register(0xFAu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, WritableRegister, Default)]
pub struct AllLedOutputs {
    /// Window loaded into every channel
    pub window: PwmWindow,
}

impl ToByteArray for AllLedOutputs {
    type Error = Infallible;
    type Array = [u8; 4];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        self.window.to_bytes()
    }
}

/// PWM frequency prescaler (address: 0xFE)
///
/// `prescale = round(osc / (4096 × f_pwm)) − 1`, see [`crate::frequency`].
///
/// # Important Notes
/// - Only writable while MODE1.SLEEP is set
/// - The chip forces values below 3 up to 3
/// - Power-on value is 0x1E (200 Hz with the internal oscillator)
#[register(0xFEu8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct Prescale {
    /// Raw prescaler value, 3..=255
    pub value: u8,
}

impl Default for Prescale {
    fn default() -> Self {
        Self { value: 0x1E }
    }
}

impl FromByteArray for Prescale {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { value: bytes[0] })
    }
}

impl ToByteArray for Prescale {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.value])
    }
}
