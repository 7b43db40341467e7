//! Alternate bus address registers
//!
//! Besides its pin-strapped address the chip can answer to four extra
//! addresses, used to drive several chips with a single write:
//! - SUBADR1..3: three programmable group addresses
//! - ALLCALLADR: the LED All Call address shared by every chip on the bus
//!
//! Each register holds the 7-bit address in bits 7:1; bit 0 is unused.
//! The chip only answers on an address when the matching MODE1 bit
//! (SUB1..SUB3, ALLCALL) is set.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

fn decode(byte: u8) -> u8 {
    byte >> 1
}

fn encode(address: u8) -> u8 {
    (address & 0x7F) << 1
}

/// Bus subaddress 1 (address: 0x02)
///
/// Power-on address is 0x71.
#[register(0x02u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SubAddress1 {
    /// 7-bit bus address
    pub address: u8,
}

/// Bus subaddress 2 (address: 0x03)
///
/// Power-on address is 0x72.
#[register(0x03u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SubAddress2 {
    /// 7-bit bus address
    pub address: u8,
}

/// Bus subaddress 3 (address: 0x04)
///
/// Power-on address is 0x73.
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct SubAddress3 {
    /// 7-bit bus address
    pub address: u8,
}

/// LED All Call bus address (address: 0x05)
///
/// Power-on address is 0x70.
#[register(0x05u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ReadableRegister, WritableRegister)]
pub struct AllCallAddress {
    /// 7-bit bus address
    pub address: u8,
}

impl FromByteArray for SubAddress1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            address: decode(bytes[0]),
        })
    }
}

impl ToByteArray for SubAddress1 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([encode(self.address)])
    }
}

impl FromByteArray for SubAddress2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            address: decode(bytes[0]),
        })
    }
}

impl ToByteArray for SubAddress2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([encode(self.address)])
    }
}

impl FromByteArray for SubAddress3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            address: decode(bytes[0]),
        })
    }
}

impl ToByteArray for SubAddress3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([encode(self.address)])
    }
}

impl FromByteArray for AllCallAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            address: decode(bytes[0]),
        })
    }
}

impl ToByteArray for AllCallAddress {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([encode(self.address)])
    }
}
