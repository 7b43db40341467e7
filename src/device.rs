//! PCA9685 Bus Interface
//!
//! This module provides the register-level interface to a PCA9685 over I2C.
//! It supports both synchronous and asynchronous operations.
//!
//! The interface is built around the `Device<I2C>` struct which wraps an I2C bus and
//! provides methods for:
//! - Reading and writing typed registers
//! - Reading and writing raw register bytes
//!
//! Unlike most register interfaces, every call takes the 7-bit bus address it
//! targets. The same chip answers on its primary address and on its alternate
//! (All Call and subaddress) addresses, so the address is chosen per transfer
//! rather than fixed at construction.
//!
//! Writes are sent as one bus transfer: the register pointer followed by the
//! data bytes. Reads set the register pointer and read back with a repeated start.
//!
//! # Example
//! ```no_run
//! use pca9685::{device::Device, Mode1};
//!
//! # fn example<I2C: embedded_hal::i2c::I2c>(i2c: I2C) -> Result<(), pca9685::Error> {
//! let mut device = Device::new(i2c);
//!
//! // Read a register
//! let mode1: Mode1 = device.read_register(0x40)?;
//!
//! // Write raw bytes starting at LED0_ON_L
//! device.write_bytes(0x40, 0x06, &[0x00, 0x00, 0xFF, 0x07])?;
//! # Ok(())
//! # }
//! ```

use core::convert::Infallible;

use regiface::{errors::Error as RegifaceError, ByteArray, ReadableRegister, WritableRegister};

/// Widest register block written in one transfer (one channel's on/off window)
pub const MAX_WRITE_LEN: usize = 4;

/// Register pointer plus payload
type Frame = [u8; MAX_WRITE_LEN + 1];

fn frame(register: u8, bytes: &[u8]) -> Result<(Frame, usize), RegifaceError> {
    if bytes.len() > MAX_WRITE_LEN {
        return Err(RegifaceError::SerializationError);
    }

    let mut frame = [0u8; MAX_WRITE_LEN + 1];
    frame[0] = register;
    frame[1..=bytes.len()].copy_from_slice(bytes);

    Ok((frame, bytes.len() + 1))
}

/// Main bus interface for the PCA9685.
///
/// This struct wraps an I2C bus and provides methods to access the chip's registers.
/// It supports both synchronous operations through the embedded-hal traits and
/// asynchronous operations through embedded-hal-async.
pub struct Device<I2C> {
    i2c: I2C,
}

impl<I2C> Device<I2C> {
    /// Creates a new Device instance wrapping the provided I2C bus.
    ///
    /// # Arguments
    /// * `i2c` - An I2C bus implementing the required embedded-hal traits
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Releases the underlying I2C bus.
    ///
    /// This method consumes the Device instance and returns the wrapped bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Reads a register value from the chip at `address`.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing ReadableRegister with u8 ID
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - I2C communication failed
    /// * `RegifaceError::DeserializationError` - Failed to parse register value
    pub fn read_register<R>(&mut self, address: u8) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.i2c
            .write_read(address, &[R::id()], raw_value.as_mut())
            .map_err(|_| RegifaceError::BusError)?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Writes a value to a register of the chip at `address`.
    ///
    /// # Type Parameters
    /// * `R` - Register type implementing WritableRegister with u8 ID
    ///
    /// # Arguments
    /// * `address` - 7-bit bus address to write to
    /// * `register` - The register value to write
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - I2C communication failed
    pub fn write_register<R>(&mut self, address: u8, register: R) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = register.to_bytes().unwrap_or_else(|never| match never {});

        self.write_bytes(address, R::id(), raw_value.as_ref())
    }

    /// Reads consecutive bytes starting at `register`.
    ///
    /// Reading more than one byte only walks the register map when MODE1.AI is set.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - I2C communication failed
    pub fn read_bytes(
        &mut self,
        address: u8,
        register: u8,
        bytes: &mut [u8],
    ) -> Result<(), RegifaceError> {
        self.i2c
            .write_read(address, &[register], bytes)
            .map_err(|_| RegifaceError::BusError)
    }

    /// Writes up to [`MAX_WRITE_LEN`] bytes starting at `register`.
    ///
    /// # Errors
    /// * `RegifaceError::BusError` - I2C communication failed
    /// * `RegifaceError::SerializationError` - More than [`MAX_WRITE_LEN`] bytes were given
    pub fn write_bytes(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), RegifaceError> {
        let (frame, len) = frame(register, bytes)?;

        self.i2c
            .write(address, &frame[..len])
            .map_err(|_| RegifaceError::BusError)
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously reads a register value from the chip.
    ///
    /// This is the async version of [`read_register`](Device::read_register).
    pub async fn read_register_async<R>(&mut self, address: u8) -> Result<R, RegifaceError>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();

        self.i2c
            .write_read(address, &[R::id()], raw_value.as_mut())
            .await
            .map_err(|_| RegifaceError::BusError)?;

        R::from_bytes(raw_value).map_err(|_| RegifaceError::DeserializationError)
    }

    /// Asynchronously writes a value to a register of the chip.
    ///
    /// This is the async version of [`write_register`](Device::write_register).
    pub async fn write_register_async<R>(
        &mut self,
        address: u8,
        register: R,
    ) -> Result<(), RegifaceError>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = register.to_bytes().unwrap_or_else(|never| match never {});

        self.write_bytes_async(address, R::id(), raw_value.as_ref())
            .await
    }

    /// Asynchronously reads consecutive bytes starting at `register`.
    ///
    /// This is the async version of [`read_bytes`](Device::read_bytes).
    pub async fn read_bytes_async(
        &mut self,
        address: u8,
        register: u8,
        bytes: &mut [u8],
    ) -> Result<(), RegifaceError> {
        self.i2c
            .write_read(address, &[register], bytes)
            .await
            .map_err(|_| RegifaceError::BusError)
    }

    /// Asynchronously writes up to [`MAX_WRITE_LEN`] bytes starting at `register`.
    ///
    /// This is the async version of [`write_bytes`](Device::write_bytes).
    pub async fn write_bytes_async(
        &mut self,
        address: u8,
        register: u8,
        bytes: &[u8],
    ) -> Result<(), RegifaceError> {
        let (frame, len) = frame(register, bytes)?;

        self.i2c
            .write(address, &frame[..len])
            .await
            .map_err(|_| RegifaceError::BusError)
    }
}
