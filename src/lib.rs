#![no_std]
//! PCA9685 PWM Controller Driver
//!
//! This crate provides a type-safe interface for the NXP PCA9685, a 16-channel,
//! 12-bit PWM controller on the I2C bus. It is commonly used for LED dimming
//! and hobby servo control.
//!
//! # Features
//! - 16 independent outputs, each with its own on/off tick in a 4096-step cycle
//! - PWM frequency from 24 Hz to 1526 Hz on the 25 MHz internal oscillator,
//!   or derived from an external clock of up to 50 MHz on EXTCLK
//! - Totem pole or open-drain outputs
//! - One primary bus address plus four alternate addresses
//!   (LED All Call and three subaddresses) for group writes
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`driver`]: High level interface, [`Pca9685`]
//!   - Start-up, sleep/wake and restart sequencing
//!   - PWM frequency programming and read-back
//!   - Per-channel and all-channel output control
//!
//! - [`device`]: Register level bus access
//!   - Typed and raw register reads and writes over I2C
//!   - Blocking and async variants
//!
//! - [`registers`]: Register definitions for direct hardware access
//!
//! - [`frequency`]: Oscillator, prescaler and PWM frequency arithmetic
//!
//! - [`address`]: Bus address selection and configuration
//!
//! # Usage
//! The driver uses the `regiface` crate to provide a type-safe interface for
//! register access. The main entry point is the [`Pca9685`] struct which wraps
//! an I2C bus and a delay provider.
//!
//! Start-up follows a fixed sequence:
//!
//! 1. Create a new [`Pca9685`] instance with your I2C bus and delay
//! 2. Call [`Pca9685::begin`] to restart the chip and set the PWM frequency
//! 3. Optionally select the output structure with [`Pca9685::set_output_type`]
//! 4. Drive outputs with [`Pca9685::set_pwm_output`]
//!
//! # Important Notes
//! - The prescaler can only be written while the chip sleeps; the driver
//!   handles the sleep/restart sequence
//! - The oscillator frequency is never measured. Keep it in sync with the
//!   actual clock via [`Pca9685::set_oscillator_frequency`]
//! - Out-of-range frequencies are clamped, not rejected
//! - Alternate addresses only work once enabled in MODE1
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use pca9685::{AddressType, Channel, Error, OutputType, Pca9685};
//!
//! fn configure<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Result<Pca9685<I2C, D>, Error> {
//!     let mut pwm = Pca9685::new(i2c, delay);
//!
//!     // Servo frame rate
//!     pwm.begin(50.0)?;
//!     pwm.set_output_type(OutputType::TotemPole, AddressType::Normal)?;
//!
//!     // 1.5 ms pulse at 50 Hz
//!     pwm.set_pwm_output(Channel::C0, 0, 307, AddressType::Normal)?;
//!
//!     Ok(pwm)
//! }
//! ```

#[cfg(test)]
#[macro_use]
extern crate std;

pub use regiface::errors::Error;

pub mod address;
pub mod device;
pub mod driver;
pub mod frequency;
pub mod registers;

pub use address::*;
pub use driver::Pca9685;
pub use registers::*;
