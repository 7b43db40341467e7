//! PCA9685 Driver
//!
//! This module maps the chip's features onto register sequences:
//! - Start-up, restart, sleep and wake
//! - PWM frequency selection, on the internal oscillator or an external clock
//! - Output driver structure (totem pole or open-drain)
//! - Per-channel and all-channel on/off windows
//! - Alternate bus address programming
//!
//! The chip's registers are the only source of truth. Every read-modify-write
//! re-reads the register first; nothing is shadowed in the driver, so raw
//! writes or a second driver on the same chip never leave stale state behind.
//!
//! Reads always go to the primary address. Writes go to whichever address the
//! [`AddressType`] argument selects, so a group of chips sharing a subaddress
//! can be reconfigured together while the read side is taken from this chip.
//!
//! # Example
//! ```no_run
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//! use pca9685::{AddressType, Channel, Error, Pca9685};
//!
//! fn dim_led<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Result<(), Error> {
//!     let mut pwm = Pca9685::new(i2c, delay);
//!
//!     // Restart the chip and run the outputs at ~50 Hz
//!     let _actual_hz = pwm.begin(50.0)?;
//!
//!     // 25% duty cycle on channel 0
//!     pwm.set_pwm_output(Channel::C0, 0, 1024, AddressType::Normal)?;
//!     Ok(())
//! }
//! ```

use regiface::{FromByteArray, ToByteArray};

use crate::{
    address::{AddressConfig, AddressType, AlternateAddress},
    device::Device,
    frequency::{prescale_for, pwm_frequency_for, INTERNAL_OSCILLATOR_HZ},
    registers::{
        AllCallAddress, AllLedOutputs, Channel, Mode1, Mode1Flags, Mode2, Mode2Flags, OutputType,
        Prescale, PwmWindow, SubAddress1, SubAddress2, SubAddress3,
    },
    Error,
};

/// Oscillator settling time after a restart (ms)
const RESTART_DELAY_MS: u32 = 10;

/// Oscillator settling time after leaving sleep, 500μs on the datasheet (ms)
const WAKE_DELAY_MS: u32 = 5;

fn window_bytes(window: PwmWindow) -> [u8; 4] {
    window.to_bytes().unwrap_or_else(|never| match never {})
}

/// PCA9685 16-channel PWM controller.
///
/// Owns the bus and a delay provider for as long as it lives; use
/// [`release`](Pca9685::release) to get them back.
pub struct Pca9685<I2C, D> {
    device: Device<I2C>,
    delay: D,
    addresses: AddressConfig,
    oscillator_hz: u32,
}

impl<I2C, D> Pca9685<I2C, D> {
    /// Creates a driver for a chip on the default address (0x40).
    ///
    /// Does not touch the bus. Call [`begin`](Pca9685::begin) to initialize the chip.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_addresses(i2c, delay, AddressConfig::default())
    }

    /// Creates a driver for a chip on `address`, with default alternate addresses.
    pub fn new_with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self::with_addresses(i2c, delay, AddressConfig::new(address))
    }

    /// Creates a driver with a full address configuration.
    pub fn with_addresses(i2c: I2C, delay: D, addresses: AddressConfig) -> Self {
        Self {
            device: Device::new(i2c),
            delay,
            addresses,
            oscillator_hz: INTERNAL_OSCILLATOR_HZ,
        }
    }

    /// Releases the bus and delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.device.release(), self.delay)
    }

    /// Bus address an operation with `address_type` is sent to.
    pub fn address(&self, address_type: AddressType) -> u8 {
        self.addresses.resolve(address_type)
    }

    /// All five addresses this driver routes to.
    pub fn addresses(&self) -> AddressConfig {
        self.addresses
    }

    /// Reference frequency used by all frequency calculations (Hz).
    ///
    /// This is a nominal value, never measured from the chip.
    pub fn oscillator_frequency(&self) -> u32 {
        self.oscillator_hz
    }

    /// Sets the reference frequency used by later frequency calculations.
    ///
    /// Does not touch the chip. Set this to the measured oscillator frequency for
    /// more accurate output, or to the EXTCLK frequency when an external clock is
    /// already running.
    pub fn set_oscillator_frequency(&mut self, frequency_hz: u32) {
        self.oscillator_hz = frequency_hz;
    }
}

impl<I2C, D> Pca9685<I2C, D>
where
    I2C: embedded_hal::i2c::I2c,
    D: embedded_hal::delay::DelayNs,
{
    /// Initializes the chip.
    ///
    /// Restarts the chip, resets the reference to the internal oscillator and
    /// programs `frequency_hz` (see [`DEFAULT_PWM_FREQUENCY_HZ`](crate::frequency::DEFAULT_PWM_FREQUENCY_HZ)
    /// for the customary default).
    ///
    /// # Returns
    /// The PWM frequency actually programmed
    ///
    /// # Errors
    /// * `Error::BusError` - I2C communication failed
    pub fn begin(&mut self, frequency_hz: f32) -> Result<f32, Error> {
        self.restart(AddressType::Normal)?;

        self.set_oscillator_frequency(INTERNAL_OSCILLATOR_HZ);
        self.set_pwm_frequency(frequency_hz, AddressType::Normal)
    }

    /// Writes the restart bit to MODE1 and waits for the oscillator to settle.
    ///
    /// All other MODE1 bits are cleared, which also wakes the chip.
    pub fn restart(&mut self, address_type: AddressType) -> Result<(), Error> {
        self.set_mode1(Mode1Flags::RESTART, address_type)?;
        self.delay.delay_ms(RESTART_DELAY_MS);
        Ok(())
    }

    /// Puts the chip to sleep, preserving every other MODE1 bit.
    ///
    /// Outputs stop while sleeping; the oscillator is off.
    pub fn sleep(&mut self, address_type: AddressType) -> Result<(), Error> {
        let mode = self.read_mode1()?;
        self.set_mode1(mode | Mode1Flags::SLEEP, address_type)
    }

    /// Clears the sleep bit, preserving every other MODE1 bit.
    ///
    /// Channels halted by sleeping stay halted until a [`restart`](Pca9685::restart).
    pub fn wake_up(&mut self, address_type: AddressType) -> Result<(), Error> {
        let mode = self.read_mode1()?;
        self.set_mode1(mode & !Mode1Flags::SLEEP, address_type)
    }

    /// Reads MODE1 from the primary address.
    pub fn read_mode1(&mut self) -> Result<Mode1Flags, Error> {
        let mode1: Mode1 = self.device.read_register(self.addresses.primary)?;
        Ok(mode1.flags)
    }

    /// Reads MODE2 from the primary address.
    pub fn read_mode2(&mut self) -> Result<Mode2Flags, Error> {
        let mode2: Mode2 = self.device.read_register(self.addresses.primary)?;
        Ok(mode2.flags)
    }

    /// Overwrites MODE1.
    ///
    /// No read-modify-write is done; every bit is replaced by `flags`.
    pub fn set_mode1(&mut self, flags: Mode1Flags, address_type: AddressType) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("MODE1 <- {=u8:#x}", flags.bits());

        self.device
            .write_register(self.addresses.resolve(address_type), Mode1 { flags })
    }

    /// Overwrites MODE2.
    ///
    /// No read-modify-write is done; every bit is replaced by `flags`.
    pub fn set_mode2(&mut self, flags: Mode2Flags, address_type: AddressType) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::debug!("MODE2 <- {=u8:#x}", flags.bits());

        self.device
            .write_register(self.addresses.resolve(address_type), Mode2 { flags })
    }

    /// Reads any register from the primary address.
    pub fn read_register(&mut self, register: u8) -> Result<u8, Error> {
        let mut value = [0u8; 1];
        self.device
            .read_bytes(self.addresses.primary, register, &mut value)?;
        Ok(value[0])
    }

    /// Writes any register. `register` is not checked against the register map.
    pub fn write_register(
        &mut self,
        register: u8,
        data: u8,
        address_type: AddressType,
    ) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("reg {=u8:#x} <- {=u8:#x}", register, data);

        self.device
            .write_bytes(self.addresses.resolve(address_type), register, &[data])
    }

    /// Switches the chip to an external clock on the EXTCLK pin and programs
    /// `pwm_frequency_hz` against it.
    ///
    /// The chip is put to sleep, EXTCLK is set, the prescaler is written and
    /// the chip is woken with restart and auto-increment enabled. The cached
    /// oscillator frequency becomes `clock_hz`.
    ///
    /// # Important Notes
    /// - EXTCLK is sticky: only a power cycle or software reset returns the chip
    ///   to its internal oscillator
    /// - `pwm_frequency_hz` is clamped like in [`set_pwm_frequency`](Pca9685::set_pwm_frequency);
    ///   use [`get_pwm_frequency`](Pca9685::get_pwm_frequency) for the frequency
    ///   actually reached
    pub fn set_ext_clock(
        &mut self,
        clock_hz: u32,
        pwm_frequency_hz: f32,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let mode = (self.read_mode1()? & !Mode1Flags::RESTART) | Mode1Flags::SLEEP;
        self.set_mode1(mode, address_type)?;

        // EXTCLK only latches while already asleep
        let mode = mode | Mode1Flags::EXTCLK;
        self.set_mode1(mode, address_type)?;

        self.set_oscillator_frequency(clock_hz);

        let value = prescale_for(self.oscillator_hz, pwm_frequency_hz);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "ext clock {=u32} Hz, pwm {=f32} Hz, prescale {=u8}",
            clock_hz,
            pwm_frequency_hz,
            value
        );

        self.device
            .write_register(self.addresses.resolve(address_type), Prescale { value })?;

        self.set_mode1(
            (mode & !Mode1Flags::SLEEP) | Mode1Flags::RESTART | Mode1Flags::AI,
            address_type,
        )
    }

    /// Programs the PWM frequency closest to `frequency_hz`.
    ///
    /// The request is clamped to `[1, oscillator / 16384]` Hz and converted to a
    /// prescaler (see [`crate::frequency`]). The prescaler is only writable while
    /// sleeping, so the chip is put to sleep, the prescaler written, MODE1 put
    /// back as it was, and after the oscillator settles the chip is restarted with
    /// auto-increment enabled.
    ///
    /// If the chip was asleep before the call it stays asleep.
    ///
    /// # Returns
    /// The frequency the chip runs at with the programmed prescaler. It differs
    /// from the request by the prescaler's rounding.
    ///
    /// # Errors
    /// * `Error::BusError` - I2C communication failed
    pub fn set_pwm_frequency(
        &mut self,
        frequency_hz: f32,
        address_type: AddressType,
    ) -> Result<f32, Error> {
        let value = prescale_for(self.oscillator_hz, frequency_hz);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "pwm {=f32} Hz, osc {=u32} Hz, prescale {=u8}",
            frequency_hz,
            self.oscillator_hz,
            value
        );

        let mode = self.read_mode1()?;
        self.set_mode1(
            (mode & !Mode1Flags::RESTART) | Mode1Flags::SLEEP,
            address_type,
        )?;
        self.device
            .write_register(self.addresses.resolve(address_type), Prescale { value })?;
        self.set_mode1(mode, address_type)?;

        self.delay.delay_ms(WAKE_DELAY_MS);
        self.set_mode1(mode | Mode1Flags::RESTART | Mode1Flags::AI, address_type)?;

        Ok(pwm_frequency_for(self.oscillator_hz, value))
    }

    /// PWM frequency implied by the current prescaler and oscillator frequency.
    ///
    /// Read-only; no mode changes.
    pub fn get_pwm_frequency(&mut self) -> Result<f32, Error> {
        let prescale: Prescale = self.device.read_register(self.addresses.primary)?;
        Ok(pwm_frequency_for(self.oscillator_hz, prescale.value))
    }

    /// Selects totem pole or open-drain outputs, preserving every other MODE2 bit.
    pub fn set_output_type(
        &mut self,
        output_type: OutputType,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let mode = self.read_mode2()?;
        self.set_mode2(output_type.apply(mode), address_type)
    }

    /// Sets a channel's on/off window.
    ///
    /// # Arguments
    /// * `channel` - Output to drive
    /// * `on` - Counter position (0..=4095) where the output turns on
    /// * `off` - Counter position (0..=4095) where the output turns off
    /// * `address_type` - Address to write to
    ///
    /// Ticks are sent as-is. Bit 12 selects full on/full off, higher bits are
    /// ignored by the chip.
    pub fn set_pwm_output(
        &mut self,
        channel: Channel,
        on: u16,
        off: u16,
        address_type: AddressType,
    ) -> Result<(), Error> {
        #[cfg(feature = "defmt")]
        defmt::trace!("pwm {} on {=u16} off {=u16}", channel, on, off);

        self.device.write_bytes(
            self.addresses.resolve(address_type),
            channel.register(),
            &window_bytes(PwmWindow::new(on, off)),
        )
    }

    /// Reads a channel's on/off window back from the primary address.
    ///
    /// Relies on MODE1.AI, which [`set_pwm_frequency`](Pca9685::set_pwm_frequency)
    /// and [`set_ext_clock`](Pca9685::set_ext_clock) leave enabled.
    pub fn pwm_output(&mut self, channel: Channel) -> Result<PwmWindow, Error> {
        let mut raw = [0u8; 4];
        self.device
            .read_bytes(self.addresses.primary, channel.register(), &mut raw)?;
        PwmWindow::from_bytes(raw).map_err(|_| Error::DeserializationError)
    }

    /// Sets every channel's on/off window at once.
    pub fn set_all_pwm_outputs(
        &mut self,
        on: u16,
        off: u16,
        address_type: AddressType,
    ) -> Result<(), Error> {
        self.device.write_register(
            self.addresses.resolve(address_type),
            AllLedOutputs {
                window: PwmWindow::new(on, off),
            },
        )
    }

    /// Programs one of the chip's alternate addresses and routes later
    /// operations for it to `address`.
    ///
    /// The write goes out on `address_type`, i.e. to the chip(s) being
    /// reconfigured. The chip only answers on the new address once the
    /// matching MODE1 bit (ALLCALL, SUB1..SUB3) is set.
    ///
    /// Only the low 7 bits of `address` are used, both on the chip and for
    /// routing.
    pub fn program_alternate_address(
        &mut self,
        alternate: AlternateAddress,
        address: u8,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let target = self.addresses.resolve(address_type);
        let address = address & 0x7F;

        match alternate {
            AlternateAddress::AllCall => self
                .device
                .write_register(target, AllCallAddress { address })?,
            AlternateAddress::Sub1 => self
                .device
                .write_register(target, SubAddress1 { address })?,
            AlternateAddress::Sub2 => self
                .device
                .write_register(target, SubAddress2 { address })?,
            AlternateAddress::Sub3 => self
                .device
                .write_register(target, SubAddress3 { address })?,
        }

        self.addresses.set_alternate(alternate, address);
        Ok(())
    }
}

impl<I2C, D> Pca9685<I2C, D>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously sets a channel's on/off window.
    ///
    /// This is the async version of [`set_pwm_output`](Pca9685::set_pwm_output).
    pub async fn set_pwm_output_async(
        &mut self,
        channel: Channel,
        on: u16,
        off: u16,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let address = self.addresses.resolve(address_type);
        self.device
            .write_bytes_async(
                address,
                channel.register(),
                &window_bytes(PwmWindow::new(on, off)),
            )
            .await
    }

    /// Asynchronously sets every channel's on/off window.
    ///
    /// This is the async version of [`set_all_pwm_outputs`](Pca9685::set_all_pwm_outputs).
    pub async fn set_all_pwm_outputs_async(
        &mut self,
        on: u16,
        off: u16,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let address = self.addresses.resolve(address_type);
        self.device
            .write_register_async(
                address,
                AllLedOutputs {
                    window: PwmWindow::new(on, off),
                },
            )
            .await
    }

    /// Asynchronously reads any register from the primary address.
    pub async fn read_register_async(&mut self, register: u8) -> Result<u8, Error> {
        let mut value = [0u8; 1];
        let address = self.addresses.primary;
        self.device
            .read_bytes_async(address, register, &mut value)
            .await?;
        Ok(value[0])
    }

    /// Asynchronously writes any register.
    pub async fn write_register_async(
        &mut self,
        register: u8,
        data: u8,
        address_type: AddressType,
    ) -> Result<(), Error> {
        let address = self.addresses.resolve(address_type);
        self.device
            .write_bytes_async(address, register, &[data])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::DEFAULT_PWM_FREQUENCY_HZ;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x40;

    /// Helper macro to create a write transaction with register address and value
    macro_rules! write_reg {
        ($addr:expr, $reg:expr, $val:expr) => {
            I2cTransaction::write($addr, [$reg, $val].to_vec())
        };
    }

    /// Helper macro to create a single register read transaction
    macro_rules! read_reg {
        ($addr:expr, $reg:expr, $val:expr) => {
            I2cTransaction::write_read($addr, [$reg].to_vec(), [$val].to_vec())
        };
    }

    /// Adds up every requested delay
    #[derive(Default)]
    struct RecordingDelay {
        total_ns: u64,
    }

    impl embedded_hal::delay::DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn driver(expectations: &[I2cTransaction]) -> Pca9685<I2cMock, NoopDelay> {
        Pca9685::new(I2cMock::new(expectations), NoopDelay::new())
    }

    fn finish<D>(driver: Pca9685<I2cMock, D>) -> D {
        let (mut i2c, delay) = driver.release();
        i2c.done();
        delay
    }

    #[test]
    fn begin_restarts_then_programs_frequency() {
        let expectations = [
            write_reg!(ADDR, 0x00, 0x80),
            read_reg!(ADDR, 0x00, 0x00),
            write_reg!(ADDR, 0x00, 0x10),
            write_reg!(ADDR, 0xFE, 0x05),
            write_reg!(ADDR, 0x00, 0x00),
            write_reg!(ADDR, 0x00, 0xA0),
        ];
        let mut pwm = Pca9685::new(I2cMock::new(&expectations), RecordingDelay::default());
        pwm.set_oscillator_frequency(1);

        let actual = pwm.begin(DEFAULT_PWM_FREQUENCY_HZ).unwrap();
        assert_eq!(actual, 25_000_000.0 / (4096.0 * 6.0));
        assert_eq!(pwm.oscillator_frequency(), INTERNAL_OSCILLATOR_HZ);

        let delay = finish(pwm);
        assert!(delay.total_ns >= 15_000_000);
    }

    #[test]
    fn restart_waits_for_oscillator() {
        let expectations = [write_reg!(0x70, 0x00, 0x80)];
        let mut pwm = Pca9685::new(I2cMock::new(&expectations), RecordingDelay::default());

        pwm.restart(AddressType::AllCall).unwrap();

        let delay = finish(pwm);
        assert!(delay.total_ns >= 10_000_000);
    }

    #[test]
    fn set_pwm_frequency_sleeps_writes_prescale_and_restarts() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0x81),
            write_reg!(ADDR, 0x00, 0x11),
            write_reg!(ADDR, 0xFE, 121),
            write_reg!(ADDR, 0x00, 0x81),
            write_reg!(ADDR, 0x00, 0xA1),
        ];
        let mut pwm = Pca9685::new(I2cMock::new(&expectations), RecordingDelay::default());

        let actual = pwm.set_pwm_frequency(50.0, AddressType::Normal).unwrap();
        assert_eq!(actual, pwm_frequency_for(INTERNAL_OSCILLATOR_HZ, 121));

        let delay = finish(pwm);
        assert!(delay.total_ns >= 500_000);
    }

    #[test]
    fn set_pwm_frequency_keeps_chip_asleep_when_it_was() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0x10),
            write_reg!(ADDR, 0x00, 0x10),
            write_reg!(ADDR, 0xFE, 0x05),
            write_reg!(ADDR, 0x00, 0x10),
            write_reg!(ADDR, 0x00, 0xB0),
        ];
        let mut pwm = driver(&expectations);

        pwm.set_pwm_frequency(1000.0, AddressType::Normal).unwrap();

        finish(pwm);
    }

    #[test]
    fn set_pwm_frequency_clamps_requests() {
        let sequence = |prescale: u8| {
            [
                read_reg!(ADDR, 0x00, 0x00),
                write_reg!(ADDR, 0x00, 0x10),
                write_reg!(ADDR, 0xFE, prescale),
                write_reg!(ADDR, 0x00, 0x00),
                write_reg!(ADDR, 0x00, 0xA0),
            ]
        };
        let mut expectations = std::vec::Vec::new();
        for prescale in [0xFF, 0xFF, 0x03, 0x03] {
            expectations.extend(sequence(prescale));
        }
        let mut pwm = driver(&expectations);

        let low = pwm.set_pwm_frequency(0.0, AddressType::Normal).unwrap();
        let one = pwm.set_pwm_frequency(1.0, AddressType::Normal).unwrap();
        let high = pwm.set_pwm_frequency(100_000.0, AddressType::Normal).unwrap();
        let max = pwm.set_pwm_frequency(1526.0, AddressType::Normal).unwrap();

        assert_eq!(low, one);
        assert_eq!(high, max);
        assert_eq!(high, 25_000_000.0 / 16_384.0);

        finish(pwm);
    }

    #[test]
    fn get_pwm_frequency_matches_programmed_frequency() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0x00),
            write_reg!(ADDR, 0x00, 0x10),
            write_reg!(ADDR, 0xFE, 0x05),
            write_reg!(ADDR, 0x00, 0x00),
            write_reg!(ADDR, 0x00, 0xA0),
            read_reg!(ADDR, 0xFE, 0x05),
        ];
        let mut pwm = driver(&expectations);

        let programmed = pwm.set_pwm_frequency(1000.0, AddressType::Normal).unwrap();
        assert_eq!(pwm.get_pwm_frequency().unwrap(), programmed);

        finish(pwm);
    }

    #[test]
    fn sleep_then_wake_restores_mode1() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0xA1),
            write_reg!(ADDR, 0x00, 0xB1),
            read_reg!(ADDR, 0x00, 0xB1),
            write_reg!(ADDR, 0x00, 0xA1),
        ];
        let mut pwm = driver(&expectations);

        pwm.sleep(AddressType::Normal).unwrap();
        pwm.wake_up(AddressType::Normal).unwrap();

        finish(pwm);
    }

    #[test]
    fn sleep_is_idempotent() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0x31),
            write_reg!(ADDR, 0x00, 0x31),
        ];
        let mut pwm = driver(&expectations);

        pwm.sleep(AddressType::Normal).unwrap();

        finish(pwm);
    }

    #[test]
    fn mode_writes_overwrite_whole_register() {
        let expectations = [
            write_reg!(0x71, 0x00, 0x21),
            write_reg!(ADDR, 0x01, 0x14),
        ];
        let mut pwm = driver(&expectations);

        pwm.set_mode1(Mode1Flags::AI | Mode1Flags::ALLCALL, AddressType::SubCall1)
            .unwrap();
        pwm.set_mode2(Mode2Flags::INVRT | Mode2Flags::OUTDRV, AddressType::Normal)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn set_output_type_applies_outdrv() {
        let expectations = [
            read_reg!(ADDR, 0x01, 0x18),
            write_reg!(ADDR, 0x01, 0x1C),
            read_reg!(ADDR, 0x01, 0x1C),
            write_reg!(0x72, 0x01, 0x18),
        ];
        let mut pwm = driver(&expectations);

        pwm.set_output_type(OutputType::TotemPole, AddressType::Normal)
            .unwrap();
        pwm.set_output_type(OutputType::OpenDrain, AddressType::SubCall2)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn set_ext_clock_sequence() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0xA1),
            write_reg!(0x72, 0x00, 0x31),
            write_reg!(0x72, 0x00, 0x71),
            write_reg!(0x72, 0xFE, 11),
            write_reg!(0x72, 0x00, 0xE1),
        ];
        let mut pwm = driver(&expectations);

        pwm.set_ext_clock(50_000_000, 1000.0, AddressType::SubCall2)
            .unwrap();
        assert_eq!(pwm.oscillator_frequency(), 50_000_000);

        finish(pwm);
    }

    #[test]
    fn set_ext_clock_clamps_pwm_frequency() {
        let expectations = [
            read_reg!(ADDR, 0x00, 0x01),
            write_reg!(ADDR, 0x00, 0x11),
            write_reg!(ADDR, 0x00, 0x51),
            write_reg!(ADDR, 0xFE, 0xFF),
            write_reg!(ADDR, 0x00, 0xE1),
        ];
        let mut pwm = driver(&expectations);

        pwm.set_ext_clock(40_000_000, 0.0, AddressType::Normal)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn set_pwm_output_writes_channel_block() {
        let expectations = [I2cTransaction::write(
            ADDR,
            [0x12, 0x23, 0x01, 0xBC, 0x0A].to_vec(),
        )];
        let mut pwm = driver(&expectations);

        pwm.set_pwm_output(Channel::C3, 0x0123, 0x0ABC, AddressType::Normal)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn set_pwm_output_passes_high_bits_through() {
        let expectations = [I2cTransaction::write(
            0x73,
            [0x42, 0xFF, 0xFF, 0x00, 0x10].to_vec(),
        )];
        let mut pwm = driver(&expectations);

        pwm.set_pwm_output(Channel::C15, 0xFFFF, 0x1000, AddressType::SubCall3)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn set_all_pwm_outputs_writes_all_led_block() {
        let expectations = [I2cTransaction::write(
            0x70,
            [0xFA, 0x00, 0x00, 0x00, 0x08].to_vec(),
        )];
        let mut pwm = driver(&expectations);

        pwm.set_all_pwm_outputs(0, 2048, AddressType::AllCall)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn pwm_output_reads_window_back() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            [0x0A].to_vec(),
            [0x00, 0x01, 0xFF, 0x0F].to_vec(),
        )];
        let mut pwm = driver(&expectations);

        let window = pwm.pwm_output(Channel::C1).unwrap();
        assert_eq!(window, PwmWindow::new(0x0100, 0x0FFF));

        finish(pwm);
    }

    #[test]
    fn raw_register_access() {
        let expectations = [
            read_reg!(ADDR, 0xFF, 0x00),
            write_reg!(0x71, 0x45, 0x99),
        ];
        let mut pwm = driver(&expectations);

        assert_eq!(pwm.read_register(0xFF).unwrap(), 0x00);
        pwm.write_register(0x45, 0x99, AddressType::SubCall1)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn reads_use_primary_address() {
        let config = AddressConfig::new(0x41).with_all_call(0x60);
        let expectations = [
            read_reg!(0x41, 0x00, 0x01),
            write_reg!(0x60, 0x00, 0x11),
        ];
        let mut pwm = Pca9685::with_addresses(I2cMock::new(&expectations), NoopDelay::new(), config);

        pwm.sleep(AddressType::AllCall).unwrap();

        finish(pwm);
    }

    #[test]
    fn address_resolution_follows_configuration() {
        let config = AddressConfig::new(0x4F)
            .with_all_call(0x10)
            .with_sub1(0x11)
            .with_sub2(0x12)
            .with_sub3(0x13);
        let pwm = Pca9685::with_addresses(I2cMock::new(&[]), NoopDelay::new(), config);

        assert_eq!(pwm.address(AddressType::Normal), 0x4F);
        assert_eq!(pwm.address(AddressType::AllCall), 0x10);
        assert_eq!(pwm.address(AddressType::SubCall1), 0x11);
        assert_eq!(pwm.address(AddressType::SubCall2), 0x12);
        assert_eq!(pwm.address(AddressType::SubCall3), 0x13);

        finish(pwm);
    }

    #[test]
    fn new_with_address_keeps_default_alternates() {
        let pwm = Pca9685::new_with_address(I2cMock::new(&[]), NoopDelay::new(), 0x44);

        assert_eq!(pwm.address(AddressType::Normal), 0x44);
        assert_eq!(pwm.address(AddressType::AllCall), 0x70);
        assert_eq!(pwm.address(AddressType::SubCall3), 0x73);

        finish(pwm);
    }

    #[test]
    fn program_alternate_address_updates_routing() {
        let expectations = [
            write_reg!(ADDR, 0x02, 0xAA),
            write_reg!(ADDR, 0x05, 0xC0),
            I2cTransaction::write(0x55, [0xFA, 0x00, 0x00, 0x00, 0x10].to_vec()),
        ];
        let mut pwm = driver(&expectations);

        pwm.program_alternate_address(AlternateAddress::Sub1, 0x55, AddressType::Normal)
            .unwrap();
        pwm.program_alternate_address(AlternateAddress::AllCall, 0x60, AddressType::Normal)
            .unwrap();
        assert_eq!(pwm.address(AddressType::SubCall1), 0x55);
        assert_eq!(pwm.address(AddressType::AllCall), 0x60);

        pwm.set_all_pwm_outputs(0, 0x1000, AddressType::SubCall1)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn programmed_address_routes_on_seven_bits() {
        let expectations = [
            write_reg!(ADDR, 0x02, 0xAA),
            write_reg!(0x55, 0x00, 0x80),
        ];
        let mut pwm = driver(&expectations);

        pwm.program_alternate_address(AlternateAddress::Sub1, 0xD5, AddressType::Normal)
            .unwrap();
        assert_eq!(pwm.address(AddressType::SubCall1), 0x55);
        assert_eq!(pwm.addresses().sub1, 0x55);

        pwm.set_mode1(Mode1Flags::RESTART, AddressType::SubCall1)
            .unwrap();

        finish(pwm);
    }

    #[test]
    fn failed_program_keeps_old_address() {
        let expectations = [write_reg!(ADDR, 0x04, 0xAA).with_error(ErrorKind::Other)];
        let mut pwm = driver(&expectations);

        let result = pwm.program_alternate_address(AlternateAddress::Sub3, 0x55, AddressType::Normal);
        assert!(matches!(result, Err(Error::BusError)));
        assert_eq!(pwm.address(AddressType::SubCall3), 0x73);

        finish(pwm);
    }

    #[test]
    fn oscillator_frequency_is_local_state() {
        let mut pwm = driver(&[]);

        assert_eq!(pwm.oscillator_frequency(), INTERNAL_OSCILLATOR_HZ);
        pwm.set_oscillator_frequency(26_500_000);
        assert_eq!(pwm.oscillator_frequency(), 26_500_000);

        finish(pwm);
    }

    #[test]
    fn bus_error_aborts_read_modify_write() {
        let expectations = [
            I2cTransaction::write_read(ADDR, [0x00].to_vec(), [0x00].to_vec())
                .with_error(ErrorKind::Other),
        ];
        let mut pwm = driver(&expectations);

        let result = pwm.wake_up(AddressType::Normal);
        assert!(matches!(result, Err(Error::BusError)));

        finish(pwm);
    }

    #[test]
    fn async_channel_updates() {
        let expectations = [
            I2cTransaction::write(ADDR, [0x06, 0x00, 0x00, 0x00, 0x04].to_vec()),
            I2cTransaction::write(0x70, [0xFA, 0x00, 0x10, 0x00, 0x00].to_vec()),
            write_reg!(ADDR, 0x01, 0x04),
            read_reg!(ADDR, 0x01, 0x04),
        ];
        let mut pwm = driver(&expectations);

        embassy_futures::block_on(async {
            pwm.set_pwm_output_async(Channel::C0, 0, 1024, AddressType::Normal)
                .await
                .unwrap();
            pwm.set_all_pwm_outputs_async(0x1000, 0, AddressType::AllCall)
                .await
                .unwrap();
            pwm.write_register_async(0x01, 0x04, AddressType::Normal)
                .await
                .unwrap();
            assert_eq!(pwm.read_register_async(0x01).await.unwrap(), 0x04);
        });

        finish(pwm);
    }
}
