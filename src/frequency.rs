//! PWM frequency and prescaler arithmetic
//!
//! The PWM cycle rate is the reference oscillator divided by the 4096-step
//! counter and by `prescale + 1`:
//!
//! ```text
//! f_PWM = f_OSC / (4096 × (prescale + 1))
//! prescale = round(f_OSC / (4096 × f_PWM)) − 1
//! ```
//!
//! Where:
//! - `f_OSC` = Reference oscillator frequency (25 MHz internal, up to 50 MHz on EXTCLK)
//! - `prescale` = 8-bit PRE_SCALE register value, 3..=255
//!
//! Requests outside the reachable range saturate instead of failing:
//! the PWM frequency is clamped to `[1, f_OSC / 16384]` and the prescaler
//! to `[3, 255]`. None of these functions touch the bus.

/// Nominal frequency of the internal oscillator (Hz)
pub const INTERNAL_OSCILLATOR_HZ: u32 = 25_000_000;

/// PWM frequency programmed by [`crate::Pca9685::begin`] when none is given (Hz)
pub const DEFAULT_PWM_FREQUENCY_HZ: f32 = 1000.0;

/// Smallest prescaler the chip accepts
pub const PRESCALE_MIN: u8 = 0x03;

/// Largest prescaler the register can hold
pub const PRESCALE_MAX: u8 = 0xFF;

/// Steps in one PWM cycle
const COUNTER_STEPS: f32 = 4096.0;

/// `COUNTER_STEPS × (PRESCALE_MIN + 1)`, the divisor of the highest reachable frequency
const MIN_DIVISOR: u32 = 16_384;

/// Highest PWM frequency reachable with the given oscillator, in whole Hz.
///
/// Never less than 1 Hz, so the clamp range stays well formed for any
/// oscillator value.
pub fn max_pwm_frequency(oscillator_hz: u32) -> u32 {
    (oscillator_hz / MIN_DIVISOR).max(1)
}

/// Saturates a requested PWM frequency to `[1, max_pwm_frequency(oscillator_hz)]`.
///
/// NaN saturates to the lower bound.
pub fn clamp_pwm_frequency(oscillator_hz: u32, target_hz: f32) -> f32 {
    let upper = max_pwm_frequency(oscillator_hz) as f32;

    if target_hz.is_nan() || target_hz < 1.0 {
        1.0
    } else if target_hz > upper {
        upper
    } else {
        target_hz
    }
}

/// Prescaler value that gets closest to `target_hz`.
///
/// The target is clamped first, then `f_OSC / (4096 × f)` is rounded half up
/// and the result is clamped to `[PRESCALE_MIN, PRESCALE_MAX]`.
///
/// # Example
///
/// ```
/// use pca9685::frequency::{prescale_for, INTERNAL_OSCILLATOR_HZ};
///
/// // round(25 MHz / (4096 × 1 kHz)) − 1 = round(6.10) − 1 = 5
/// assert_eq!(prescale_for(INTERNAL_OSCILLATOR_HZ, 1000.0), 5);
/// ```
pub fn prescale_for(oscillator_hz: u32, target_hz: f32) -> u8 {
    let target_hz = clamp_pwm_frequency(oscillator_hz, target_hz);

    // Float to int casts truncate, which is floor for these positive values
    let rounded = (oscillator_hz as f32 / (COUNTER_STEPS * target_hz) + 0.5) as u32;

    rounded
        .saturating_sub(1)
        .clamp(PRESCALE_MIN as u32, PRESCALE_MAX as u32) as u8
}

/// PWM frequency produced by a prescaler value.
///
/// This is the frequency the chip actually runs at, which differs from the
/// requested one by the prescaler's integer rounding.
pub fn pwm_frequency_for(oscillator_hz: u32, prescale: u8) -> f32 {
    oscillator_hz as f32 / (COUNTER_STEPS * (prescale as f32 + 1.0))
}
