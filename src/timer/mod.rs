//! Tick scheduling for the Alpine encoder.
//!
//! The encoder has to be ticked every 562.5 µs. This employs two approaches: an interrupt
//! service routine using `critical_section::with` (`timer-isr` feature), or a busy-loop
//! delay timer (`delay-loop` feature).
//!
//! Contains helpers for polling- and ISR-based scheduling, including:
//! - `compute_ocr_value`: runtime OCR calculator
//! - `const_ocr_value`: compile-time OCR calculator
//! - `run_tick_loop` / `flush`: blocking tick drivers for `DelayNs` (feature `delay-loop`)
//! - `global_encoder_tick` and `tick_alpine_encoder!()`: interrupt-based tick callback
//!   wrappers (feature `timer-isr`)
//!
//! Compare values for a 562.5 µs tick on a 16 MHz part:
//!
//! | PRESCALER | OCR  | Actual tick |
//! |-----------|------|-------------|
//! |         8 | 1125 |    562.5 µs |
//! |        64 |  141 |    564.0 µs |
//! |       256 |   35 |    560.0 µs |

use libm::round;

#[cfg(feature = "delay-loop")]
mod delay;
#[cfg(feature = "delay-loop")]
pub use delay::*;

#[cfg(feature = "timer-isr")]
mod isr;
#[cfg(feature = "timer-isr")]
pub use isr::*;

#[cfg(feature = "timer-isr")]
mod macros;

/// One Alpine tick: 562.5 µs.
pub const TICK_US: f32 = 562.5;
/// [`TICK_US`] for timers and delays that only take whole microseconds.
pub const TICK_US_INTEGER: u32 = 562;
/// 1,000 nanoseconds = 1 microsecond
pub const NANOSECONDS_PER_MICROSECOND: u64 = 1_000;
/// 1,000,000,000 nanoseconds = 1 second
pub const NANOSECONDS_PER_SECOND: u64 = 1_000_000_000;

/// Computes the OCR value for an AVR timer (CTC mode)
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 8, 64, 256)
/// - `tick_us`: desired tick interval in microseconds (normally [`TICK_US`])
///
/// # Returns
/// - OCR value for OCRnA (rounds to nearest integer)
pub fn compute_ocr_value(f_cpu: u32, prescaler: u32, tick_us: f32) -> u16 {
    let ticks_per_second = f64::from(f_cpu) / f64::from(prescaler);
    let ticks_per_tick = ticks_per_second * (f64::from(tick_us) / 1_000_000.0);
    round(ticks_per_tick) as u16
}

/// Compile-time OCR value calculator
///
/// Same as [`compute_ocr_value`], but truncates instead of rounding.
///
/// # Arguments
/// - `f_cpu`: CPU frequency in Hz
/// - `prescaler`: timer prescaler (e.g., 8, 64, 256)
/// - `tick_us`: desired tick interval in microseconds (normally [`TICK_US`])
///
/// # Example
/// ```rust
/// use sharan_alpine::timer::{TICK_US, const_ocr_value};
///
/// const OCR: u16 = const_ocr_value(16_000_000, 8, TICK_US);
/// assert_eq!(OCR, 1125);
/// ```
pub const fn const_ocr_value(f_cpu: u32, prescaler: u32, tick_us: f32) -> u16 {
    // nanoseconds keep the half microsecond
    let tick_ns = (tick_us as f64 * NANOSECONDS_PER_MICROSECOND as f64) as u64;
    ((f_cpu / prescaler) as u64 * tick_ns / NANOSECONDS_PER_SECOND) as u16
}
