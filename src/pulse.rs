//! Pulse timing: a microsecond clock, blocking pulse measurement and pulse classification.
//!
//! The Sharan receiver never touches a timer directly. It asks a [`PulseTimer`]
//! to measure how long the line stays at a level, and classifies the result
//! with [`PulseClass::classify`]. A platform that has edge interrupts can
//! provide its own [`PulseTimer`] without changing the receiver.
//!
//! The clock is a free-running `u32` microsecond counter. It wraps roughly
//! every 71 minutes, so elapsed times are always computed with
//! `wrapping_sub`, never by comparing timestamps.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, PinState};
use thiserror::Error;

use crate::consts::{
    FRAME_MARKER_MAX_US, FRAME_MARKER_MIN_US, ONE_PULSE_MAX_US, ONE_PULSE_MIN_US,
    REPEAT_MARKER_MAX_US, REPEAT_MARKER_MIN_US, START_MARK_US, ZERO_PULSE_MAX_US,
    ZERO_PULSE_MIN_US,
};

/// Failure of a pulse measurement.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PulseError {
    /// The pulse did not start and end within the given number of microseconds.
    #[error("no complete pulse within {0} µs")]
    Timeout(u32),
    /// The input pin could not be read.
    #[error("input pin read failed")]
    Pin,
}

/// The window a measured pulse duration falls into.
///
/// Every duration maps to exactly one class; all bounds are inclusive.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum PulseClass {
    /// 400–800 µs: a `0` bit.
    Zero,
    /// 1400–1800 µs: a `1` bit.
    One,
    /// 2000–2400 µs: "repeat the previous command".
    RepeatMarker,
    /// 4200–4600 µs: a 32-bit frame follows.
    FrameMarker,
    /// 8000 µs and longer: long enough to confirm a start mark.
    StartConfirm,
    /// Anything else, including a timed-out measurement.
    OutOfWindow,
}

impl PulseClass {
    /// Classifies a pulse duration in microseconds.
    pub const fn classify(duration_us: u32) -> Self {
        match duration_us {
            ZERO_PULSE_MIN_US..=ZERO_PULSE_MAX_US => PulseClass::Zero,
            ONE_PULSE_MIN_US..=ONE_PULSE_MAX_US => PulseClass::One,
            REPEAT_MARKER_MIN_US..=REPEAT_MARKER_MAX_US => PulseClass::RepeatMarker,
            FRAME_MARKER_MIN_US..=FRAME_MARKER_MAX_US => PulseClass::FrameMarker,
            START_MARK_US..=u32::MAX => PulseClass::StartConfirm,
            _ => PulseClass::OutOfWindow,
        }
    }

    /// Classifies the outcome of [`PulseTimer::measure_pulse`].
    pub fn from_measurement(measurement: Result<u32, PulseError>) -> Self {
        match measurement {
            Ok(duration_us) => Self::classify(duration_us),
            Err(_) => PulseClass::OutOfWindow,
        }
    }
}

/// A monotonic microsecond clock able to time pulses on an input pin.
///
/// Only [`now_us`](PulseTimer::now_us) (and the [`DelayNs`] methods) must be
/// provided; the measuring methods busy-poll the pin against that clock.
pub trait PulseTimer: DelayNs {
    /// Current value of the free-running microsecond counter.
    fn now_us(&mut self) -> u32;

    /// Microseconds elapsed since `since`, correct across counter wraparound.
    fn elapsed_us(&mut self, since: u32) -> u32 {
        self.now_us().wrapping_sub(since)
    }

    /// Measures the next complete pulse at `level` on `pin`.
    ///
    /// A pulse already in progress when the call starts is let through first,
    /// so the result is always a whole pulse. Blocks until the pin leaves
    /// `level` again, or fails with [`PulseError::Timeout`] once `timeout_us`
    /// have passed since the call.
    ///
    /// # Returns
    /// The pulse length in microseconds.
    fn measure_pulse<P: InputPin>(
        &mut self,
        pin: &mut P,
        level: PinState,
        timeout_us: u32,
    ) -> Result<u32, PulseError> {
        let called = self.now_us();
        wait_while(self, pin, level, called, timeout_us)?;
        wait_while(self, pin, !level, called, timeout_us)?;
        let started = self.now_us();
        wait_while(self, pin, level, called, timeout_us)?;
        Ok(self.elapsed_us(started))
    }

    /// Checks that `pin` stays at `level` for at least `duration_us`.
    ///
    /// Returns `Ok(false)` as soon as the pin is seen at the other level.
    fn holds_level<P: InputPin>(
        &mut self,
        pin: &mut P,
        level: PinState,
        duration_us: u32,
    ) -> Result<bool, PulseError> {
        self.holds_level_unless(pin, level, duration_us, || false)
    }

    /// Like [`holds_level`](PulseTimer::holds_level), but also gives up with
    /// `Ok(false)` as soon as `cancel` returns `true`.
    ///
    /// `cancel` is called once per pin read, so it can poll other inputs
    /// while the level is being timed.
    fn holds_level_unless<P, F>(
        &mut self,
        pin: &mut P,
        level: PinState,
        duration_us: u32,
        mut cancel: F,
    ) -> Result<bool, PulseError>
    where
        P: InputPin,
        F: FnMut() -> bool,
    {
        let started = self.now_us();
        loop {
            if cancel() {
                return Ok(false);
            }
            if read_level(pin)? != level {
                return Ok(false);
            }
            if self.elapsed_us(started) >= duration_us {
                return Ok(true);
            }
        }
    }
}

/// Reads `pin` as a [`PinState`].
pub fn read_level<P: InputPin>(pin: &mut P) -> Result<PinState, PulseError> {
    pin.is_high()
        .map(PinState::from)
        .map_err(|_| PulseError::Pin)
}

fn wait_while<T, P>(
    timer: &mut T,
    pin: &mut P,
    level: PinState,
    since: u32,
    timeout_us: u32,
) -> Result<(), PulseError>
where
    T: PulseTimer + ?Sized,
    P: InputPin,
{
    while read_level(pin)? == level {
        if timer.elapsed_us(since) >= timeout_us {
            return Err(PulseError::Timeout(timeout_us));
        }
    }
    Ok(())
}

/// A [`PulseTimer`] assembled from a HAL delay and a microsecond counter.
///
/// # Example
/// ```rust,ignore
/// let timer = ClockPulseTimer::new(delay, || hal_timer.get_counter_low());
/// ```
#[derive(Debug)]
pub struct ClockPulseTimer<D, F>
where
    D: DelayNs,
    F: FnMut() -> u32,
{
    delay: D,
    micros: F,
}

impl<D, F> ClockPulseTimer<D, F>
where
    D: DelayNs,
    F: FnMut() -> u32,
{
    /// Wraps `delay` and the counter read by `micros`.
    pub fn new(delay: D, micros: F) -> Self {
        Self { delay, micros }
    }

    /// Gives back the wrapped delay and counter.
    pub fn release(self) -> (D, F) {
        (self.delay, self.micros)
    }
}

impl<D, F> DelayNs for ClockPulseTimer<D, F>
where
    D: DelayNs,
    F: FnMut() -> u32,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}

impl<D, F> PulseTimer for ClockPulseTimer<D, F>
where
    D: DelayNs,
    F: FnMut() -> u32,
{
    fn now_us(&mut self) -> u32 {
        (self.micros)()
    }
}
