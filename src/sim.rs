//! Host-side simulation of the wires, for tests.
//!
//! A [`Line`] is a scripted waveform on the Sharan input. Its pin and timer
//! share one virtual microsecond clock: every pin read costs [`POLL_US`],
//! every delay moves the clock forward. Output pins record the level they
//! were last driven to, so a test can sample them tick by tick.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::pulse::PulseTimer;

/// Virtual time consumed by one read of a simulated input pin.
pub(crate) const POLL_US: u64 = 2;

/// Reads past this much time after the scripted waveform mean a test would hang.
const EXHAUSTED_AFTER_US: u64 = 2_000_000;

/// Shared virtual clock; also a [`DelayNs`] that just moves time forward.
#[derive(Clone, Default, Debug)]
pub(crate) struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    pub(crate) fn now(&self) -> u64 {
        self.0.get()
    }

    fn advance(&self, us: u64) {
        self.0.set(self.0.get() + us);
    }
}

impl DelayNs for SimClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(u64::from(ns.div_ceil(1_000)));
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(u64::from(us));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms) * 1_000);
    }
}

/// Builds a [`Line`] segment by segment. The line idles HIGH outside the script.
#[derive(Default, Debug)]
pub(crate) struct LineBuilder {
    start: u64,
    segments: Vec<(PinState, u64)>,
}

impl LineBuilder {
    pub(crate) fn starting_at(mut self, us: u64) -> Self {
        self.start = us;
        self
    }

    pub(crate) fn high(mut self, us: u64) -> Self {
        self.segments.push((PinState::High, us));
        self
    }

    pub(crate) fn low(mut self, us: u64) -> Self {
        self.segments.push((PinState::Low, us));
        self
    }

    /// A Sharan frame: start mark, frame marker, 32 bits LSB first, closing gap.
    pub(crate) fn sharan_frame(mut self, bits: u32) -> Self {
        self = self.low(9_000).high(4_400);
        for i in 0..32 {
            let width = if bits & (1 << i) != 0 { 1_600 } else { 600 };
            self = self.low(600).high(width);
        }
        self.low(600).high(20_000)
    }

    /// A Sharan repeat sequence: start mark, repeat marker, closing gap.
    pub(crate) fn sharan_repeat(self) -> Self {
        self.low(9_000).high(2_200).low(600).high(20_000)
    }

    pub(crate) fn segments(&self) -> Vec<(PinState, u64)> {
        self.segments.clone()
    }

    pub(crate) fn build(self) -> Line {
        let clock = SimClock::default();
        clock.advance(self.start);
        let mut edges = Vec::with_capacity(self.segments.len());
        let mut at = self.start;
        for (level, us) in self.segments {
            at += us;
            edges.push((at, level));
        }
        Line {
            clock,
            edges: Rc::new(edges),
        }
    }
}

/// A scripted input waveform and the clock it plays against.
#[derive(Clone, Debug)]
pub(crate) struct Line {
    clock: SimClock,
    /// `(end, level)`: the line is at `level` until `end`.
    edges: Rc<Vec<(u64, PinState)>>,
}

impl Line {
    pub(crate) fn builder() -> LineBuilder {
        LineBuilder::default()
    }

    pub(crate) fn clock(&self) -> SimClock {
        self.clock.clone()
    }

    pub(crate) fn split(&self) -> (SimPin, SimTimer) {
        (
            SimPin { line: self.clone() },
            SimTimer {
                clock: self.clock(),
            },
        )
    }

    fn level_at(&self, at: u64) -> PinState {
        self.edges
            .iter()
            .find(|(end, _)| at < *end)
            .map_or(PinState::High, |(_, level)| *level)
    }

    fn end(&self) -> u64 {
        self.edges.last().map_or(0, |(end, _)| *end)
    }
}

/// Input pin that plays back a [`Line`].
#[derive(Debug)]
pub(crate) struct SimPin {
    line: Line,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let now = self.line.clock.now();
        assert!(
            now < self.line.end() + EXHAUSTED_AFTER_US,
            "simulated line exhausted at {now} µs"
        );
        self.line.clock.advance(POLL_US);
        Ok(self.line.level_at(now) == PinState::High)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// [`PulseTimer`] running on the simulated clock.
#[derive(Debug)]
pub(crate) struct SimTimer {
    clock: SimClock,
}

impl DelayNs for SimTimer {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.clock.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}

impl PulseTimer for SimTimer {
    fn now_us(&mut self) -> u32 {
        // The hardware counter is 32 bits wide.
        (self.clock.now() & u64::from(u32::MAX)) as u32
    }
}

/// Active-low push button held down during `[from, until)` on the line's clock.
#[derive(Debug)]
pub(crate) struct SimButton {
    clock: SimClock,
    from: u64,
    until: u64,
}

impl SimButton {
    pub(crate) fn pressed_between(clock: SimClock, from: u64, until: u64) -> Self {
        Self { clock, from, until }
    }

    pub(crate) fn never(clock: SimClock) -> Self {
        Self::pressed_between(clock, 0, 0)
    }
}

impl ErrorType for SimButton {
    type Error = Infallible;
}

impl InputPin for SimButton {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let now = self.clock.now();
        Ok(!(self.from..self.until).contains(&now))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

/// Output pin remembering its level; clones observe the same pin.
#[derive(Clone, Default, Debug)]
pub(crate) struct ProbePin {
    high: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl ProbePin {
    pub(crate) fn is_set_high(&self) -> bool {
        self.high.get()
    }

    pub(crate) fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl ErrorType for ProbePin {
    type Error = Infallible;
}

impl OutputPin for ProbePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high.set(false);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high.set(true);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// Collapses per-tick samples into `(level, ticks)` runs.
pub(crate) fn runs(samples: &[bool]) -> Vec<(bool, u32)> {
    let mut out: Vec<(bool, u32)> = Vec::new();
    for &level in samples {
        match out.last_mut() {
            Some((last, count)) if *last == level => *count += 1,
            _ => out.push((level, 1)),
        }
    }
    out
}

/// The `(level, ticks)` runs an Alpine frame must produce, leader to trailer.
pub(crate) fn expected_alpine_runs(frame: u32) -> Vec<(bool, u32)> {
    let mut out = vec![(true, 16), (false, 8)];
    for i in 0..32 {
        let space = if i == 31 {
            1
        } else if frame & (1 << i) != 0 {
            3
        } else {
            1
        };
        out.push((true, 1));
        out.push((false, space));
    }
    out
}
