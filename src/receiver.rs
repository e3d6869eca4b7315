//! Sharan single-wire protocol receiver.
//!
//! The Sharan steering-wheel remote talks over one digital line that idles
//! HIGH. Every transmission opens with a LOW start mark of at least 8 ms,
//! followed by a HIGH marker whose length tells what comes next:
//!
//! ```text
//!  ‾‾‾‾\________/‾‾‾‾‾‾‾‾‾\_/‾\_/‾‾‾\_/‾\_ ...   32 bits, LSB first
//!       >= 8 ms   4.4 ms     0.6 ms = 0, 1.6 ms = 1
//!
//!  ‾‾‾‾\________/‾‾‾‾\_/‾‾‾‾‾‾
//!       >= 8 ms  2.2 ms           repeat the previous command
//! ```
//!
//! [`SharanReceiver::receive_next`] blocks until it has decoded a command.
//! Noise, truncated frames, unknown frames and repeats with nothing to repeat
//! are all dropped on the floor and scanning starts over; the caller only ever
//! sees a real command.

use embedded_hal::digital::{InputPin, PinState};

use crate::command::{LogicalCommand, SharanFrame};
use crate::consts::{
    COMMAND_INTERVAL_MS, FRAME_BITS, MARKER_TIMEOUT_US, PULSE_TIMEOUT_US, REPEAT_HOLDOFF_MS,
    START_MARK_US,
};
use crate::direct::{DirectInputs, NoDirectInputs};
use crate::pulse::{PulseClass, PulseTimer, read_level};

/// Decoder for the Sharan steering-wheel remote line.
///
/// ## Type Parameters
///
/// - `RX`: the input pin wired to the Sharan line
/// - `T`: the [`PulseTimer`] used to measure pulses and wait
///
/// ## Example
///
/// ```rust,ignore
/// let mut receiver = SharanReceiver::new(sharan_pin, timer, None);
/// loop {
///     let command = receiver.receive_next(); // blocks
///     remote.request_transmit(command)?;
/// }
/// ```
#[derive(Debug)]
pub struct SharanReceiver<RX, T>
where
    RX: InputPin,
    T: PulseTimer,
{
    /// Sharan input pin
    pub rx: RX,
    timer: T,
    /// `true` when the line reaches the pin through an inverting buffer.
    inverted: bool,
    /// Last command decoded off the line, `Error` after a failed frame.
    last_command: LogicalCommand,
    /// The previous call returned a direct-input command.
    last_was_direct: bool,

    /// LOW periods that ended before confirming a start mark.
    pub glitches: u16,

    /// Frames dropped because a bit was out of window or the pattern was unknown.
    pub bad: u16,

    /// Frames decoded to a known command.
    pub good: u16,
}

impl<RX, T> SharanReceiver<RX, T>
where
    RX: InputPin,
    T: PulseTimer,
{
    /// Creates a receiver on `rx`.
    ///
    /// # Arguments
    /// - `rx`: input pin connected to the Sharan line
    /// - `timer`: microsecond clock and delay
    /// - `inverted`: whether the line is read through an inverter (default `false`)
    pub fn new(rx: RX, timer: T, inverted: Option<bool>) -> Self {
        Self {
            rx,
            timer,
            inverted: inverted.unwrap_or(false),
            last_command: LogicalCommand::Error,
            last_was_direct: false,
            glitches: 0,
            bad: 0,
            good: 0,
        }
    }

    /// The last command decoded off the Sharan line.
    ///
    /// `Error` before the first frame and after any failed frame; a `Repeat`
    /// marker is only honoured while this is a real command.
    pub fn last_command(&self) -> LogicalCommand {
        self.last_command
    }

    /// Gives back the pin and the timer.
    pub fn release(self) -> (RX, T) {
        (self.rx, self.timer)
    }

    /// Blocks until the next command arrives on the Sharan line.
    ///
    /// Never returns [`LogicalCommand::Error`].
    pub fn receive_next(&mut self) -> LogicalCommand {
        self.receive_with(&mut NoDirectInputs)
    }

    /// Blocks until the next command arrives on the Sharan line or on one of
    /// the `direct` inputs.
    ///
    /// After a direct-input command, the following call first waits one
    /// command interval (110 ms), so a held button repeats no faster than the
    /// remote itself would.
    pub fn receive_with<D: DirectInputs>(&mut self, direct: &mut D) -> LogicalCommand {
        if self.last_was_direct {
            self.timer.delay_ms(COMMAND_INTERVAL_MS);
            self.last_was_direct = false;
        }

        loop {
            if let Some(command) = self.wait_for_start_mark(direct) {
                debug!("direct input: {:?}", command);
                self.last_was_direct = true;
                return command;
            }

            match self.next_high_pulse(MARKER_TIMEOUT_US) {
                PulseClass::RepeatMarker => {
                    if self.last_command != LogicalCommand::Error {
                        // The repeat sequence is 11 ms long; keep the 110 ms cadence.
                        self.timer.delay_ms(REPEAT_HOLDOFF_MS);
                        trace!("repeat of {:?}", self.last_command);
                        return LogicalCommand::Repeat;
                    }
                    debug!("repeat marker with nothing to repeat");
                }
                PulseClass::FrameMarker => {
                    let decoded = self.receive_frame().and_then(SharanFrame::command);
                    self.last_command = decoded.unwrap_or(LogicalCommand::Error);
                    match decoded {
                        Some(command) => {
                            self.good = self.good.wrapping_add(1);
                            trace!("decoded {:?}", command);
                            return command;
                        }
                        None => {
                            self.bad = self.bad.wrapping_add(1);
                            debug!("dropped frame, {} bad so far", self.bad);
                        }
                    }
                }
                other => trace!("unexpected marker {:?}", other),
            }
        }
    }

    /// Waits for a LOW period of at least 8 ms.
    ///
    /// Returns early with a command if a direct input fires, whether the line
    /// is idle or in the middle of a possible start mark.
    fn wait_for_start_mark<D: DirectInputs>(&mut self, direct: &mut D) -> Option<LogicalCommand> {
        let low = self.physical(PinState::Low);
        loop {
            loop {
                if let Some(command) = direct.poll() {
                    return Some(command);
                }
                // A pin that cannot be read is treated as idle.
                if read_level(&mut self.rx) == Ok(low) {
                    break;
                }
            }

            let mut fired = None;
            let confirmed = self
                .timer
                .holds_level_unless(&mut self.rx, low, START_MARK_US, || {
                    fired = direct.poll();
                    fired.is_some()
                })
                .unwrap_or(false);
            if fired.is_some() {
                return fired;
            }
            if confirmed {
                return None;
            }
            self.glitches = self.glitches.wrapping_add(1);
            trace!("start mark too short");
        }
    }

    /// Reads the 32 data bits of a frame, first bit into bit 0.
    ///
    /// Gives up at the first pulse that is neither a `0` nor a `1`.
    fn receive_frame(&mut self) -> Option<SharanFrame> {
        let mut bits = 0_u32;
        for i in 0..FRAME_BITS {
            match self.next_high_pulse(PULSE_TIMEOUT_US) {
                PulseClass::Zero => {}
                PulseClass::One => bits |= 1 << i,
                other => {
                    trace!("bit {} out of window: {:?}", i, other);
                    return None;
                }
            }
        }
        Some(SharanFrame(bits))
    }

    fn next_high_pulse(&mut self, timeout_us: u32) -> PulseClass {
        let high = self.physical(PinState::High);
        PulseClass::from_measurement(self.timer.measure_pulse(&mut self.rx, high, timeout_us))
    }

    /// Maps a level on the Sharan line to the level seen on the pin.
    fn physical(&self, level: PinState) -> PinState {
        if self.inverted { !level } else { level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{SHARAN_TRACK_DOWN, SHARAN_TRACK_UP, SHARAN_VOLUME_DOWN, SHARAN_VOLUME_UP};
    use crate::direct::DirectInputMux;
    use crate::sim::{Line, LineBuilder, POLL_US, SimButton, SimPin, SimTimer};

    fn receiver(line: &Line) -> SharanReceiver<SimPin, SimTimer> {
        let (pin, timer) = line.split();
        SharanReceiver::new(pin, timer, None)
    }

    #[test]
    fn test_decodes_every_known_frame() {
        let cases = [
            (SHARAN_VOLUME_UP, LogicalCommand::VolumeUp),
            (SHARAN_VOLUME_DOWN, LogicalCommand::VolumeDown),
            (SHARAN_TRACK_UP, LogicalCommand::TrackUp),
            (SHARAN_TRACK_DOWN, LogicalCommand::TrackDown),
        ];
        for (bits, command) in cases {
            let line = Line::builder().high(1_000).sharan_frame(bits).build();
            let mut rx = receiver(&line);
            assert_eq!(rx.receive_next(), command);
            assert_eq!(rx.last_command(), command);
            assert_eq!(rx.good, 1);
            assert_eq!(rx.bad, 0);
        }
    }

    #[test]
    fn test_unknown_frame_is_dropped() {
        // One bit away from "volume up": must not decode to anything.
        let line = Line::builder()
            .high(1_000)
            .sharan_frame(SHARAN_VOLUME_UP ^ 0x0000_0100)
            .sharan_frame(SHARAN_TRACK_DOWN)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::TrackDown);
        assert_eq!(rx.bad, 1);
        assert_eq!(rx.good, 1);
    }

    #[test]
    fn test_repeat_after_command() {
        let line = Line::builder()
            .high(1_000)
            .sharan_frame(SHARAN_VOLUME_UP)
            .sharan_repeat()
            .build();
        let clock = line.clock();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::VolumeUp);

        let before = clock.now();
        assert_eq!(rx.receive_next(), LogicalCommand::Repeat);
        // 9 ms start + 2.2 ms marker + 99 ms hold-off, plus what is left of the trailing HIGH
        assert!(clock.now() - before >= 9_000 + 2_200 + 99_000);
        // The repeat does not replace the command it repeats.
        assert_eq!(rx.last_command(), LogicalCommand::VolumeUp);
    }

    #[test]
    fn test_orphan_repeat_is_dropped() {
        let line = Line::builder()
            .high(1_000)
            .sharan_repeat()
            .sharan_frame(SHARAN_TRACK_UP)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::TrackUp);
    }

    #[test]
    fn test_repeat_after_failed_frame_is_dropped() {
        let line = Line::builder()
            .high(1_000)
            .sharan_frame(SHARAN_VOLUME_UP)
            .sharan_frame(0x1234_5678)
            .sharan_repeat()
            .sharan_frame(SHARAN_VOLUME_DOWN)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::VolumeUp);
        assert_eq!(rx.receive_next(), LogicalCommand::VolumeDown);
        assert_eq!(rx.bad, 1);
    }

    #[test]
    fn test_truncated_frame_is_dropped() {
        // Frame marker, three bits, then a 3 ms pulse that is no bit at all.
        let line = Line::builder()
            .high(1_000)
            .low(9_000)
            .high(4_400)
            .low(600)
            .high(600)
            .low(600)
            .high(1_600)
            .low(600)
            .high(600)
            .low(600)
            .high(3_000)
            .low(600)
            .high(5_000)
            .sharan_frame(SHARAN_VOLUME_DOWN)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::VolumeDown);
        assert_eq!(rx.bad, 1);
        assert_eq!(rx.last_command(), LogicalCommand::VolumeDown);
    }

    #[test]
    fn test_short_low_glitch_is_not_a_start_mark() {
        let line = Line::builder()
            .high(1_000)
            .low(3_000)
            .high(1_000)
            .sharan_frame(SHARAN_TRACK_DOWN)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::TrackDown);
        assert_eq!(rx.glitches, 1);
    }

    #[test]
    fn test_unexpected_marker_restarts_scan() {
        // 3 ms HIGH after the start mark is neither a repeat nor a frame marker.
        let line = Line::builder()
            .high(1_000)
            .low(9_000)
            .high(3_000)
            .low(600)
            .high(5_000)
            .sharan_frame(SHARAN_TRACK_UP)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::TrackUp);
        assert_eq!(rx.bad, 0);
    }

    #[test]
    fn test_decodes_across_counter_wrap() {
        let line = Line::builder()
            .starting_at(u64::from(u32::MAX) - 20_000)
            .high(1_000)
            .sharan_frame(SHARAN_VOLUME_UP)
            .build();
        let mut rx = receiver(&line);
        assert_eq!(rx.receive_next(), LogicalCommand::VolumeUp);
    }

    #[test]
    fn test_inverted_line() {
        // Mirror image of a frame, as seen behind an inverting buffer.
        let normal: LineBuilder = Line::builder().high(1_000).sharan_frame(SHARAN_TRACK_UP);
        let mut inverted = Line::builder();
        for (level, us) in normal.segments() {
            inverted = match level {
                PinState::High => inverted.low(us),
                PinState::Low => inverted.high(us),
            };
        }
        // Idle HIGH on the wire is LOW at the pin.
        let line = inverted.low(50_000).build();
        let (pin, timer) = line.split();
        let mut rx = SharanReceiver::new(pin, timer, Some(true));
        assert_eq!(rx.receive_next(), LogicalCommand::TrackUp);
    }

    #[test]
    fn test_direct_input_short_circuits_and_holds_off() {
        let line = Line::builder()
            .high(200_000)
            .sharan_frame(SHARAN_VOLUME_DOWN)
            .build();
        let clock = line.clock();
        let mut mux = DirectInputMux::new();
        mux.add(SimButton::never(clock.clone()), LogicalCommand::VolumeUp)
            .unwrap();
        mux.add(
            SimButton::pressed_between(clock.clone(), 5_000, 6_000),
            LogicalCommand::TrackUp,
        )
        .unwrap();

        let mut rx = receiver(&line);
        assert_eq!(rx.receive_with(&mut mux), LogicalCommand::TrackUp);
        let pressed_at = clock.now();
        assert!((5_000..5_000 + 4 * POLL_US).contains(&pressed_at));
        // Direct commands leave the repeat memory alone.
        assert_eq!(rx.last_command(), LogicalCommand::Error);

        assert_eq!(rx.receive_with(&mut mux), LogicalCommand::VolumeDown);
        assert!(clock.now() - pressed_at >= 110_000);
    }

    #[test]
    fn test_direct_input_on_line_stuck_low() {
        // No remote attached: the line sits LOW, which keeps looking like a start mark.
        let line = Line::builder().low(3_000_000).build();
        let clock = line.clock();
        let mut mux = DirectInputMux::new();
        mux.add(
            SimButton::pressed_between(clock.clone(), 100_000, 150_000),
            LogicalCommand::VolumeUp,
        )
        .unwrap();

        let mut rx = receiver(&line);
        assert_eq!(rx.receive_with(&mut mux), LogicalCommand::VolumeUp);
        let pressed_at = clock.now();
        assert!((100_000..100_000 + u64::from(MARKER_TIMEOUT_US)).contains(&pressed_at));
        assert_eq!(rx.bad, 0);
    }

    #[test]
    fn test_direct_input_during_start_mark_confirmation() {
        let line = Line::builder().high(1_000).low(3_000_000).build();
        let clock = line.clock();
        let mut mux = DirectInputMux::new();
        mux.add(
            SimButton::pressed_between(clock.clone(), 4_000, 4_500),
            LogicalCommand::TrackDown,
        )
        .unwrap();

        let mut rx = receiver(&line);
        assert_eq!(rx.receive_with(&mut mux), LogicalCommand::TrackDown);
        // Seen on the first read after the press, 3 ms into the LOW.
        assert!((4_000..4_000 + 2 * POLL_US).contains(&clock.now()));
        assert_eq!(rx.glitches, 0);
    }

    #[test]
    fn test_release_returns_parts() {
        let line = Line::builder().build();
        let rx = receiver(&line);
        let (_pin, _timer) = rx.release();
    }
}
