//! Busy-waiting Alpine transmitter (feature `delay-loop`).
//!
//! [`BlockingAlpineEncoder::send`] bit-bangs a whole frame with a
//! [`DelayNs`] and returns when it is on the wire. It needs neither a timer
//! interrupt nor the pending slot, at the price of blocking the caller for
//! up to ~68 ms per frame.
//!
//! Timings are the classic NEC microsecond values rather than whole ticks:
//!
//! | Segment          | Level | Duration |
//! |------------------|-------|----------|
//! | Leader mark      | HIGH  | 9000 µs  |
//! | Leader space     | LOW   | 4500 µs  |
//! | Bit mark         | HIGH  | 560 µs   |
//! | `0` space        | LOW   | 560 µs   |
//! | `1` space        | LOW   | 1690 µs  |
//! | Last space       | LOW   | 560 µs   |
//! | Repeat space     | LOW   | 2250 µs  |

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::command::{AlpineFrame, LogicalCommand};
use crate::consts::{
    BIT_MARK_US, FRAME_BITS, LEADER_MARK_US, LEADER_SPACE_US, ONE_SPACE_US, REPEAT_SPACE_US,
    ZERO_SPACE_US,
};
use crate::encoder::{Transmit, TransmitError};

/// What [`LogicalCommand::Repeat`] puts on the wire.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum RepeatStyle {
    /// The short NEC repeat code: leader mark, 2250 µs space, one bit mark.
    #[default]
    NecRepeatCode,
    /// The last full frame again.
    FullFrame,
}

/// Alpine transmitter driven by busy-wait delays.
///
/// ## Type Parameters
///
/// - `TX`: output pin driving the Alpine remote input (idle LOW)
/// - `STATUS`: optional indicator, HIGH while transmitting
/// - `D`: delay provider
#[derive(Debug)]
pub struct BlockingAlpineEncoder<TX, STATUS, D>
where
    TX: OutputPin,
    STATUS: OutputPin,
    D: DelayNs,
{
    /// Alpine output pin
    pub tx: TX,
    /// Transmission indicator pin
    pub status: Option<STATUS>,
    status_inverted: bool,
    delay: D,
    repeat_style: RepeatStyle,
    last_frame: Option<AlpineFrame>,
}

impl<TX, STATUS, D> BlockingAlpineEncoder<TX, STATUS, D>
where
    TX: OutputPin,
    STATUS: OutputPin,
    D: DelayNs,
{
    /// Creates an encoder and drives TX `LOW`.
    ///
    /// # Arguments
    /// - `tx`: output pin to the head unit
    /// - `status`: optional indicator pin
    /// - `status_inverted`: whether the indicator is active LOW (default `false`)
    /// - `delay`: delay provider
    /// - `repeat_style`: what a `Repeat` sends (default [`RepeatStyle::NecRepeatCode`])
    pub fn new(
        tx: TX,
        status: Option<STATUS>,
        status_inverted: Option<bool>,
        delay: D,
        repeat_style: Option<RepeatStyle>,
    ) -> Self {
        let mut encoder = Self {
            tx,
            status,
            status_inverted: status_inverted.unwrap_or(false),
            delay,
            repeat_style: repeat_style.unwrap_or_default(),
            last_frame: None,
        };
        encoder.mark(false);
        encoder.write_status(false);
        encoder
    }

    /// Sends `command` and returns once it has been transmitted.
    ///
    /// # Errors
    /// - [`TransmitError::NotTransmittable`] for [`LogicalCommand::Error`]
    /// - [`TransmitError::NothingToRepeat`] for a `Repeat` before any frame
    pub fn send(&mut self, command: LogicalCommand) -> Result<(), TransmitError> {
        match command {
            LogicalCommand::Repeat => {
                let frame = self.last_frame.ok_or(TransmitError::NothingToRepeat)?;
                self.write_status(true);
                match self.repeat_style {
                    RepeatStyle::NecRepeatCode => self.send_repeat_code(),
                    RepeatStyle::FullFrame => self.send_frame(frame),
                }
            }
            other => {
                let frame =
                    AlpineFrame::for_command(other).ok_or(TransmitError::NotTransmittable(other))?;
                self.last_frame = Some(frame);
                self.write_status(true);
                self.send_frame(frame);
            }
        }
        self.write_status(false);
        Ok(())
    }

    /// Gives back the pins and the delay.
    pub fn release(self) -> (TX, Option<STATUS>, D) {
        (self.tx, self.status, self.delay)
    }

    fn send_frame(&mut self, frame: AlpineFrame) {
        trace!("sending {:?}", frame);
        self.pulse(LEADER_MARK_US, LEADER_SPACE_US);
        for i in 0..FRAME_BITS {
            let space = if frame.bit(i) && i + 1 < FRAME_BITS {
                ONE_SPACE_US
            } else {
                ZERO_SPACE_US
            };
            self.pulse(BIT_MARK_US, space);
        }
    }

    fn send_repeat_code(&mut self) {
        trace!("sending repeat code");
        self.pulse(LEADER_MARK_US, REPEAT_SPACE_US);
        self.mark(true);
        self.delay.delay_us(BIT_MARK_US);
        self.mark(false);
    }

    fn pulse(&mut self, mark_us: u32, space_us: u32) {
        self.mark(true);
        self.delay.delay_us(mark_us);
        self.mark(false);
        self.delay.delay_us(space_us);
    }

    fn mark(&mut self, high: bool) {
        let _ = if high {
            self.tx.set_high()
        } else {
            self.tx.set_low()
        };
    }

    fn write_status(&mut self, on: bool) {
        let state = if self.status_inverted { !on } else { on };
        if let Some(ref mut status) = self.status {
            let _ = if state {
                status.set_high()
            } else {
                status.set_low()
            };
        }
    }
}

impl<TX, STATUS, D> Transmit for BlockingAlpineEncoder<TX, STATUS, D>
where
    TX: OutputPin,
    STATUS: OutputPin,
    D: DelayNs,
{
    fn transmit(&mut self, command: LogicalCommand) -> Result<(), TransmitError> {
        self.send(command)
    }
}
