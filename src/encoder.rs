//! Tick-driven Alpine (NEC-style) transmitter.
//!
//! The transmitter is split along the two execution contexts that use it:
//!
//! - [`AlpineRemote`] lives in the control context. It turns a
//!   [`LogicalCommand`] into an [`AlpineFrame`] and drops it into the shared
//!   [`PendingCommand`] slot. It never waits.
//! - [`AlpineEncoder`] lives in the timer interrupt. Each call to
//!   [`advance_tick`](AlpineEncoder::advance_tick) moves its bit-emission state
//!   machine forward by one 562.5 µs tick.
//!
//! ## Waveform
//!
//! All durations are whole ticks of 562.5 µs. Bits go out LSB first.
//!
//! ```text
//!  leader            bit 0   bit 1     ...   bit 31
//!  ‾‾‾‾‾‾‾‾‾‾\____ /‾\_   /‾\___            /‾\_
//!    16 ticks   8    1 1    1  3   (0 / 1)    1 1   trailer: always short
//! ```
//!
//! A frame is never cut short. A frame requested while another is on the
//! wire waits in the slot until the transmitter is back in
//! [`TransmitState::Idle`]; if a second one arrives before that, it replaces
//! the first.

use core::convert::Infallible;

use embedded_hal::digital::OutputPin;
use thiserror::Error;

use crate::command::{AlpineFrame, LogicalCommand};
use crate::consts::{
    BIT_MARK_TICKS, FRAME_BITS, LEADER_MARK_TICKS, LEADER_SPACE_TICKS, ONE_SPACE_TICKS,
    TRAILER_TICKS, ZERO_SPACE_TICKS,
};
use crate::pending::PendingCommand;

/// Why a transmit request was ignored.
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TransmitError {
    /// The command has no Alpine frame.
    #[error("{0:?} cannot be transmitted")]
    NotTransmittable(LogicalCommand),
    /// A repeat was requested before any frame was sent.
    #[error("nothing to repeat")]
    NothingToRepeat,
}

/// Something that puts [`LogicalCommand`]s on the Alpine wire.
///
/// Implemented by [`AlpineRemote`] (queues for the tick-driven encoder) and,
/// with the `delay-loop` feature, by
/// [`BlockingAlpineEncoder`](crate::blocking::BlockingAlpineEncoder) (sends on the spot).
pub trait Transmit {
    /// Hands `command` over for transmission.
    ///
    /// # Errors
    /// [`TransmitError`] when the command has nothing to send; the wire is left alone.
    fn transmit(&mut self, command: LogicalCommand) -> Result<(), TransmitError>;
}

/// Half of a pulse pair: carrier on or off.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Phase {
    /// Output HIGH.
    Mark,
    /// Output LOW.
    Space,
}

/// Where the transmitter is within a frame.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TransmitState {
    /// Output LOW, waiting for a pending frame.
    #[default]
    Idle,
    /// The 9 ms + 4.5 ms leader.
    Leader(Phase),
    /// Bit `n` of the frame. The mark of bit 31 is followed by [`Trailer`](TransmitState::Trailer).
    Bit(u8, Phase),
    /// The short space closing the frame.
    Trailer,
}

impl TransmitState {
    /// Output level while in this state.
    fn level(self) -> Option<bool> {
        match self {
            TransmitState::Idle => None,
            TransmitState::Leader(phase) | TransmitState::Bit(_, phase) => {
                Some(phase == Phase::Mark)
            }
            TransmitState::Trailer => Some(false),
        }
    }
}

/// Control-context side: turns commands into frames waiting in the slot.
///
/// Remembers the last frame it requested so that
/// [`LogicalCommand::Repeat`] can send it again.
#[derive(Debug)]
pub struct AlpineRemote<'a> {
    pending: &'a PendingCommand,
    last_frame: Option<AlpineFrame>,
}

impl<'a> AlpineRemote<'a> {
    /// Creates a remote feeding `pending`.
    pub const fn new(pending: &'a PendingCommand) -> Self {
        Self {
            pending,
            last_frame: None,
        }
    }

    /// Requests transmission of `command` and returns immediately.
    ///
    /// Codebook commands are stored in the slot and remembered for repeats;
    /// `Repeat` stores the remembered frame again. A frame still waiting in the
    /// slot is replaced. A frame already on the wire is not disturbed.
    ///
    /// # Errors
    /// - [`TransmitError::NotTransmittable`] for [`LogicalCommand::Error`]
    /// - [`TransmitError::NothingToRepeat`] for a `Repeat` before any frame
    ///
    /// In both cases nothing is queued.
    pub fn request_transmit(&mut self, command: LogicalCommand) -> Result<(), TransmitError> {
        let frame = match command {
            LogicalCommand::Repeat => self.last_frame.ok_or(TransmitError::NothingToRepeat)?,
            other => AlpineFrame::for_command(other)
                .ok_or(TransmitError::NotTransmittable(other))?,
        };
        self.last_frame = Some(frame);
        if let Some(dropped) = self.pending.offer(frame) {
            debug!("replaced queued frame {:?}", dropped);
        }
        Ok(())
    }

    /// The frame a `Repeat` would send.
    pub fn last_frame(&self) -> Option<AlpineFrame> {
        self.last_frame
    }

    /// `true` while a requested frame has not been picked up by the transmitter.
    pub fn is_queued(&self) -> bool {
        !self.pending.is_empty()
    }
}

impl Transmit for AlpineRemote<'_> {
    fn transmit(&mut self, command: LogicalCommand) -> Result<(), TransmitError> {
        self.request_transmit(command)
    }
}

/// Interrupt side: emits pending frames on the Alpine output, one tick at a time.
///
/// ## Type Parameters
///
/// - `TX`: output pin driving the Alpine remote input (idle LOW)
/// - `STATUS`: optional indicator, HIGH while a frame is on the wire
///
/// ## Example
///
/// ```rust
/// # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
/// use sharan_alpine::command::LogicalCommand;
/// use sharan_alpine::encoder::{AlpineEncoder, AlpineRemote};
/// use sharan_alpine::pending::PendingCommand;
///
/// static PENDING: PendingCommand = PendingCommand::new();
///
/// # let tx_pin = Pin::new(&[PinTransaction::set(PinState::Low), PinTransaction::set(PinState::High)]);
/// let mut encoder: AlpineEncoder<'_, Pin, Pin> = AlpineEncoder::new(tx_pin, None, None, &PENDING);
/// let mut remote = AlpineRemote::new(&PENDING);
///
/// remote.request_transmit(LogicalCommand::VolumeUp).unwrap();
/// encoder.advance_tick(); // Called every 562.5 µs by the timer interrupt
/// assert!(encoder.is_busy());
/// # encoder.tx.done();
/// ```
#[derive(Debug)]
pub struct AlpineEncoder<'a, TX, STATUS>
where
    TX: OutputPin,
    STATUS: OutputPin,
{
    /// Alpine output pin
    pub tx: TX,
    /// Transmission indicator pin
    pub status: Option<STATUS>,
    status_inverted: bool,
    pending: &'a PendingCommand,
    /// Current position within the frame being sent.
    pub state: TransmitState,
    frame: AlpineFrame,
    /// Ticks left in the current mark or space, this one included.
    remaining: u8,

    /// Frames sent in full since start-up.
    pub frames_sent: u16,
}

impl<'a, TX, STATUS> AlpineEncoder<'a, TX, STATUS>
where
    TX: OutputPin,
    STATUS: OutputPin,
{
    /// Creates an idle encoder taking its frames from `pending`.
    ///
    /// # Arguments
    /// - `tx`: output pin to the head unit
    /// - `status`: optional indicator pin
    /// - `status_inverted`: whether the indicator is active LOW (default `false`)
    /// - `pending`: slot shared with the [`AlpineRemote`]
    ///
    /// # Notes
    /// TX is driven `LOW` initially, the indicator off.
    pub fn new(
        tx: TX,
        status: Option<STATUS>,
        status_inverted: Option<bool>,
        pending: &'a PendingCommand,
    ) -> Self {
        let mut encoder = Self {
            tx,
            status,
            status_inverted: status_inverted.unwrap_or(false),
            pending,
            state: TransmitState::Idle,
            frame: AlpineFrame(0),
            remaining: 0,
            frames_sent: 0,
        };
        encoder.write_tx(false);
        encoder.write_status(false);
        encoder
    }

    /// `true` from the first leader tick until the frame's trailer has elapsed.
    pub fn is_busy(&self) -> bool {
        self.state != TransmitState::Idle
    }

    /// Non-blocking check that everything requested so far has been sent.
    ///
    /// `WouldBlock` while a frame is on the wire or waiting in the slot.
    /// Use with `nb::block!` from a context that keeps ticking the encoder.
    pub fn poll_idle(&self) -> nb::Result<(), Infallible> {
        if self.is_busy() || !self.pending.is_empty() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }

    /// Advances the transmitter by one tick.
    ///
    /// Must be called at a fixed period of 562.5 µs (562 µs where the timer
    /// cannot do better), normally from a timer interrupt. Runs in bounded
    /// time: a comparison, a decrement and at most one pin write.
    pub fn advance_tick(&mut self) {
        if self.remaining > 1 {
            self.remaining -= 1;
            return;
        }

        let next = self.next_state();
        if next == self.state {
            return;
        }
        self.enter(next);
    }

    fn next_state(&mut self) -> TransmitState {
        match self.state {
            TransmitState::Idle => match self.pending.claim() {
                Some(frame) => {
                    self.frame = frame;
                    TransmitState::Leader(Phase::Mark)
                }
                None => TransmitState::Idle,
            },
            TransmitState::Leader(Phase::Mark) => TransmitState::Leader(Phase::Space),
            TransmitState::Leader(Phase::Space) => TransmitState::Bit(0, Phase::Mark),
            TransmitState::Bit(n, Phase::Mark) if n + 1 >= FRAME_BITS => TransmitState::Trailer,
            TransmitState::Bit(n, Phase::Mark) => TransmitState::Bit(n, Phase::Space),
            TransmitState::Bit(n, Phase::Space) => TransmitState::Bit(n + 1, Phase::Mark),
            TransmitState::Trailer => TransmitState::Idle,
        }
    }

    fn enter(&mut self, next: TransmitState) {
        match (self.state, next) {
            (TransmitState::Idle, _) => {
                trace!("sending {:?}", self.frame);
                self.write_status(true);
            }
            (_, TransmitState::Idle) => {
                self.frames_sent = self.frames_sent.wrapping_add(1);
                self.write_status(false);
            }
            _ => {}
        }

        self.remaining = match next {
            TransmitState::Idle => 0,
            TransmitState::Leader(Phase::Mark) => LEADER_MARK_TICKS,
            TransmitState::Leader(Phase::Space) => LEADER_SPACE_TICKS,
            TransmitState::Bit(_, Phase::Mark) => BIT_MARK_TICKS,
            TransmitState::Bit(n, Phase::Space) => {
                if self.frame.bit(n) {
                    ONE_SPACE_TICKS
                } else {
                    ZERO_SPACE_TICKS
                }
            }
            TransmitState::Trailer => TRAILER_TICKS,
        };
        if let Some(high) = next.level() {
            self.write_tx(high);
        }
        self.state = next;
    }

    fn write_tx(&mut self, high: bool) {
        // Nothing useful can be done about a failed write from interrupt context.
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
