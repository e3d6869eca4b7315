//! The one-frame mailbox between the control context and the timer interrupt.
//!
//! [`PendingCommand`] holds at most one [`AlpineFrame`]. The control context
//! [`offer`](PendingCommand::offer)s frames, the interrupt
//! [`claim`](PendingCommand::claim)s them when its transmitter is idle.
//! Offering over a frame that has not been claimed yet replaces it: the
//! newest request wins and the older one is never sent. There is no deeper
//! queue, so the control context never has to wait for the interrupt.
//!
//! Every access runs inside `critical_section::with`, so an offer can never
//! be torn by a claim from the interrupt and vice versa.

use core::cell::Cell;
use core::fmt;
use critical_section::Mutex;

use crate::command::AlpineFrame;

/// Single-slot, last-write-wins handoff of an [`AlpineFrame`].
///
/// `const`-constructible, so it can live in a `static` shared by `main` and
/// the timer interrupt:
///
/// ```rust
/// use sharan_alpine::pending::PendingCommand;
///
/// static PENDING: PendingCommand = PendingCommand::new();
/// ```
pub struct PendingCommand {
    slot: Mutex<Cell<Option<AlpineFrame>>>,
}

impl fmt::Debug for PendingCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let waiting = critical_section::with(|cs| self.slot.borrow(cs).get());
        f.debug_struct("PendingCommand")
            .field("waiting", &waiting)
            .finish()
    }
}

impl Default for PendingCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingCommand {
    /// Creates an empty slot.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    /// Stores `frame`, replacing whatever was still waiting.
    ///
    /// # Returns
    /// The frame that was dropped, if one had not been claimed yet.
    pub fn offer(&self, frame: AlpineFrame) -> Option<AlpineFrame> {
        critical_section::with(|cs| self.slot.borrow(cs).replace(Some(frame)))
    }

    /// Takes the waiting frame out of the slot, leaving it empty.
    pub fn claim(&self) -> Option<AlpineFrame> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }

    /// `true` when no frame is waiting.
    pub fn is_empty(&self) -> bool {
        critical_section::with(|cs| self.slot.borrow(cs).get().is_none())
    }
}
