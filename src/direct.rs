//! Dedicated push-button inputs that bypass the Sharan protocol.
//!
//! Up to four active-low inputs can each be wired to one command. The
//! receiver polls them while it waits for a Sharan start mark; the first
//! active input (in the order they were added) wins immediately.

use embedded_hal::digital::InputPin;
use heapless::Vec;
use thiserror::Error;

use crate::command::LogicalCommand;

/// Maximum number of direct inputs.
pub const MAX_DIRECT_INPUTS: usize = 4;

/// Something the receiver can poll for a command that needs no decoding.
pub trait DirectInputs {
    /// Returns the command of the highest-priority active input, if any.
    fn poll(&mut self) -> Option<LogicalCommand>;
}

/// No direct inputs: never yields a command.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoDirectInputs;

impl DirectInputs for NoDirectInputs {
    fn poll(&mut self) -> Option<LogicalCommand> {
        None
    }
}

/// Why an input could not be added to a [`DirectInputMux`].
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum DirectInputError {
    /// All [`MAX_DIRECT_INPUTS`] slots are taken.
    #[error("all direct inputs are in use")]
    Full,
    /// [`LogicalCommand::Error`] cannot be bound to an input.
    #[error("not a command")]
    NotACommand,
}

/// A fixed set of active-low inputs, polled in priority order.
#[derive(Debug)]
pub struct DirectInputMux<P: InputPin> {
    inputs: Vec<(P, LogicalCommand), MAX_DIRECT_INPUTS>,
}

impl<P: InputPin> Default for DirectInputMux<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: InputPin> DirectInputMux<P> {
    /// Creates a mux with no inputs.
    pub const fn new() -> Self {
        Self { inputs: Vec::new() }
    }

    /// Binds `pin` to `command`. Inputs added earlier take priority.
    pub fn add(&mut self, pin: P, command: LogicalCommand) -> Result<(), DirectInputError> {
        if command == LogicalCommand::Error {
            return Err(DirectInputError::NotACommand);
        }
        self.inputs
            .push((pin, command))
            .map_err(|_| DirectInputError::Full)
    }

    /// Number of bound inputs.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// `true` when no input is bound.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

impl<P: InputPin> DirectInputs for DirectInputMux<P> {
    fn poll(&mut self) -> Option<LogicalCommand> {
        // A pin that cannot be read counts as released.
        self.inputs
            .iter_mut()
            .find_map(|(pin, command)| pin.is_low().unwrap_or(false).then_some(*command))
    }
}
