//! Logical commands and the 32-bit frames that carry them.
//!
//! [`LogicalCommand`] is the vocabulary shared by the receiver and the
//! transmitters. [`SharanFrame`] and [`AlpineFrame`] are the wire
//! representations on either side; the codebooks live in [`crate::consts`].

use crate::consts::{
    ALPINE_TRACK_DOWN, ALPINE_TRACK_UP, ALPINE_VOLUME_DOWN, ALPINE_VOLUME_UP, FRAME_BITS,
    SHARAN_TRACK_DOWN, SHARAN_TRACK_UP, SHARAN_VOLUME_DOWN, SHARAN_VOLUME_UP,
};

/// A steering-wheel command, independent of how it travels on the wire.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum LogicalCommand {
    /// Raise the volume.
    VolumeUp,
    /// Lower the volume.
    VolumeDown,
    /// Skip to the next track.
    TrackUp,
    /// Skip to the previous track.
    TrackDown,
    /// The button is still held: resend the previous command.
    Repeat,
    /// Nothing valid was decoded. Never transmitted.
    #[default]
    Error,
}

impl LogicalCommand {
    /// The four commands that own a frame in each codebook.
    pub const CODEBOOK: [LogicalCommand; 4] = [
        LogicalCommand::VolumeUp,
        LogicalCommand::VolumeDown,
        LogicalCommand::TrackUp,
        LogicalCommand::TrackDown,
    ];
}

/// A 32-bit pattern read off the Sharan line, first received bit in bit 0.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SharanFrame(pub u32);

impl SharanFrame {
    /// Returns the Sharan frame of a codebook command.
    pub const fn for_command(command: LogicalCommand) -> Option<Self> {
        match command {
            LogicalCommand::VolumeUp => Some(Self(SHARAN_VOLUME_UP)),
            LogicalCommand::VolumeDown => Some(Self(SHARAN_VOLUME_DOWN)),
            LogicalCommand::TrackUp => Some(Self(SHARAN_TRACK_UP)),
            LogicalCommand::TrackDown => Some(Self(SHARAN_TRACK_DOWN)),
            LogicalCommand::Repeat | LogicalCommand::Error => None,
        }
    }

    /// Looks the frame up in the Sharan codebook. Only exact matches count.
    pub const fn command(self) -> Option<LogicalCommand> {
        match self.0 {
            SHARAN_VOLUME_UP => Some(LogicalCommand::VolumeUp),
            SHARAN_VOLUME_DOWN => Some(LogicalCommand::VolumeDown),
            SHARAN_TRACK_UP => Some(LogicalCommand::TrackUp),
            SHARAN_TRACK_DOWN => Some(LogicalCommand::TrackDown),
            _ => None,
        }
    }
}

/// A 32-bit frame for the Alpine head unit, sent least significant bit first.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct AlpineFrame(pub u32);

impl AlpineFrame {
    /// Returns the Alpine frame of a codebook command.
    ///
    /// `Repeat` and `Error` have no frame of their own.
    pub const fn for_command(command: LogicalCommand) -> Option<Self> {
        match command {
            LogicalCommand::VolumeUp => Some(Self(ALPINE_VOLUME_UP)),
            LogicalCommand::VolumeDown => Some(Self(ALPINE_VOLUME_DOWN)),
            LogicalCommand::TrackUp => Some(Self(ALPINE_TRACK_UP)),
            LogicalCommand::TrackDown => Some(Self(ALPINE_TRACK_DOWN)),
            LogicalCommand::Repeat | LogicalCommand::Error => None,
        }
    }

    /// Value of bit `index`, in transmission order.
    ///
    /// Indices past the end of the frame read as `false`.
    pub const fn bit(self, index: u8) -> bool {
        index < FRAME_BITS && (self.0 >> index) & 1 != 0
    }
}
