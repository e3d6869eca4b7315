//! Constants used across the Sharan and Alpine protocol implementations.
//!
//! This module defines the timing windows of the Sharan single-wire protocol,
//! the tick budget of the Alpine (NEC-style) transmitter and the fixed
//! codebooks of both sides.
//!
//! ## Key Concepts
//!
//! - **Windows**: every Sharan pulse class is an inclusive `[min, max]` range in
//!   microseconds, ±200 µs around its nominal length. Windows never overlap.
//! - **Ticks**: the Alpine transmitter counts time in ticks of 562.5 µs; every
//!   pulse it emits is a whole number of ticks.
//! - **Codebooks**: each side knows exactly four 32-bit frames, one per
//!   transmittable command. Bits travel least significant first.

/// Lower bound of a Sharan `0` bit pulse (nominal 600 µs).
pub const ZERO_PULSE_MIN_US: u32 = 400;
/// Upper bound of a Sharan `0` bit pulse.
pub const ZERO_PULSE_MAX_US: u32 = 800;

/// Lower bound of a Sharan `1` bit pulse (nominal 1600 µs).
pub const ONE_PULSE_MIN_US: u32 = 1_400;
/// Upper bound of a Sharan `1` bit pulse.
pub const ONE_PULSE_MAX_US: u32 = 1_800;

/// Lower bound of the Sharan repeat marker (nominal 2200 µs HIGH).
pub const REPEAT_MARKER_MIN_US: u32 = 2_000;
/// Upper bound of the Sharan repeat marker.
pub const REPEAT_MARKER_MAX_US: u32 = 2_400;

/// Lower bound of the Sharan frame marker (nominal 4400 µs HIGH).
pub const FRAME_MARKER_MIN_US: u32 = 4_200;
/// Upper bound of the Sharan frame marker.
pub const FRAME_MARKER_MAX_US: u32 = 4_600;

/// Minimum LOW time that confirms a Sharan start mark.
pub const START_MARK_US: u32 = 8_000;

/// Timeout of a single pulse measurement, including the wait for the pulse to begin.
pub const PULSE_TIMEOUT_US: u32 = 1_000_000;

/// Timeout of the marker measurement that follows a confirmed start mark.
///
/// Counted from the moment the start mark is confirmed: room for the rest of
/// a start mark as long again, plus the longest marker. A line stuck LOW
/// gives up after this long instead of [`PULSE_TIMEOUT_US`].
pub const MARKER_TIMEOUT_US: u32 = START_MARK_US + FRAME_MARKER_MAX_US;

/// Cadence of a held button on the Sharan line: one command (or repeat) every 110 ms.
pub const COMMAND_INTERVAL_MS: u32 = 110;

/// Time already spent on the wire by a repeat sequence when its marker is decoded.
pub const REPEAT_SEQUENCE_MS: u32 = 11;

/// Extra wait after a decoded repeat marker, keeping the 110 ms cadence.
pub const REPEAT_HOLDOFF_MS: u32 = COMMAND_INTERVAL_MS - REPEAT_SEQUENCE_MS;

/// Number of data bits in a frame, on both sides.
pub const FRAME_BITS: u8 = 32;

/// Ticks of the Alpine leader mark (9 ms HIGH).
pub const LEADER_MARK_TICKS: u8 = 16;
/// Ticks of the Alpine leader space (4.5 ms LOW).
pub const LEADER_SPACE_TICKS: u8 = 8;
/// Ticks of every Alpine bit mark (562.5 µs HIGH).
pub const BIT_MARK_TICKS: u8 = 1;
/// Ticks of the space after a `0` bit.
pub const ZERO_SPACE_TICKS: u8 = 1;
/// Ticks of the space after a `1` bit.
pub const ONE_SPACE_TICKS: u8 = 3;
/// Ticks of the short space closing the frame, whatever the last bit is.
pub const TRAILER_TICKS: u8 = 1;

/// Blocking transmitter: leader mark.
pub const LEADER_MARK_US: u32 = 9_000;
/// Blocking transmitter: leader space of a full frame.
pub const LEADER_SPACE_US: u32 = 4_500;
/// Blocking transmitter: leader space of a NEC repeat code.
pub const REPEAT_SPACE_US: u32 = 2_250;
/// Blocking transmitter: every bit mark, and the repeat code's closing mark.
pub const BIT_MARK_US: u32 = 560;
/// Blocking transmitter: space after a `0` bit and the closing space.
pub const ZERO_SPACE_US: u32 = 560;
/// Blocking transmitter: space after a `1` bit.
pub const ONE_SPACE_US: u32 = 1_690;

/// Sharan frame for "volume up".
pub const SHARAN_VOLUME_UP: u32 = 0xFE01_1782;
/// Sharan frame for "volume down".
pub const SHARAN_VOLUME_DOWN: u32 = 0xFF00_1782;
/// Sharan frame for "next track".
pub const SHARAN_TRACK_UP: u32 = 0xF40B_1782;
/// Sharan frame for "previous track".
pub const SHARAN_TRACK_DOWN: u32 = 0xF50A_1782;

/// Alpine frame for "volume up".
pub const ALPINE_VOLUME_UP: u32 = 0xEB14_7286;
/// Alpine frame for "volume down".
pub const ALPINE_VOLUME_DOWN: u32 = 0xEA15_7286;
/// Alpine frame for "next track".
pub const ALPINE_TRACK_UP: u32 = 0xED12_7286;
/// Alpine frame for "previous track".
pub const ALPINE_TRACK_DOWN: u32 = 0xEC13_7286;
