//! # sharan-alpine
//!
//! A portable, no_std Rust translator from the single-wire protocol of the VW Sharan
//! steering-wheel remote to the wired remote input of Alpine head units.
//!
//! The firmware this crate is built for sits between the two: it decodes the button
//! frames coming from the steering wheel and replays them as Alpine (NEC-style)
//! frames. It uses:
//! - `embedded-hal` traits for digital I/O and timing
//! - a blocking, window-based pulse decoder for reception
//! - interrupt-safe single-slot handoff with `critical-section`
//! - a tick-driven transmitter run from either a timer interrupt or a blocking delay
//!
//! ## Crate features
//! | Feature                | Description |
//! |------------------------|-------------|
//! | `std`                  | Disables `#![no_std]` support |
//! | `delay-loop` (default) | Blocking tick loop and `BlockingAlpineEncoder` on `embedded_hal::delay::DelayNs` |
//! | `timer-isr` (default)  | Global encoder helpers and macros using `critical_section::with` |
//! | `defmt-0-3`            | Uses `defmt` logging |
//! | `log`                  | Uses `log` logging |
//!
//! ## Software Features
//!
//! - **Sharan receiver**: start-mark detection, repeat markers, 32-bit frames LSB first,
//!   ±200 µs windows, wrap-safe microsecond arithmetic
//! - **Direct inputs**: up to four push buttons that bypass the protocol
//! - **Alpine transmitter**: 562.5 µs tick state machine that never cuts a frame short,
//!   fed through a last-write-wins slot so the control loop never waits
//! - **Blocking transmitter** for single-context firmware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sharan_alpine::{init_alpine_encoder, setup_alpine_encoder, tick_alpine_encoder};
//!
//! init_alpine_encoder!(AlpinePin, LedPin);
//!
//! #[interrupt]
//! fn TIM1_COMPA() {
//!     tick_alpine_encoder!(); // every 562.5 µs
//! }
//!
//! fn main() -> ! {
//!     setup_alpine_encoder!(alpine_pin, Some(led), None);
//!     let receiver = SharanReceiver::new(sharan_pin, timer, None);
//!     Bridge::new(receiver, AlpineRemote::new(&PENDING_COMMAND), NoDirectInputs).run()
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - The transmitter must be ticked at a steady 562.5 µs (562 µs is close enough)
//! - The receiver busy-waits; run it from the main loop, not from an interrupt
//! - Only one encoder instance should be active at a time in interrupt-driven mode
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub use critical_section;

#[macro_use]
mod fmt;

#[cfg(feature = "delay-loop")]
pub mod blocking;
pub mod bridge;
pub mod command;
pub mod consts;
pub mod direct;
pub mod encoder;
pub mod pending;
pub mod pulse;
pub mod receiver;
pub mod timer;

#[cfg(test)]
mod sim;
