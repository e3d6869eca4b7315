//! The control loop tying the Sharan receiver to the Alpine transmitter.
//!
//! ```rust,ignore
//! init_alpine_encoder!(AlpinePin, LedPin);
//!
//! fn main() -> ! {
//!     wink_hello(&mut led, &mut delay).ok();
//!     setup_alpine_encoder!(alpine_pin, Some(led), None);
//!     // start a 562.5 µs timer interrupt calling `tick_alpine_encoder!()`
//!
//!     let receiver = SharanReceiver::new(sharan_pin, timer, None);
//!     let remote = AlpineRemote::new(&PENDING_COMMAND);
//!     Bridge::new(receiver, remote, NoDirectInputs).run()
//! }
//! ```
//!
//! Without a timer interrupt, hand the bridge a
//! [`BlockingAlpineEncoder`](crate::blocking::BlockingAlpineEncoder) instead of
//! an `AlpineRemote`; each `step` then returns once the frame is on the wire.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::command::LogicalCommand;
use crate::direct::DirectInputs;
use crate::encoder::Transmit;
use crate::pulse::PulseTimer;
use crate::receiver::SharanReceiver;

/// Blink period of [`wink_hello`].
const WINK_MS: u32 = 100;

/// Forwards every command received from the Sharan line (or a direct input)
/// to the Alpine transmitter.
#[derive(Debug)]
pub struct Bridge<RX, T, D, TR>
where
    RX: InputPin,
    T: PulseTimer,
    D: DirectInputs,
    TR: Transmit,
{
    /// Sharan side
    pub receiver: SharanReceiver<RX, T>,
    /// Alpine side
    pub remote: TR,
    /// Dedicated buttons, polled while the Sharan line is idle
    pub direct: D,
}

impl<RX, T, D, TR> Bridge<RX, T, D, TR>
where
    RX: InputPin,
    T: PulseTimer,
    D: DirectInputs,
    TR: Transmit,
{
    /// Wires a receiver and a transmitter together.
    pub fn new(receiver: SharanReceiver<RX, T>, remote: TR, direct: D) -> Self {
        Self {
            receiver,
            remote,
            direct,
        }
    }

    /// Waits for one command and hands it to the transmitter.
    ///
    /// A command the remote refuses (a direct `Repeat` with nothing sent yet)
    /// is logged and otherwise ignored.
    ///
    /// # Returns
    /// The command that was received.
    pub fn step(&mut self) -> LogicalCommand {
        let command = self.receiver.receive_with(&mut self.direct);
        if let Err(err) = self.remote.transmit(command) {
            warn!("not forwarded: {:?}", err);
        }
        command
    }

    /// Forwards commands forever.
    pub fn run(mut self) -> ! {
        info!("forwarding Sharan commands");
        loop {
            let _ = self.step();
        }
    }
}

/// Blinks `led` twice, 100 ms on and 100 ms off, as a start-up sign of life.
///
/// # Errors
/// The first pin error, if any.
pub fn wink_hello<P: OutputPin, DL: DelayNs>(led: &mut P, delay: &mut DL) -> Result<(), P::Error> {
    for _ in 0..2 {
        led.set_high()?;
        delay.delay_ms(WINK_MS);
        led.set_low()?;
        delay.delay_ms(WINK_MS);
    }
    Ok(())
}
