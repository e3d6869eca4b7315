use crate::encoder::AlpineEncoder;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

/// Runs a blocking loop that repeatedly calls `advance_tick()` on the provided encoder.
///
/// This is a simple timing loop for use in environments where interrupts are unavailable
/// or undesired. It drives the encoder's timing using a delay provider implementing
/// `embedded_hal::delay::DelayNs`. The time spent in `advance_tick()` itself adds to
/// every tick, so `tick_us` should be trimmed on slow parts.
///
/// # Arguments
/// - `encoder`: A mutable reference to an `AlpineEncoder` instance.
/// - `delay`: A delay provider implementing `DelayNs`, typically from the HAL.
/// - `tick_us`: The delay between each tick call, in microseconds (normally
///   [`TICK_US_INTEGER`](super::TICK_US_INTEGER)).
///
/// # Example
/// ```rust,ignore
/// use sharan_alpine::timer::{TICK_US_INTEGER, run_tick_loop};
/// let mut encoder = AlpineEncoder::new(tx, None, None, &PENDING);
/// run_tick_loop(&mut encoder, &mut delay, TICK_US_INTEGER);
/// ```
///
/// # Notes
/// - This loop will never return; frames have to be requested from another context.
/// - For more efficient or concurrent applications, prefer interrupt-driven tick scheduling.
pub fn run_tick_loop<D: DelayNs, TX, STATUS>(
    encoder: &mut AlpineEncoder<'_, TX, STATUS>,
    delay: &mut D,
    tick_us: u32,
) -> !
where
    TX: OutputPin,
    STATUS: OutputPin,
{
    loop {
        encoder.advance_tick();
        delay.delay_us(tick_us);
    }
}

/// Ticks the encoder until every requested frame has been sent.
///
/// Lets single-context firmware request a frame and then push it out without
/// a timer interrupt.
///
/// # Returns
/// - The number of ticks it took
pub fn flush<D: DelayNs, TX, STATUS>(
    encoder: &mut AlpineEncoder<'_, TX, STATUS>,
    delay: &mut D,
    tick_us: u32,
) -> u32
where
    TX: OutputPin,
    STATUS: OutputPin,
{
    let mut ticks = 0_u32;
    while encoder.poll_idle().is_err() {
        encoder.advance_tick();
        delay.delay_us(tick_us);
        ticks = ticks.wrapping_add(1);
    }
    ticks
}
