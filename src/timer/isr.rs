use crate::encoder::AlpineEncoder;
use crate::pending::PendingCommand;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// The global slot holding the interrupt-side encoder.
pub type GlobalEncoder<TX, STATUS> = Mutex<RefCell<Option<AlpineEncoder<'static, TX, STATUS>>>>;

/// Used to initialize the global static `AlpineEncoder` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use sharan_alpine::timer::{GlobalEncoder, global_encoder_init};
/// use some_hal::{PD3, PB5};
///
/// static ENCODER: GlobalEncoder<PD3, PB5> = global_encoder_init::<PD3, PB5>();
/// ```
pub const fn global_encoder_init<TX: OutputPin, STATUS: OutputPin>() -> GlobalEncoder<TX, STATUS>
{
    Mutex::new(RefCell::new(None))
}

/// Builds the encoder and moves it into the global slot.
///
/// # Arguments
/// * The global static `AlpineEncoder`
/// * The Alpine output pin
/// * The optional status pin, and whether it is active LOW
/// * The static slot shared with the control side's `AlpineRemote`
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     global_encoder_setup(&ENCODER, tx, Some(led), None, &PENDING);
///     let mut remote = AlpineRemote::new(&PENDING);
/// }
/// ```
pub fn global_encoder_setup<TX: OutputPin, STATUS: OutputPin>(
    global_encoder: &'static GlobalEncoder<TX, STATUS>,
    tx: TX,
    status: Option<STATUS>,
    status_inverted: Option<bool>,
    pending: &'static PendingCommand,
) {
    critical_section::with(|cs| {
        let _ = global_encoder.borrow(cs).replace(Some(AlpineEncoder::new(
            tx,
            status,
            status_inverted,
            pending,
        )));
    });
}

/// Runs the tick at each interrupt
///
/// Does nothing until [`global_encoder_setup`] has run.
///
/// # Arguments
/// * The global static `AlpineEncoder`
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM2() {
///     global_encoder_tick(&ENCODER);
/// }
/// ```
pub fn global_encoder_tick<TX: OutputPin, STATUS: OutputPin>(
    global_encoder: &'static GlobalEncoder<TX, STATUS>,
) {
    critical_section::with(|cs| {
        if let Some(encoder) = global_encoder.borrow(cs).borrow_mut().as_mut() {
            encoder.advance_tick();
        }
    });
}

/// Runs `f` on the global encoder inside a critical section.
///
/// # Returns
/// * `None` if the encoder has not been set up yet
pub fn global_encoder_with<TX: OutputPin, STATUS: OutputPin, R>(
    global_encoder: &'static GlobalEncoder<TX, STATUS>,
    f: impl FnOnce(&mut AlpineEncoder<'static, TX, STATUS>) -> R,
) -> Option<R> {
    critical_section::with(|cs| global_encoder.borrow(cs).borrow_mut().as_mut().map(f))
}
