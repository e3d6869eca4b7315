/// Declares the static globals shared by `main` and the timer interrupt.
///
/// This macro creates two `static` singletons: `PENDING_COMMAND`, the slot the
/// control side writes to, and `ALPINE_ENCODER`, the interrupt-side encoder
/// protected by a `critical_section` mutex.
///
/// # Arguments
/// - `$tx`: The concrete type of the Alpine output pin (must implement `OutputPin`)
/// - `$status`: The concrete type of the status pin (must implement `OutputPin`)
///
/// # Example
/// ```rust,ignore
/// init_alpine_encoder!(MyTxPinType, MyLedPinType);
/// ```
#[macro_export]
macro_rules! init_alpine_encoder {
    ( $tx:ty, $status:ty ) => {
        pub static PENDING_COMMAND: $crate::pending::PendingCommand =
            $crate::pending::PendingCommand::new();
        pub static ALPINE_ENCODER: $crate::timer::GlobalEncoder<$tx, $status> =
            $crate::timer::global_encoder_init::<$tx, $status>();
    };
}

/// Initializes `ALPINE_ENCODER` with a new encoder fed by `PENDING_COMMAND`.
///
/// # Arguments
/// - `$tx`: The Alpine output pin
/// - `$status`: The optional status pin (`None` or `Some(pin)`)
/// - `$status_inverted`: Whether the status pin is active LOW (`None`, `Some(bool)`)
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     setup_alpine_encoder!(tx, Some(led), None);
///     let mut remote = AlpineRemote::new(&PENDING_COMMAND);
/// }
/// ```
///
/// # Notes
/// - Requires `init_alpine_encoder!` to have been used earlier in the same module.
#[macro_export]
macro_rules! setup_alpine_encoder {
    ( $tx:expr, $status:expr, $status_inverted:expr ) => {
        $crate::timer::global_encoder_setup(
            &ALPINE_ENCODER,
            $tx,
            $status,
            $status_inverted,
            &PENDING_COMMAND,
        )
    };
}

/// Calls `advance_tick()` on the global `ALPINE_ENCODER` if it has been initialized.
///
/// This macro is intended to be invoked from a timer ISR firing every 562.5 µs.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM1_COMPA() {
///     tick_alpine_encoder!();
/// }
/// ```
///
/// # Notes
/// - This macro assumes `ALPINE_ENCODER` was declared with `init_alpine_encoder!`
///   and initialized via `setup_alpine_encoder!`.
/// - Safe to call before setup: it silently does nothing.
#[macro_export]
macro_rules! tick_alpine_encoder {
    () => {
        $crate::timer::global_encoder_tick(&ALPINE_ENCODER)
    };
}
