//! Time sources for measuring proofs and driving the progress ticker
//!
//! Browser and native runtimes disagree on how to read a monotonic clock and
//! how to sleep, so both sides receive these through traits.

use core::time::Duration;

use futures::future::LocalBoxFuture;

/// Monotonic clock
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Asynchronous sleep
pub trait Timer {
    /// Resolves once `duration` has passed.
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Milliseconds between two clock readings, rounded to the nearest integer.
///
/// A reading that goes backwards yields zero.
pub fn elapsed_ms(start: Duration, end: Duration) -> u64 {
    let micros = end.saturating_sub(start).as_micros();
    let millis = micros.saturating_add(500).checked_div(1000).unwrap_or(0);
    u64::try_from(millis).unwrap_or(u64::MAX)
}
