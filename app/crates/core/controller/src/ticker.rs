//! Cosmetic elapsed-time ticker
//!
//! Runs alongside a proof and rewrites the time label once per interval. It
//! never finishes on its own; the controller aborts it when the proof
//! reaches a terminal outcome.

use core::{cell::RefCell, time::Duration};

use types::{Clock, Timer};

use crate::view::View;

/// Renders elapsed time as `Elapsed time: {m}m {s}s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let minutes = secs.checked_div(60).unwrap_or(0);
    let seconds = secs.checked_rem(60).unwrap_or(0);
    format!("Elapsed time: {minutes}m {seconds}s")
}

/// Updates the time label every `interval` until dropped or aborted.
pub async fn tick_elapsed<V: View>(
    view: &RefCell<V>,
    clock: &dyn Clock,
    timer: &dyn Timer,
    start: Duration,
    interval: Duration,
) {
    loop {
        let text = format_elapsed(clock.now().saturating_sub(start));
        log::debug!("{text}");
        view.borrow_mut().set_time(&text);
        timer.sleep(interval).await;
    }
}
