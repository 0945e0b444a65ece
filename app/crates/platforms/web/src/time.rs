//! Browser clock and timer

use std::time::Duration;

use futures::future::LocalBoxFuture;
use types::{Clock, Timer};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Performance;

/// Monotonic clock over `performance.now()`, usable in windows and workers
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    /// Looks up `performance` on the current global object.
    pub fn new() -> Result<Self, JsValue> {
        let performance = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))?
            .dyn_into::<Performance>()?;
        Ok(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> Duration {
        Duration::try_from_secs_f64(self.performance.now() / 1000.0).unwrap_or_default()
    }
}

/// [`Timer`] over `setTimeout`
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
