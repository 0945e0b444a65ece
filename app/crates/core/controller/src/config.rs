//! Controller settings

use core::time::Duration;

use serde::Deserialize;

/// Default ticker period in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Main-thread settings, deserializable from a JS object
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Period of the elapsed-time ticker
    pub tick_interval_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ControllerConfig {
    /// Ticker period, at least one millisecond.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
