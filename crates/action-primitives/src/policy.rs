use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Observation delays advertised by tools whose visible effect lags the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolTimings {
    /// Applied after scrolling an element that animates its scrolls
    pub smooth_scroll_delay_ms: u64,
    /// Applied after typing, for UIs that debounce input
    pub type_observation_delay_ms: u64,
}

impl ToolTimings {
    pub fn smooth_scroll_delay(&self) -> Duration {
        Duration::from_millis(self.smooth_scroll_delay_ms)
    }

    pub fn type_observation_delay(&self) -> Duration {
        Duration::from_millis(self.type_observation_delay_ms)
    }
}

impl Default for ToolTimings {
    fn default() -> Self {
        Self {
            smooth_scroll_delay_ms: 300,
            type_observation_delay_ms: 250,
        }
    }
}
