use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Timeouts bounding one stability wait.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    /// Armed when the wait starts; bounds the whole wait
    pub global_timeout_ms: u64,
    /// Armed on entering main-thread idle; must not exceed the global timeout
    pub main_thread_timeout_ms: u64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            global_timeout_ms: 10_000,
            main_thread_timeout_ms: 5_000,
        }
    }
}

impl StabilityConfig {
    /// Clamps the main-thread timeout to the global one.
    pub fn normalized(mut self) -> Self {
        if self.main_thread_timeout_ms > self.global_timeout_ms {
            warn!(
                main_thread_timeout_ms = self.main_thread_timeout_ms,
                global_timeout_ms = self.global_timeout_ms,
                "main-thread timeout exceeds global timeout; clamping"
            );
            self.main_thread_timeout_ms = self.global_timeout_ms;
        }
        self
    }

    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    pub fn main_thread_timeout(&self) -> Duration {
        Duration::from_millis(self.main_thread_timeout_ms)
    }
}
