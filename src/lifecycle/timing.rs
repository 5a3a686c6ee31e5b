//! Timing parameters for start and stop.

use std::time::Duration;

/// Delays used by the lifecycle controller.
///
/// The stop path polls on a fixed tick under an absolute ceiling and never
/// consults the OS wait hint, which has been seen to report minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTiming {
    /// Lower clamp for the settle delay after a start command.
    pub settle_min: Duration,
    /// Upper clamp for the settle delay after a start command.
    pub settle_max: Duration,
    /// Tick between status polls while stopping.
    pub stop_poll_interval: Duration,
    /// Ceiling for the whole stop operation.
    pub stop_timeout: Duration,
}

impl Default for LifecycleTiming {
    fn default() -> Self {
        Self {
            settle_min: Duration::from_millis(1000),
            settle_max: Duration::from_millis(1500),
            stop_poll_interval: Duration::from_secs(1),
            stop_timeout: Duration::from_secs(15),
        }
    }
}

impl LifecycleTiming {
    /// Settle delay for a start command: a tenth of the wait hint, clamped.
    pub fn settle_delay(&self, wait_hint: Duration) -> Duration {
        (wait_hint / 10).max(self.settle_min).min(self.settle_max)
    }
}
