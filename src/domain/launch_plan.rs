//! Usage: Readiness polling schedule and acceptance rule for the analysis service launch.

use crate::settings::AppSettings;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub max_attempts: u32,
    pub poll_interval: Duration,
    pub handoff_delay: Duration,
}

impl LaunchPlan {
    pub(crate) fn from_settings(settings: &AppSettings) -> Self {
        Self {
            max_attempts: settings.ready_max_attempts.max(1),
            poll_interval: Duration::from_millis(settings.ready_poll_interval_ms),
            handoff_delay: Duration::from_millis(settings.handoff_delay_ms),
        }
    }

    /// Delay before the next readiness attempt, `None` once `attempt` (1-based)
    /// has exhausted the budget.
    pub(crate) fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.poll_interval)
        }
    }
}

/// Readiness accepts 2xx only; redirects, client and server errors all mean
/// "not ready yet".
pub(crate) fn is_ready_response(status: u16) -> bool {
    (200..300).contains(&status)
}
