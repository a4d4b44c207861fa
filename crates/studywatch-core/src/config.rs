use std::time::Duration;
use studywatch_storage::Settings;

use crate::classifier::DEFAULT_DISMISS_AFTER_MS;

/// Tunables for a live session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub poll_interval: Duration,
    pub warning_dismiss_ms: u64,
    /// Also send the plain `/start` and `/stop` pings
    pub legacy_pings: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            warning_dismiss_ms: DEFAULT_DISMISS_AFTER_MS,
            legacy_pings: true,
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            warning_dismiss_ms: settings.warning_dismiss_ms,
            legacy_pings: settings.legacy_pings,
        }
    }
}
