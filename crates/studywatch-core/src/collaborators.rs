//! Seams between the session controller and the outside world.
//!
//! Everything here is fire-and-forget from the controller's point of view,
//! except persistence, whose failure is reported back to the caller.

use anyhow::Result;
use studywatch_storage::{Database, StoredSessionRecord};

use crate::classifier::WarningDirective;
use crate::controller::FocusMetrics;

/// Presentation layer for a live session
pub trait SessionDisplay: Send + Sync {
    /// Refresh the focus ring, streak and session timers
    fn show_metrics(&self, metrics: &FocusMetrics);

    /// Show (or replace) the distraction warning card
    fn show_warning(&self, warning: &WarningDirective);

    /// Hide the warning card if visible
    fn hide_warning(&self);

    /// Short-lived connectivity advisory
    fn connectivity_notice(&self, message: &str);
}

/// Local durable store for finished sessions
pub trait SessionStore: Send + Sync {
    /// Persist a finished session
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be written
    fn save_session(&self, record: &StoredSessionRecord) -> Result<()>;

    /// Seconds already recorded for `username` on `date`
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read
    fn total_duration_secs_for_date(&self, date: &str, username: &str) -> Result<u64>;
}

/// Tells the student their session is complete
pub trait CompletionNotifier: Send + Sync {
    fn session_complete(&self, duration: &str, focus_score: Option<f64>);
}

/// Evaluates achievement unlocks after a session is saved
pub trait AchievementChecker: Send + Sync {
    fn check_achievements(&self, username: &str);
}

impl SessionStore for Database {
    fn save_session(&self, record: &StoredSessionRecord) -> Result<()> {
        Self::save_session(self, record)
    }

    fn total_duration_secs_for_date(&self, date: &str, username: &str) -> Result<u64> {
        Self::total_duration_secs_for_date(self, date, Some(username))
    }
}
