//! Session clock: active-time accounting across pause/resume cycles.
//!
//! The clock never reads the system time itself. Every operation takes the
//! current instant as epoch milliseconds, which keeps the arithmetic pure and
//! lets the controller (or a test) decide what "now" is.
//!
//! ```text
//! Running --pause--> Paused --resume--> Running
//!    \                  |
//!     +------stop-------+-----> Stopped (terminal)
//! ```

use serde::{Deserialize, Serialize};

/// Status of a started session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Paused,
    Stopped,
}

/// Rejected clock operation; the clock is left untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTransitionError {
    pub status: SessionStatus,
    pub action: &'static str,
}

/// Elapsed-time accounting for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClock {
    started_at_epoch_ms: u64,
    total_paused_ms: u64,
    /// Start of the open pause interval, only set while paused
    paused_at_epoch_ms: Option<u64>,
    status: SessionStatus,
    /// Active time captured at stop
    frozen_active_ms: Option<u64>,
}

impl SessionClock {
    /// Start a clock running at `now_ms`
    #[must_use]
    pub const fn start(now_ms: u64) -> Self {
        Self {
            started_at_epoch_ms: now_ms,
            total_paused_ms: 0,
            paused_at_epoch_ms: None,
            status: SessionStatus::Running,
            frozen_active_ms: None,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn started_at_epoch_ms(&self) -> u64 {
        self.started_at_epoch_ms
    }

    #[must_use]
    pub const fn total_paused_ms(&self) -> u64 {
        self.total_paused_ms
    }

    /// Active time at `now_ms`.
    ///
    /// While paused the open interval is excluded by measuring up to the
    /// pause instant instead of `now_ms`; after stop the frozen value is
    /// returned.
    #[must_use]
    pub fn elapsed_active_ms(&self, now_ms: u64) -> u64 {
        if let Some(frozen) = self.frozen_active_ms {
            return frozen;
        }
        let until = self.paused_at_epoch_ms.unwrap_or(now_ms);
        until
            .saturating_sub(self.started_at_epoch_ms)
            .saturating_sub(self.total_paused_ms)
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Pause a running clock
    ///
    /// # Errors
    ///
    /// Returns an error unless the clock is running
    pub fn pause(&mut self, now_ms: u64) -> Result<(), ClockTransitionError> {
        if self.status != SessionStatus::Running {
            return Err(self.rejected("pause"));
        }
        self.paused_at_epoch_ms = Some(now_ms.max(self.started_at_epoch_ms));
        self.status = SessionStatus::Paused;
        Ok(())
    }

    /// Resume a paused clock, folding the pause interval into the paused total
    ///
    /// # Errors
    ///
    /// Returns an error unless the clock is paused
    pub fn resume(&mut self, now_ms: u64) -> Result<(), ClockTransitionError> {
        let Some(paused_at) = self.paused_at_epoch_ms.filter(|_| self.status == SessionStatus::Paused)
        else {
            return Err(self.rejected("resume"));
        };
        self.total_paused_ms += now_ms.saturating_sub(paused_at);
        self.paused_at_epoch_ms = None;
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// Stop the clock and return the active duration as `MM:SS`.
    ///
    /// Calling again after the first stop returns the same frozen value.
    pub fn stop(&mut self, now_ms: u64) -> String {
        let active_ms = match self.frozen_active_ms {
            Some(frozen) => frozen,
            None => {
                let active = self.elapsed_active_ms(now_ms);
                self.frozen_active_ms = Some(active);
                self.status = SessionStatus::Stopped;
                active
            }
        };
        format_duration(active_ms)
    }

    const fn rejected(&self, action: &'static str) -> ClockTransitionError {
        ClockTransitionError {
            status: self.status,
            action,
        }
    }
}

/// Format milliseconds as `MM:SS`; minutes are not wrapped into hours
#[must_use]
pub fn format_duration(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
