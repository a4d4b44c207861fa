//! Session lifecycle controller.
//!
//! A single owner of all live-session state. Poll results, remote replies
//! and warning timer firings arrive as [`ControllerEvent`]s on one channel
//! and are handled one at a time; each carries the generation or token it
//! was scheduled under so that anything scheduled before a pause or stop is
//! dropped instead of acted on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone, Utc};
use studywatch_remote::{RemoteError, SessionService, TelemetrySample};
use studywatch_storage::StoredSessionRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::classifier::{DistractionClassifier, WarningDirective};
use crate::clock::{format_duration, SessionClock};
use crate::collaborators::{AchievementChecker, CompletionNotifier, SessionDisplay, SessionStore};
use crate::config::ControllerConfig;
use crate::error::SessionError;
use crate::poller::TelemetryPoller;

const CONNECTION_ERROR_NOTICE: &str = "Connection error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Running,
    Paused,
    Stopped,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// The live session
#[derive(Debug, Clone)]
pub struct Session {
    id: Option<String>,
    username: String,
    clock: SessionClock,
}

impl Session {
    /// Remote session id, once the service has assigned one
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub const fn clock(&self) -> &SessionClock {
        &self.clock
    }
}

/// Figures shown alongside every telemetry sample
#[derive(Debug, Clone, PartialEq)]
pub struct FocusMetrics {
    /// Rounded to a whole number
    pub focus_score: f64,
    pub focused_streak_mins: u64,
    /// Active session time as `MM:SS`
    pub session_time: String,
    /// Earlier sessions today plus this one
    pub today_total_ms: u64,
}

impl FocusMetrics {
    fn from_sample(sample: &TelemetrySample, active_ms: u64, prior_today_ms: u64) -> Self {
        Self {
            focus_score: sample.focus_score.round(),
            focused_streak_mins: sample.focused_ms / 60_000,
            session_time: format_duration(active_ms),
            today_total_ms: prior_today_ms.saturating_add(active_ms),
        }
    }
}

/// Outcome of stopping a session
#[derive(Debug, Clone, PartialEq)]
pub struct StoppedSession {
    pub record: StoredSessionRecord,
    pub active_ms: u64,
    /// Whether the focus service acknowledged the stop
    pub remote_confirmed: bool,
}

/// External collaborators of the controller
pub struct Collaborators {
    pub service: Arc<dyn SessionService>,
    pub store: Arc<dyn SessionStore>,
    pub display: Arc<dyn SessionDisplay>,
    pub notifier: Arc<dyn CompletionNotifier>,
    pub achievements: Arc<dyn AchievementChecker>,
}

/// Something that happened off the controller task
#[derive(Debug)]
pub enum ControllerEvent {
    Telemetry {
        generation: u64,
        sample: TelemetrySample,
    },
    PollFailed {
        generation: u64,
        error: RemoteError,
    },
    SessionLinked {
        result: Result<Option<String>, RemoteError>,
    },
    WarningExpired {
        token: u64,
    },
}

/// User commands for [`SessionController::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Start { username: String },
    Pause,
    Resume,
    /// Pause when running, resume when paused
    TogglePause,
    Stop,
}

/// Auto-dismiss timer for the warning card.
///
/// Every arm or cancel moves to a new token; a firing only counts if its
/// token is still current.
#[derive(Debug, Default)]
struct WarningTimer {
    token: u64,
    handle: Option<JoinHandle<()>>,
}

impl WarningTimer {
    fn arm(&mut self, after: Duration, events: &mpsc::UnboundedSender<ControllerEvent>) {
        self.cancel();
        let token = self.token;
        let events = events.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(ControllerEvent::WarningExpired { token });
        }));
    }

    fn cancel(&mut self) {
        self.token += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.handle.is_some() && token == self.token
    }

    fn fired(&mut self) {
        self.handle = None;
    }

    const fn is_armed(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for WarningTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct SessionController {
    config: ControllerConfig,
    classifier: DistractionClassifier,
    service: Arc<dyn SessionService>,
    store: Arc<dyn SessionStore>,
    display: Arc<dyn SessionDisplay>,
    notifier: Arc<dyn CompletionNotifier>,
    achievements: Arc<dyn AchievementChecker>,
    poller: TelemetryPoller,
    warning_timer: WarningTimer,
    events_tx: mpsc::UnboundedSender<ControllerEvent>,
    events_rx: mpsc::UnboundedReceiver<ControllerEvent>,
    state: ControllerState,
    session: Option<Session>,
    prior_today_ms: u64,
    /// Pending or written stop result
    stopped: Option<StoppedSession>,
    /// Whether `stopped` has reached the store
    persisted: bool,
}

impl SessionController {
    #[must_use]
    pub fn new(config: ControllerConfig, collaborators: Collaborators) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            classifier: DistractionClassifier::new(config.warning_dismiss_ms),
            poller: TelemetryPoller::new(Arc::clone(&collaborators.service)),
            service: collaborators.service,
            store: collaborators.store,
            display: collaborators.display,
            notifier: collaborators.notifier,
            achievements: collaborators.achievements,
            warning_timer: WarningTimer::default(),
            events_tx,
            events_rx,
            state: ControllerState::Idle,
            session: None,
            prior_today_ms: 0,
            stopped: None,
            persisted: false,
            config,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub const fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Whether a warning is waiting to be auto-dismissed
    #[must_use]
    pub const fn has_pending_dismiss(&self) -> bool {
        self.warning_timer.is_armed()
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Start a session for `username`.
    ///
    /// The remote session id is requested in the background; if the call
    /// fails the session simply runs without one.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the controller is idle.
    pub fn on_start(&mut self, username: &str, now_ms: u64) -> Result<(), SessionError> {
        if self.state != ControllerState::Idle {
            return Err(self.invalid("start"));
        }

        self.prior_today_ms = match self
            .store
            .total_duration_secs_for_date(&local_date(now_ms), username)
        {
            Ok(secs) => secs.saturating_mul(1000),
            Err(e) => {
                log::warn!("Could not read today's total for {username}: {e}");
                0
            }
        };

        self.session = Some(Session {
            id: None,
            username: username.to_string(),
            clock: SessionClock::start(now_ms),
        });
        self.state = ControllerState::Running;
        self.start_polling();

        let service = Arc::clone(&self.service);
        let events = self.events_tx.clone();
        let user = username.to_string();
        tokio::spawn(async move {
            let result = service.begin_session(&user).await;
            let _ = events.send(ControllerEvent::SessionLinked { result });
        });

        if self.config.legacy_pings {
            let service = Arc::clone(&self.service);
            let user = username.to_string();
            tokio::spawn(async move {
                if let Err(e) = service.ping_start(&user).await {
                    log::debug!("Start ping failed: {e}");
                }
            });
        }

        log::info!("Study session started for {username}");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless a session is running.
    pub fn on_pause(&mut self, now_ms: u64) -> Result<(), SessionError> {
        if self.state != ControllerState::Running {
            return Err(self.invalid("pause"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("pause"));
        };
        if let Err(e) = session.clock.pause(now_ms) {
            log::warn!("Clock refused to {} while {:?}", e.action, e.status);
            return Err(self.invalid("pause"));
        }

        self.poller.stop();
        self.warning_timer.cancel();
        self.display.hide_warning();
        self.state = ControllerState::Paused;
        log::info!("Study session paused");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is paused.
    pub fn on_resume(&mut self, now_ms: u64) -> Result<(), SessionError> {
        if self.state != ControllerState::Paused {
            return Err(self.invalid("resume"));
        }
        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("resume"));
        };
        if let Err(e) = session.clock.resume(now_ms) {
            log::warn!("Clock refused to {} while {:?}", e.action, e.status);
            return Err(self.invalid("resume"));
        }

        self.state = ControllerState::Running;
        self.start_polling();
        log::info!("Study session resumed");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is
    /// running or paused.
    pub fn toggle_pause(&mut self, now_ms: u64) -> Result<(), SessionError> {
        match self.state {
            ControllerState::Running => self.on_pause(now_ms),
            ControllerState::Paused => self.on_resume(now_ms),
            ControllerState::Idle | ControllerState::Stopped => Err(self.invalid("toggle pause")),
        }
    }

    /// Show metrics for a sample, and raise or clear the distraction warning.
    /// Ignored unless the session is running.
    pub fn on_telemetry_sample(&mut self, sample: &TelemetrySample, now_ms: u64) {
        if self.state != ControllerState::Running {
            log::debug!("Ignoring telemetry sample while {}", self.state);
            return;
        }
        let Some(session) = &self.session else {
            return;
        };

        let active_ms = session.clock.elapsed_active_ms(now_ms);
        let metrics = FocusMetrics::from_sample(sample, active_ms, self.prior_today_ms);
        self.display.show_metrics(&metrics);

        if sample.is_distracted {
            let warning = self.classifier.classify(sample.activity, sample.severity);
            log::debug!(
                "Distraction: {} at severity {:.2}",
                sample.activity,
                sample.severity
            );
            self.show_warning(&warning);
        } else {
            self.warning_timer.cancel();
            self.display.hide_warning();
        }
    }

    /// Stop the session and record it locally.
    ///
    /// The record is written whether or not the focus service acknowledges
    /// the stop; without an acknowledgement it carries no focus score.
    /// The fallback record exists before the service is asked, so a stop
    /// that is abandoned mid-call is completed by the next `on_stop`.
    /// Once written, stopping again returns the same result without writing
    /// another record.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] if no session was started,
    /// or [`SessionError::Storage`] if the record could not be written.
    pub async fn on_stop(&mut self, now_ms: u64) -> Result<StoppedSession, SessionError> {
        if self.state == ControllerState::Stopped {
            return self.finish_stop();
        }
        if !matches!(
            self.state,
            ControllerState::Running | ControllerState::Paused
        ) {
            return Err(self.invalid("stop"));
        }

        self.poller.stop();
        self.warning_timer.cancel();
        self.drain_pending_links();

        let Some(session) = self.session.as_mut() else {
            return Err(self.invalid("stop"));
        };
        let duration = session.clock.stop(now_ms);
        let active_ms = session.clock.elapsed_active_ms(now_ms);
        let record = StoredSessionRecord::new(
            session.id.clone(),
            local_date(now_ms),
            duration,
            session.username.clone(),
            None,
        );
        self.state = ControllerState::Stopped;
        self.stopped = Some(StoppedSession {
            record,
            active_ms,
            remote_confirmed: false,
        });

        let service = Arc::clone(&self.service);
        match service.end_session().await {
            Ok(score) => {
                if let Some(stopped) = self.stopped.as_mut() {
                    stopped.record.focus_score = score;
                    stopped.remote_confirmed = true;
                }
            }
            Err(e) => log::warn!("End-session call failed, saving without a focus score: {e}"),
        }

        if self.config.legacy_pings {
            tokio::spawn(async move {
                if let Err(e) = service.ping_stop().await {
                    log::debug!("Stop ping failed: {e}");
                }
            });
        }

        self.finish_stop()
    }

    /// Write the stop record if it has not been written yet
    fn finish_stop(&mut self) -> Result<StoppedSession, SessionError> {
        if let Some(stopped) = self.stopped.as_ref().filter(|_| self.persisted) {
            log::debug!("Session already stopped");
            return Ok(stopped.clone());
        }

        // A begin-session reply may have landed while the service was asked to stop
        self.drain_pending_links();
        let session_id = self.session.as_ref().and_then(|s| s.id.clone());
        let Some(stopped) = self.stopped.as_mut() else {
            return Err(self.invalid("stop"));
        };
        if stopped.record.session_id.is_none() {
            stopped.record.session_id = session_id;
        }
        let stopped = stopped.clone();

        if let Err(e) = self.store.save_session(&stopped.record) {
            log::error!("Failed to save session record: {e}");
            return Err(SessionError::Storage(e));
        }
        self.persisted = true;

        if stopped.remote_confirmed {
            self.notifier
                .session_complete(&stopped.record.duration, stopped.record.focus_score);
            self.achievements
                .check_achievements(&stopped.record.username);
        }

        log::info!(
            "Study session stopped after {} (focus score: {})",
            stopped.record.duration,
            stopped
                .record
                .focus_score
                .map_or_else(|| "none".to_string(), |s| format!("{s:.1}"))
        );
        Ok(stopped)
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Take a queued event without waiting
    pub fn try_next_event(&mut self) -> Option<ControllerEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Apply an event, dropping it if it belongs to a stopped poll
    /// generation or a superseded warning timer.
    pub fn handle_event(&mut self, event: ControllerEvent, now_ms: u64) {
        match event {
            ControllerEvent::Telemetry { generation, sample } => {
                if self.is_stale(generation) {
                    log::debug!("Dropping sample from stale poll generation {generation}");
                    return;
                }
                self.on_telemetry_sample(&sample, now_ms);
            }
            ControllerEvent::PollFailed { generation, error } => {
                if self.is_stale(generation) {
                    log::debug!("Dropping poll error from stale generation {generation}");
                    return;
                }
                self.on_poll_error(&error);
            }
            ControllerEvent::SessionLinked { result } => self.on_session_linked(result),
            ControllerEvent::WarningExpired { token } => {
                if self.warning_timer.is_current(token) {
                    self.warning_timer.fired();
                    self.display.hide_warning();
                } else {
                    log::debug!("Ignoring superseded warning timer {token}");
                }
            }
        }
    }

    /// Drive the controller from user intents until the session stops.
    ///
    /// A closed intent channel counts as a stop.
    ///
    /// # Errors
    ///
    /// Returns the error from the final stop.
    pub async fn run(
        mut self,
        mut intents: mpsc::Receiver<Intent>,
    ) -> Result<StoppedSession, SessionError> {
        enum Wake {
            Intent(Option<Intent>),
            Event(Option<ControllerEvent>),
        }

        loop {
            let wake = tokio::select! {
                intent = intents.recv() => Wake::Intent(intent),
                event = self.events_rx.recv() => Wake::Event(event),
            };
            let now_ms = epoch_ms_now();

            match wake {
                Wake::Intent(None | Some(Intent::Stop)) => return self.on_stop(now_ms).await,
                Wake::Intent(Some(intent)) => {
                    if let Err(e) = self.apply(intent, now_ms) {
                        log::warn!("{e}");
                    }
                }
                Wake::Event(Some(event)) => self.handle_event(event, now_ms),
                Wake::Event(None) => {}
            }
        }
    }

    fn apply(&mut self, intent: Intent, now_ms: u64) -> Result<(), SessionError> {
        match intent {
            Intent::Start { username } => self.on_start(&username, now_ms),
            Intent::Pause => self.on_pause(now_ms),
            Intent::Resume => self.on_resume(now_ms),
            Intent::TogglePause => self.toggle_pause(now_ms),
            Intent::Stop => Ok(()),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn start_polling(&mut self) {
        let samples = self.events_tx.clone();
        let errors = self.events_tx.clone();
        self.poller.start(
            self.config.poll_interval,
            move |generation, sample| {
                let _ = samples.send(ControllerEvent::Telemetry { generation, sample });
            },
            move |generation, error| {
                let _ = errors.send(ControllerEvent::PollFailed { generation, error });
            },
        );
    }

    fn show_warning(&mut self, warning: &WarningDirective) {
        self.display.show_warning(warning);
        if warning.auto_dismiss {
            self.warning_timer.arm(
                Duration::from_millis(warning.dismiss_after_ms),
                &self.events_tx,
            );
        } else {
            self.warning_timer.cancel();
        }
    }

    fn on_poll_error(&self, error: &RemoteError) {
        if error.is_transport() {
            log::warn!("Focus service unreachable: {error}");
            self.display.connectivity_notice(CONNECTION_ERROR_NOTICE);
        } else {
            log::warn!("Ignoring bad telemetry response: {error}");
        }
    }

    fn on_session_linked(&mut self, result: Result<Option<String>, RemoteError>) {
        if self.persisted {
            log::debug!("Begin-session reply arrived after the session was saved; ignoring");
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match result {
            Ok(Some(id)) => {
                log::info!("Linked to remote session {id}");
                session.id = Some(id);
            }
            Ok(None) => log::warn!("Focus service did not return a session id"),
            Err(e) => log::warn!("Begin-session call failed, continuing without an id: {e}"),
        }
    }

    /// Apply any begin-session reply that is already queued; everything
    /// else in the queue is stale once the session stops.
    fn drain_pending_links(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            if let ControllerEvent::SessionLinked { result } = event {
                self.on_session_linked(result);
            }
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        !self.poller.is_active() || generation != self.poller.generation()
    }

    const fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            state: self.state,
            action,
        }
    }
}

/// Current wall-clock time in epoch milliseconds
#[must_use]
pub fn epoch_ms_now() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

/// Local calendar date (`YYYY-MM-DD`) of an epoch-millisecond instant
#[must_use]
pub fn local_date(epoch_ms: u64) -> String {
    i64::try_from(epoch_ms)
        .ok()
        .and_then(|ms| Local.timestamp_millis_opt(ms).single())
        .unwrap_or_else(Local::now)
        .format("%Y-%m-%d")
        .to_string()
}
