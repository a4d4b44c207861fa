//! Live study-session monitoring: session clock, telemetry polling,
//! distraction warnings and the controller that ties them together.

pub mod classifier;
pub mod clock;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod error;
pub mod poller;

pub use classifier::{BackgroundTier, DistractionClassifier, WarningDirective};
pub use clock::{format_duration, SessionClock, SessionStatus};
pub use collaborators::{AchievementChecker, CompletionNotifier, SessionDisplay, SessionStore};
pub use config::ControllerConfig;
pub use controller::{
    epoch_ms_now, local_date, Collaborators, ControllerEvent, ControllerState, FocusMetrics,
    Intent, Session, SessionController, StoppedSession,
};
pub use error::SessionError;
pub use poller::TelemetryPoller;
pub use studywatch_remote::{ActivityKind, TelemetrySample};
