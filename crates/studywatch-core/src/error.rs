use thiserror::Error;

use crate::controller::ControllerState;

/// Errors surfaced to callers of the session controller
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested action is not valid from the current state.
    /// Core state is left unchanged.
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: ControllerState,
        action: &'static str,
    },

    /// The local fallback store rejected the session record
    #[error("failed to persist session record: {0}")]
    Storage(#[source] anyhow::Error),
}
