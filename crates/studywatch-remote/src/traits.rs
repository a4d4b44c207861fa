use async_trait::async_trait;

use crate::error::RemoteError;
use crate::types::TelemetrySample;

/// Remote focus service used by a live study session
#[async_trait]
pub trait SessionService: Send + Sync {
    /// Fetch the current focus telemetry
    ///
    /// Returns `Ok(None)` when the service answered but has no active session.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or the reply is malformed
    async fn fetch_stats(&self) -> Result<Option<TelemetrySample>, RemoteError>;

    /// Tell the service a session began; returns the session id it assigned, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or the reply is malformed
    async fn begin_session(&self, username: &str) -> Result<Option<String>, RemoteError>;

    /// Tell the service the session ended; returns the final focus score, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or the reply is malformed
    async fn end_session(&self) -> Result<Option<f64>, RemoteError>;

    /// Plain session-boundary ping (`POST /start`); the reply is ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent
    async fn ping_start(&self, username: &str) -> Result<(), RemoteError>;

    /// Plain session-boundary ping (`POST /stop`); the reply is ignored
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be sent
    async fn ping_stop(&self) -> Result<(), RemoteError>;
}
