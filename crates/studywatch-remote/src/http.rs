//! HTTP utilities for the focus service client.

use crate::error::RemoteError;

/// Extension trait for `reqwest::Response` to handle common error patterns.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Ensure the response status is successful, returning a
    /// [`RemoteError::Status`] carrying the status code and body if not.
    ///
    /// # Errors
    ///
    /// Returns an error if the response status is not successful (2xx).
    async fn ensure_success(self) -> Result<Self, RemoteError>
    where
        Self: Sized;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn ensure_success(self) -> Result<Self, RemoteError> {
        if !self.status().is_success() {
            let status = self.status().as_u16();
            let body = self.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }
        Ok(self)
    }
}
