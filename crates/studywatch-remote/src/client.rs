use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use crate::error::RemoteError;
use crate::http::ResponseExt;
use crate::traits::SessionService;
use crate::types::{
    parse_stats_body, StartRequest, StartSessionResponse, StopSessionResponse, TelemetrySample,
};

/// Empty JSON object body
#[derive(Serialize)]
struct EmptyBody {}

/// HTTP client for the focus service
pub struct FocusServiceClient {
    base_url: String,
    client: reqwest::Client,
}

impl FocusServiceClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Service root, e.g. `http://10.0.2.2:3000`
    /// * `timeout` - Per-request timeout applied to every call
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        // Remove trailing slash if present
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<String, RemoteError> {
        let url = self.build_url(path);
        log::debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await?
            .ensure_success()
            .await?;

        Ok(response.text().await?)
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        let text = self.post(path, body).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl SessionService for FocusServiceClient {
    async fn fetch_stats(&self) -> Result<Option<TelemetrySample>, RemoteError> {
        let url = self.build_url("/session/stats");
        log::debug!("GET {url}");

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .ensure_success()
            .await?
            .text()
            .await?;

        parse_stats_body(&body)
    }

    async fn begin_session(&self, username: &str) -> Result<Option<String>, RemoteError> {
        let response: StartSessionResponse = self
            .post_json("/session/start", &StartRequest { username })
            .await?;
        Ok(response.session_id.filter(|id| !id.is_empty()))
    }

    async fn end_session(&self) -> Result<Option<f64>, RemoteError> {
        let response: StopSessionResponse = self.post_json("/session/stop", &EmptyBody {}).await?;
        Ok(response.focus_score)
    }

    async fn ping_start(&self, username: &str) -> Result<(), RemoteError> {
        self.post("/start", &StartRequest { username }).await?;
        Ok(())
    }

    async fn ping_stop(&self) -> Result<(), RemoteError> {
        self.post("/stop", &EmptyBody {}).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client =
            FocusServiceClient::new("http://10.0.2.2:3000", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.build_url("/session/stats"),
            "http://10.0.2.2:3000/session/stats"
        );
    }

    #[test]
    fn test_build_url_removes_trailing_slash() {
        let client =
            FocusServiceClient::new("http://192.168.1.20:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.20:3000");
        assert_eq!(
            client.build_url("/session/start"),
            "http://192.168.1.20:3000/session/start"
        );
    }
}
