use serde::{Deserialize, Serialize};

/// Default host used when no server IP is configured (the Android emulator's
/// alias for the host loopback interface).
pub const DEFAULT_SERVER_HOST: &str = "10.0.2.2";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Outcome of a finished study session, written locally whether or not the
/// focus service confirmed the stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSessionRecord {
    /// Remote session id, if the service handed one out on start
    pub session_id: Option<String>,
    /// Local calendar date, `YYYY-MM-DD`
    pub date: String,
    /// Active duration, `MM:SS` (minutes unclamped)
    pub duration: String,
    pub username: String,
    /// Final focus score reported by the service, `None` when the stop call failed
    pub focus_score: Option<f64>,
}

impl StoredSessionRecord {
    #[must_use]
    pub fn new(
        session_id: Option<String>,
        date: String,
        duration: String,
        username: String,
        focus_score: Option<f64>,
    ) -> Self {
        Self {
            session_id,
            date,
            duration,
            username,
            focus_score,
        }
    }

    /// Duration in whole seconds, `None` if the stored string is not `MM:SS`
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        parse_duration_secs(&self.duration)
    }
}

/// Parse an `MM:SS` duration string into seconds.
///
/// Minutes may exceed 59; seconds may not.
#[must_use]
pub fn parse_duration_secs(duration: &str) -> Option<u64> {
    let (mins, secs) = duration.trim().split_once(':')?;
    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    Some(mins * 60 + secs)
}

/// User settings for the monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Focus service host; falls back to [`DEFAULT_SERVER_HOST`] when unset
    pub server_ip: Option<String>,
    pub server_port: u16,
    pub poll_interval_ms: u64,
    pub warning_dismiss_ms: u64,
    pub request_timeout_secs: u64,
    /// Send the plain `/start` and `/stop` pings alongside the session calls
    pub legacy_pings: bool,
    pub default_username: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_ip: None,
            server_port: DEFAULT_SERVER_PORT,
            poll_interval_ms: 2000,
            warning_dismiss_ms: 7000,
            request_timeout_secs: 10,
            legacy_pings: true,
            default_username: None,
        }
    }
}

impl Settings {
    /// Base URL of the focus service derived from the configured host and port
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self
            .server_ip
            .as_deref()
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .unwrap_or(DEFAULT_SERVER_HOST);
        format!("http://{host}:{}", self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_secs() {
        assert_eq!(parse_duration_secs("00:17"), Some(17));
        assert_eq!(parse_duration_secs("25:00"), Some(1500));
        assert_eq!(parse_duration_secs("125:09"), Some(7509));
    }

    #[test]
    fn test_parse_duration_secs_rejects_garbage() {
        assert_eq!(parse_duration_secs(""), None);
        assert_eq!(parse_duration_secs("12"), None);
        assert_eq!(parse_duration_secs("aa:bb"), None);
        assert_eq!(parse_duration_secs("01:75"), None);
    }

    #[test]
    fn test_base_url_defaults_to_emulator_host() {
        let settings = Settings::default();
        assert_eq!(settings.base_url(), "http://10.0.2.2:3000");
    }

    #[test]
    fn test_base_url_uses_configured_ip() {
        let settings = Settings {
            server_ip: Some("192.168.1.20".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.base_url(), "http://192.168.1.20:3000");

        let blank = Settings {
            server_ip: Some("  ".to_string()),
            server_port: 8080,
            ..Settings::default()
        };
        assert_eq!(blank.base_url(), "http://10.0.2.2:8080");
    }

    #[test]
    fn test_record_serializes_with_null_score() {
        let record = StoredSessionRecord::new(
            None,
            "2024-03-01".to_string(),
            "00:17".to_string(),
            "ana".to_string(),
            None,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sessionId"], serde_json::Value::Null);
        assert_eq!(json["focusScore"], serde_json::Value::Null);
        assert_eq!(json["duration"], "00:17");
        assert_eq!(record.duration_secs(), Some(17));
    }
}
