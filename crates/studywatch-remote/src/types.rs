use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// What the detector thinks the student is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PhoneDistraction,
    Asleep,
    LookingAway,
    FaceMissing,
    /// Anything the client does not recognise
    #[default]
    #[serde(other)]
    Unknown,
}

impl ActivityKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PhoneDistraction => "phone_distraction",
            Self::Asleep => "asleep",
            Self::LookingAway => "looking_away",
            Self::FaceMissing => "face_missing",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One poll result from `GET /session/stats`
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySample {
    /// 0..=100
    pub focus_score: f64,
    pub focused_ms: u64,
    /// Server's view of elapsed time; informational only
    pub elapsed_ms: u64,
    pub is_distracted: bool,
    pub activity: ActivityKind,
    /// 0..=1
    pub severity: f64,
}

impl TelemetrySample {
    /// A sample reporting no distraction
    #[must_use]
    pub fn focused(focus_score: f64, focused_ms: u64) -> Self {
        Self {
            focus_score,
            focused_ms,
            elapsed_ms: focused_ms,
            is_distracted: false,
            activity: ActivityKind::Unknown,
            severity: 0.0,
        }
    }

    /// A sample reporting a distraction of the given kind
    #[must_use]
    pub fn distracted(activity: ActivityKind, severity: f64) -> Self {
        Self {
            focus_score: 100.0,
            focused_ms: 0,
            elapsed_ms: 0,
            is_distracted: true,
            activity,
            severity,
        }
    }
}

// ============================================================================
// Wire types
// ============================================================================

const fn default_focus_score() -> f64 {
    100.0
}

const fn default_severity() -> f64 {
    0.5
}

/// Body of `GET /session/stats`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    status: Option<String>,
    #[serde(default = "default_focus_score")]
    current_focus_score: f64,
    #[serde(default)]
    focused_ms: i64,
    #[serde(default)]
    elapsed_ms: i64,
    #[serde(default)]
    is_distracted: bool,
    #[serde(default)]
    current_activity: ActivityKind,
    #[serde(default = "default_severity")]
    current_severity: f64,
}

/// Body of `POST /session/start` and `POST /start`
#[derive(Debug, Serialize)]
pub(crate) struct StartRequest<'a> {
    pub username: &'a str,
}

/// Reply to `POST /session/start`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StartSessionResponse {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply to `POST /session/stop`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StopSessionResponse {
    #[serde(default)]
    pub focus_score: Option<f64>,
}

/// Parse a `/session/stats` body.
///
/// Returns `Ok(None)` when the service reports a status other than `"ok"`
/// (no active session on its side).
///
/// # Errors
///
/// Returns [`RemoteError::MalformedResponse`] if the body is not JSON or has no `status` field.
pub fn parse_stats_body(body: &str) -> Result<Option<TelemetrySample>, RemoteError> {
    let stats: StatsResponse = serde_json::from_str(body)?;

    let Some(status) = stats.status else {
        return Err(RemoteError::MalformedResponse(
            "missing status field".to_string(),
        ));
    };
    if status != "ok" {
        log::debug!("Ignoring stats with status '{status}'");
        return Ok(None);
    }

    Ok(Some(TelemetrySample {
        focus_score: stats.current_focus_score.clamp(0.0, 100.0),
        focused_ms: u64::try_from(stats.focused_ms).unwrap_or(0),
        elapsed_ms: u64::try_from(stats.elapsed_ms).unwrap_or(0),
        is_distracted: stats.is_distracted,
        activity: stats.current_activity,
        severity: stats.current_severity.clamp(0.0, 1.0),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_stats() {
        let body = r#"{
            "status": "ok",
            "sessionId": "session_1",
            "currentFocusScore": 87.5,
            "focusedMs": 125000,
            "elapsedMs": 140000,
            "isDistracted": true,
            "currentActivity": "phone_distraction",
            "currentSeverity": 0.9
        }"#;

        let sample = parse_stats_body(body).unwrap().unwrap();
        assert!((sample.focus_score - 87.5).abs() < f64::EPSILON);
        assert_eq!(sample.focused_ms, 125_000);
        assert_eq!(sample.elapsed_ms, 140_000);
        assert!(sample.is_distracted);
        assert_eq!(sample.activity, ActivityKind::PhoneDistraction);
        assert!((sample.severity - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_applies_defaults() {
        let sample = parse_stats_body(r#"{"status":"ok"}"#).unwrap().unwrap();
        assert!((sample.focus_score - 100.0).abs() < f64::EPSILON);
        assert_eq!(sample.focused_ms, 0);
        assert!(!sample.is_distracted);
        assert_eq!(sample.activity, ActivityKind::Unknown);
        assert!((sample.severity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_unknown_activity_falls_back() {
        let sample = parse_stats_body(r#"{"status":"ok","currentActivity":"yawning"}"#)
            .unwrap()
            .unwrap();
        assert_eq!(sample.activity, ActivityKind::Unknown);
    }

    #[test]
    fn test_parse_clamps_out_of_range_values() {
        let body = r#"{"status":"ok","currentFocusScore":-3.2,"focusedMs":-10,"currentSeverity":1.7}"#;
        let sample = parse_stats_body(body).unwrap().unwrap();
        assert!(sample.focus_score.abs() < f64::EPSILON);
        assert_eq!(sample.focused_ms, 0);
        assert!((sample.severity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_non_ok_status_is_ignored() {
        assert_eq!(parse_stats_body(r#"{"status":"idle"}"#).unwrap(), None);
    }

    #[test]
    fn test_missing_status_is_malformed() {
        let err = parse_stats_body(r#"{"currentFocusScore":50}"#).unwrap_err();
        assert!(matches!(err, RemoteError::MalformedResponse(_)));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = parse_stats_body("<html>502</html>").unwrap_err();
        assert!(matches!(err, RemoteError::MalformedResponse(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_activity_wire_names() {
        for kind in [
            ActivityKind::PhoneDistraction,
            ActivityKind::Asleep,
            ActivityKind::LookingAway,
            ActivityKind::FaceMissing,
            ActivityKind::Unknown,
        ] {
            let wire = serde_json::to_string(&kind).unwrap();
            assert_eq!(wire, format!("\"{}\"", kind.as_str()));
            assert_eq!(serde_json::from_str::<ActivityKind>(&wire).unwrap(), kind);
        }
        let shouted: ActivityKind = serde_json::from_str("\"PHONE\"").unwrap();
        assert_eq!(shouted, ActivityKind::Unknown);
    }
}
