use thiserror::Error;

/// Failure talking to the focus service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Connection refused, DNS failure, timeout and the like
    #[error("focus service unreachable: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status
    #[error("focus service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Body could not be parsed, or lacked a required field
    #[error("malformed focus service response: {0}")]
    MalformedResponse(String),
}

impl RemoteError {
    /// Whether this is a connectivity problem rather than a protocol one
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
