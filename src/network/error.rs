use reqwest::StatusCode;
use serde_json::Value;

/// Failure of a backend call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server could not be reached (connect failure, timeout).
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected {
        status: StatusCode,
        body: Option<Value>,
    },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Structured body the server sent along with a rejection, if any.
    pub fn response_body(&self) -> Option<&Value> {
        match self {
            Self::Rejected { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}
