use shared::error::ApiFailure;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        failure: ApiFailure,
    },
    #[error("request rejected: {}", .0.describe("no message"))]
    Application(ApiFailure),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("invalid api base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("session cookie is not a valid header value")]
    InvalidSessionCookie,
}

impl ClientError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application(ApiFailure::new(message))
    }

    /// Text shown to the user in a notice. `fallback` names the action that
    /// failed and is used when the server gave no message of its own.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Network(_) | Self::Malformed(_) => {
                "Network error. Please check your connection.".to_string()
            }
            Self::Status { status, failure } => {
                let text = failure.describe(fallback);
                format!("{text} (HTTP {status})")
            }
            Self::Application(failure) => failure.describe(fallback),
            Self::Validation(errors) => errors.join("\n"),
            Self::InvalidBaseUrl { .. } | Self::InvalidSessionCookie => self.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
