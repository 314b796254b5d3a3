use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Failure body the backend sends alongside `success: false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ApiFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: Vec::new(),
        }
    }

    /// Reads whatever failure details a response body carries. Bodies that are
    /// not JSON objects produce an empty failure.
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    pub fn describe(&self, fallback: &str) -> String {
        let headline = self
            .message
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(fallback);
        if self.errors.is_empty() {
            headline.to_string()
        } else {
            format!("{headline}: {}", self.errors.join("; "))
        }
    }
}

/// `success` flag of a response envelope. A missing flag counts as failure.
pub fn envelope_success(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(false)
}
