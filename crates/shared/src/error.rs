use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Failure reported by the backend inside an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("backend rejected request: {message}")]
pub struct BackendFailure {
    pub message: String,
}

impl BackendFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Detects the `{"success": false, ...}` convention used by the game routes.
    pub fn from_body(body: &Value) -> Option<Self> {
        let object = body.as_object()?;
        if object.get("success").and_then(Value::as_bool) != Some(false) {
            return None;
        }
        let message = ["message", "error", "result"]
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_str))
            .unwrap_or("unspecified failure");
        Some(Self::new(message))
    }
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
