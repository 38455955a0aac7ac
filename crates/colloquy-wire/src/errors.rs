use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Shown when the service cannot be reached at all, as opposed to a request
/// that reached it and came back failed.
pub const TRANSPORT_FAILURE_MESSAGE: &str =
    "Unable to reach the conversation service. Check your connection and try again.";

/// Failure surface of the wire layer.
#[derive(Debug, Error)]
pub enum WireError {
    /// DNS, connect, TLS, or timeout failure before any response arrived.
    #[error("{}", TRANSPORT_FAILURE_MESSAGE)]
    Unreachable,
    /// The service answered with a non-success status.
    #[error("{0}")]
    Protocol(String),
    /// The incremental channel failed partway through a response.
    #[error("response stream interrupted: {0}")]
    Stream(String),
    /// The body could not be read or parsed as the expected shape.
    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

/// Extract a human-readable failure message from an error response body.
///
/// Priority order: an explicit `error_message` field, then a structured
/// validation `detail` list (or plain `detail` string), then the HTTP
/// status text.
pub fn protocol_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error_message").and_then(Value::as_str)
            && !message.is_empty()
        {
            return message.to_string();
        }
        if let Some(details) = value.get("detail").and_then(Value::as_array) {
            let parts: Vec<&str> = details
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !parts.is_empty() {
                return parts.join("; ");
            }
        }
        if let Some(detail) = value.get("detail").and_then(Value::as_str)
            && !detail.is_empty()
        {
            return detail.to_string();
        }
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}
