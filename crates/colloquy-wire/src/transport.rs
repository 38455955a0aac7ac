use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;

use crate::errors::{WireError, protocol_message};
use crate::types::{ExchangeRequest, ExchangeResponse};

/// Raw bytes from a still-open incremental response channel.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, WireError>> + Send>>;

/// A successful reply, classified by the transport's declared content
/// category.
pub enum ExchangeReply {
    /// One complete structured body.
    Complete(ExchangeResponse),
    /// A byte channel delivering newline-delimited records.
    Incremental(ByteStream),
}

/// Seam between the session manager and the network. Tests script this;
/// production uses [`HttpTransport`].
#[async_trait]
pub trait ExchangeTransport: Send + Sync {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeReply, WireError>;
}

const STREAMING_CONTENT_TYPES: &[&str] = &["text/event-stream", "application/x-ndjson"];

fn is_streaming_content_type(content_type: &str) -> bool {
    STREAMING_CONTENT_TYPES
        .iter()
        .any(|candidate| content_type.starts_with(candidate))
}

/// reqwest-backed transport that POSTs both phases to a single endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ExchangeTransport for HttpTransport {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeReply, WireError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|_| WireError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WireError::Protocol(protocol_message(status, &body)));
        }

        let streaming = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(is_streaming_content_type);

        if streaming {
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|error| WireError::Stream(error.to_string())));
            return Ok(ExchangeReply::Incremental(Box::pin(stream)));
        }

        let body = response
            .text()
            .await
            .map_err(|error| WireError::MalformedBody(error.to_string()))?;
        let parsed = serde_json::from_str(&body)
            .map_err(|error| WireError::MalformedBody(error.to_string()))?;
        Ok(ExchangeReply::Complete(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_detection_matches_declared_categories() {
        assert!(is_streaming_content_type("text/event-stream"));
        assert!(is_streaming_content_type("text/event-stream; charset=utf-8"));
        assert!(is_streaming_content_type("application/x-ndjson"));
        assert!(!is_streaming_content_type("application/json"));
        assert!(!is_streaming_content_type(""));
    }
}
