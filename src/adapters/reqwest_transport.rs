//! Production transport over `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;

use crate::error::{classify_reqwest_error, NetworkError};
use crate::models::StreamRequest;
use crate::traits::{ByteStream, StreamTransport};

const STREAM_PATH: &str = "/api/chat/stream";
const HEALTH_PATH: &str = "/api/health";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// `StreamTransport` backed by a shared `reqwest::Client`.
///
/// No overall request timeout is set on the client: the streaming response
/// body stays open for as long as the reply takes. Staleness is the
/// pipeline's idle-timeout concern, not the transport's.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| NetworkError::Other {
                message: format!("failed to build HTTP client: {}", err),
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing client, for callers that share one across adapters.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn stream_url(&self) -> String {
        format!("{}{}", self.base_url, STREAM_PATH)
    }

    fn health_url(&self) -> String {
        format!("{}{}", self.base_url, HEALTH_PATH)
    }
}

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn open_stream(&self, request: &StreamRequest) -> Result<ByteStream, NetworkError> {
        let url = self.stream_url();
        tracing::debug!(url = %url, model = %request.model_name, "opening stream request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(|err| classify_reqwest_error(&err, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
            });
        }

        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|err| classify_reqwest_error(&err, &url)));
        Ok(Box::pin(stream))
    }

    async fn probe(&self) -> Result<(), NetworkError> {
        let url = self.health_url();
        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|err| classify_reqwest_error(&err, &url))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NetworkError::HttpStatus {
                status: status.as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = HttpTransport::new("http://localhost:8000/").expect("client");
        assert_eq!(
            transport.stream_url(),
            "http://localhost:8000/api/chat/stream"
        );
        assert_eq!(transport.health_url(), "http://localhost:8000/api/health");
    }
}
