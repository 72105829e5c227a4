use std::env;
use std::time::Duration;

use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{header, Client as ReqwestClient, Response};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::history::build_history;
use crate::observability;
use crate::sse::decode_frames;
use crate::types::{Message, ModelInfo, StreamFrame, StreamLogRequest};

const DEFAULT_BASE_URL: &str = "http://localhost:6969/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// The chat-stream endpoint. Fixed by the protocol, not user-configurable.
const STREAM_LOG_PATH: &str = "codewhisper/stream_log";
const HEALTH_PATH: &str = "health";
const CURRENT_MODEL_PATH: &str = "api/current-model";

/// Client for the CodeWhisper server.
#[derive(Debug, Clone)]
pub struct CodeWhisper {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
}

impl CodeWhisper {
    /// Create a new CodeWhisper client.
    ///
    /// The server URL can be provided directly or read from the
    /// CODEWHISPER_URL environment variable; a local default is used when
    /// neither is set.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let base_url = base_url
            .or_else(|| env::var("CODEWHISPER_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = if base_url.ends_with('/') {
            base_url
        } else {
            format!("{base_url}/")
        };

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {e}"),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// The resolved server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for server requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers
    }

    /// Map a reqwest send failure to our error type.
    fn classify_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    /// Classify a non-success response, reading its `{"detail"}` body
    /// best-effort.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        #[derive(Deserialize)]
        struct ErrorBody {
            detail: Option<String>,
        }

        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|e| e.detail),
            Err(_) => None,
        };

        Error::from_status(status_code, detail)
    }

    /// Issue a chat request and return the decoded frame stream.
    ///
    /// History pairs are built from `prior_messages`; the current `question`
    /// is never part of the history. A non-success status classifies and
    /// fails immediately without any streaming; the caller is responsible
    /// for draining the returned stream to completion.
    pub async fn stream_chat(
        &self,
        question: &str,
        prior_messages: &[Message],
        file_scope: &[String],
    ) -> Result<impl Stream<Item = Result<StreamFrame>>> {
        let history = build_history(prior_messages);
        let request = StreamLogRequest::new(question, history, file_scope.to_vec());

        tracing::debug!(
            pairs = request.input.chat_history.len(),
            files = request.input.config.files.len(),
            "sending stream_log request"
        );
        observability::CLIENT_REQUESTS.click();

        let url = format!("{}{}", self.base_url, STREAM_LOG_PATH);
        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.classify_send_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        // A declared-empty body on a success status has nothing to stream.
        if response.content_length() == Some(0) {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Error::empty_body());
        }

        Ok(decode_frames(response.bytes_stream()))
    }

    /// Probe the server's health endpoint.
    pub async fn health(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct Health {
            status: String,
        }

        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let health = response.json::<Health>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse health response: {e}"),
                Some(Box::new(e)),
            )
        })?;
        if health.status != "healthy" {
            return Err(Error::service_unavailable(format!(
                "server reported status {:?}",
                health.status
            )));
        }
        Ok(())
    }

    /// Fetch the model the server is currently configured to use.
    pub async fn current_model(&self) -> Result<ModelInfo> {
        let url = format!("{}{}", self.base_url, CURRENT_MODEL_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        response.json::<ModelInfo>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse model response: {e}"),
                Some(Box::new(e)),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = CodeWhisper::with_options(
            Some("http://example.com:6969".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        // Trailing slash is normalized on.
        assert_eq!(client.base_url, "http://example.com:6969/");
        assert_eq!(client.timeout, Duration::from_secs(30));

        let client = CodeWhisper::with_options(Some("http://example.com/".to_string()), None).unwrap();
        assert_eq!(client.base_url, "http://example.com/");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }
}
