use std::error::Error as StdError;
use std::time::Duration;

use serde_json::Value;
use shadowtrace_core::{truncate_chars, Settings};
use thiserror::Error;
use tracing::debug;

use crate::retry::Transient;

const ERROR_BODY_CHARS: usize = 300;

/// Rate-limit and transient-server statuses
const RETRYABLE_STATUS: [u16; 6] = [408, 429, 500, 502, 503, 504];

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("remote backend unavailable: {0}")]
    Setup(String),
}

impl Transient for RemoteError {
    /// Statuses are judged by code alone; response bodies may mention
    /// quotas or numbers without the failure being transient.
    fn is_transient(&self, indicators: fn(&str) -> bool) -> bool {
        match self {
            RemoteError::Status { code, .. } => RETRYABLE_STATUS.contains(code),
            RemoteError::Timeout => true,
            RemoteError::Network(message) => indicators(message),
            RemoteError::MalformedResponse(_) | RemoteError::Setup(_) => false,
        }
    }
}

/// Sends one prompt, returns the raw completion text
pub trait CompletionTransport: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, RemoteError>;
}

/// `generateContent` over HTTPS, blocking on a private current-thread runtime
pub struct GeminiTransport {
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    endpoint: String,
    api_key: String,
}

impl GeminiTransport {
    pub fn new(settings: &Settings) -> Result<Self, RemoteError> {
        let api_key = settings
            .gemini_api_key
            .clone()
            .ok_or_else(|| RemoteError::Setup("no API key configured".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()
            .map_err(|e| RemoteError::Setup(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| RemoteError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            runtime,
            endpoint: format!(
                "{}/models/{}:generateContent",
                settings.gemini_api_base.trim_end_matches('/'),
                settings.gemini_model
            ),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, prompt: &str) -> Result<String, RemoteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": prompt}]}],
                "generationConfig": {
                    "temperature": 0.2,
                    "responseMimeType": "application/json"
                }
            }))
            .send()
            .await
            .map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                code: status.as_u16(),
                body: truncate_chars(body.trim(), ERROR_BODY_CHARS).to_string(),
            });
        }

        let body: Value = response.json().await.map_err(classify_reqwest)?;
        completion_text(&body)
    }
}

impl CompletionTransport for GeminiTransport {
    fn complete(&self, prompt: &str) -> Result<String, RemoteError> {
        debug!(endpoint = %self.endpoint, prompt_chars = prompt.len(), "sending completion request");
        self.runtime.block_on(self.send(prompt))
    }
}

fn classify_reqwest(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else if err.is_decode() {
        RemoteError::MalformedResponse(with_causes(&err))
    } else {
        RemoteError::Network(with_causes(&err))
    }
}

/// `err` followed by each distinct message down its source chain.
/// reqwest's own Display stops at "error sending request"; the io cause
/// (connection reset, refused, ...) sits further down.
fn with_causes(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Text of the first candidate's first part
fn completion_text(body: &Value) -> Result<String, RemoteError> {
    body["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| RemoteError::MalformedResponse("no candidate text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::is_retryable_message;

    #[test]
    fn test_completion_text() {
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "{\"predicted_intent\": \"x\"}"}]}}]
        });
        assert_eq!(completion_text(&body).unwrap(), "{\"predicted_intent\": \"x\"}");

        let blocked = serde_json::json!({"promptFeedback": {"blockReason": "SAFETY"}});
        assert!(matches!(
            completion_text(&blocked),
            Err(RemoteError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_transport_requires_key() {
        let settings = Settings::new();
        assert!(matches!(
            GeminiTransport::new(&settings),
            Err(RemoteError::Setup(_))
        ));
    }

    #[test]
    fn test_endpoint_from_settings() {
        let mut settings = Settings::new();
        settings.gemini_api_key = Some("k".to_string());
        settings.gemini_api_base = "http://localhost:9/v1beta/".to_string();
        let transport = GeminiTransport::new(&settings).unwrap();
        assert_eq!(
            transport.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    fn status(code: u16, body: &str) -> RemoteError {
        RemoteError::Status {
            code,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_errors_classify() {
        assert!(status(503, "overloaded").is_transient(is_retryable_message));
        assert!(status(429, "").is_transient(is_retryable_message));
        assert!(RemoteError::Timeout.is_transient(is_retryable_message));
        assert!(!status(400, "API key not valid").is_transient(is_retryable_message));
    }

    #[test]
    fn test_status_body_does_not_make_client_error_transient() {
        let err = status(400, "Request of 5000 tokens exceeds limit, see quota docs");
        assert!(is_retryable_message(&err.to_string()));
        assert!(!err.is_transient(is_retryable_message));
    }

    #[test]
    fn test_malformed_and_setup_are_final() {
        let malformed = RemoteError::MalformedResponse("status 503 in body".to_string());
        assert!(!malformed.is_transient(is_retryable_message));
        assert!(!RemoteError::Setup("timeout".to_string()).is_transient(is_retryable_message));
    }

    #[derive(Debug)]
    struct SendFailure(std::io::Error);

    impl std::fmt::Display for SendFailure {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "error sending request for url (http://localhost:9/v1beta)")
        }
    }

    impl StdError for SendFailure {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_connection_reset_cause_is_transient() {
        let failure = SendFailure(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset by peer",
        ));
        assert!(!is_retryable_message(&failure.to_string()));

        let err = RemoteError::Network(with_causes(&failure));
        assert_eq!(
            err.to_string(),
            "network error: error sending request for url (http://localhost:9/v1beta): connection reset by peer"
        );
        assert!(err.is_transient(is_retryable_message));
    }

    #[test]
    fn test_with_causes_skips_repeated_text() {
        let failure = SendFailure(std::io::Error::new(
            std::io::ErrorKind::Other,
            "http://localhost:9/v1beta",
        ));
        assert_eq!(
            with_causes(&failure),
            "error sending request for url (http://localhost:9/v1beta)"
        );
    }
}
