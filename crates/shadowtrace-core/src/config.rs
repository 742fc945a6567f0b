//! Settings handed in by the configuration collaborator

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::warn;

pub const ENV_USE_MOCK_AI: &str = "SHADOWTRACE_USE_MOCK_AI";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_MODEL: &str = "GEMINI_MODEL";
pub const ENV_API_BASE: &str = "GEMINI_API_BASE";
pub const ENV_TIMEOUT_SECS: &str = "SHADOWTRACE_REQUEST_TIMEOUT_SECS";

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid boolean for {key}: {value:?}")]
    InvalidBool { key: &'static str, value: String },

    #[error("invalid number for {key}: {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Which inference backend the engine should be built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Deterministic,
    Remote,
}

/// Backend selection and remote credentials
#[derive(Clone)]
pub struct Settings {
    /// Force the deterministic backend
    pub use_mock_ai: bool,

    pub gemini_api_key: Option<String>,

    pub gemini_model: String,

    /// Base URL of the generative API (no trailing slash)
    pub gemini_api_base: String,

    /// Per-request timeout for the remote backend
    pub request_timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Self {
        Self {
            use_mock_ai: true,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_api_base: DEFAULT_API_BASE.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Read settings from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::new();

        if let Some(raw) = lookup(ENV_USE_MOCK_AI) {
            settings.use_mock_ai = parse_bool(ENV_USE_MOCK_AI, &raw)?;
        }
        if let Some(key) = lookup(ENV_API_KEY) {
            let key = key.trim();
            if !key.is_empty() {
                settings.gemini_api_key = Some(key.to_string());
            }
        }
        if let Some(model) = lookup(ENV_MODEL) {
            if !model.trim().is_empty() {
                settings.gemini_model = model.trim().to_string();
            }
        }
        if let Some(base) = lookup(ENV_API_BASE) {
            if !base.trim().is_empty() {
                settings.gemini_api_base = base.trim().trim_end_matches('/').to_string();
            }
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            // a zero timeout fails every request
            settings.request_timeout_secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::InvalidNumber {
                    key: ENV_TIMEOUT_SECS,
                    value: raw.clone(),
                })?;
        }

        Ok(settings)
    }

    /// Resolve the backend to build. Remote needs both the opt-in and a key.
    pub fn backend_kind(&self) -> BackendKind {
        if self.use_mock_ai {
            return BackendKind::Deterministic;
        }
        match &self.gemini_api_key {
            Some(_) => BackendKind::Remote,
            None => {
                warn!("remote inference requested but {} is not set", ENV_API_KEY);
                BackendKind::Deterministic
            }
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("use_mock_ai", &self.use_mock_ai)
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gemini_model", &self.gemini_model)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key,
            value: raw.to_string(),
        }),
    }
}
