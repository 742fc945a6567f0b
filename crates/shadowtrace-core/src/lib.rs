//! Shared record types, statistics helpers and settings for transcript forensics

mod config;
pub mod stats;
mod text;
mod types;

pub use config::{
    BackendKind, ConfigError, Settings, ENV_API_BASE, ENV_API_KEY, ENV_MODEL, ENV_TIMEOUT_SECS,
    ENV_USE_MOCK_AI,
};
pub use text::truncate_chars;
pub use types::{
    AnchorRole, ContextAnchor, ContextEntry, DetectedGap, DetectionType, InferenceResult,
    MessageType, ParsedMessage, Relevance,
};
