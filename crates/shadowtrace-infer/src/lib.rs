//! Anchored, confidence-scored predictions for detected gaps

mod backend;
mod deterministic;
mod engine;
mod prompt;
mod remote;
mod response;
mod retry;
mod transport;

pub use backend::InferenceBackend;
pub use deterministic::{DeterministicBackend, DETERMINISTIC_MODEL, MOCK_FLAGS};
pub use engine::{BackendInfo, InferenceEngine};
pub use prompt::build_prompt;
pub use remote::{RemoteBackend, FALLBACK_FLAG, MAX_DISPLAY_CHARS};
pub use response::{parse_completion, ParsedCompletion, AI_GENERATED_FLAG, UNDETERMINED_INTENT};
pub use retry::{
    is_retryable_message, RetryPolicy, Sleeper, ThreadSleeper, Transient, RETRYABLE_INDICATORS,
};
pub use transport::{CompletionTransport, GeminiTransport, RemoteError};

/// Anchors taken from each side of a gap
pub const ANCHORS_PER_SIDE: usize = 3;
