//! Generative backend with retry and a disclosed deterministic fallback

use shadowtrace_core::{truncate_chars, DetectedGap, InferenceResult};
use tracing::{debug, warn};

use crate::backend::InferenceBackend;
use crate::deterministic::DeterministicBackend;
use crate::prompt::build_prompt;
use crate::response::parse_completion;
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::transport::{CompletionTransport, RemoteError};
use crate::ANCHORS_PER_SIDE;

/// Longest backend id or flag stored on a result
pub const MAX_DISPLAY_CHARS: usize = 100;

pub const FALLBACK_FLAG: &str = "REMOTE_FALLBACK";

pub struct RemoteBackend<T, S = ThreadSleeper> {
    transport: T,
    model: String,
    policy: RetryPolicy,
    sleeper: S,
    fallback: DeterministicBackend,
}

impl<T: CompletionTransport> RemoteBackend<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self::with_policy(transport, model, RetryPolicy::new(), ThreadSleeper)
    }
}

impl<T: CompletionTransport, S: Sleeper> RemoteBackend<T, S> {
    pub fn with_policy(transport: T, model: impl Into<String>, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            transport,
            model: model.into(),
            policy,
            sleeper,
            fallback: DeterministicBackend::new(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn try_produce(&self, gap: &DetectedGap) -> Result<InferenceResult, RemoteError> {
        let prompt = build_prompt(gap);
        let text = self
            .policy
            .run(&self.sleeper, |attempt| {
                debug!(attempt, before_seq = gap.before_seq, "requesting remote completion");
                self.transport.complete(&prompt)
            })?;
        let parsed = parse_completion(&text)?;

        Ok(InferenceResult {
            predicted_intent: parsed.predicted_intent,
            predicted_content: parsed.predicted_content,
            predicted_sender: parsed.predicted_sender,
            confidence_score: parsed.confidence_score,
            context_anchors: gap.context_anchors(ANCHORS_PER_SIDE, ANCHORS_PER_SIDE),
            reasoning: parsed.reasoning,
            backend: bounded(&self.model),
            hallucination_flags: parsed.hallucination_flags.iter().map(|f| bounded(f)).collect(),
        })
    }

    fn fall_back(&self, gap: &DetectedGap, err: &RemoteError) -> InferenceResult {
        warn!(
            model = %self.model,
            before_seq = gap.before_seq,
            after_seq = gap.after_seq,
            error = %err,
            "remote inference failed, using deterministic fallback"
        );

        let mut result = self.fallback.produce(gap);
        result.backend = bounded(&format!("{} (fallback to mock)", self.model));
        result.hallucination_flags.push(FALLBACK_FLAG.to_string());
        result
            .hallucination_flags
            .push(format!("REMOTE_ERROR: {}", err));
        result.hallucination_flags = result
            .hallucination_flags
            .iter()
            .map(|f| bounded(f))
            .collect();
        result
    }
}

fn bounded(text: &str) -> String {
    truncate_chars(text, MAX_DISPLAY_CHARS).to_string()
}

impl<T: CompletionTransport, S: Sleeper> InferenceBackend for RemoteBackend<T, S> {
    fn name(&self) -> &str {
        "remote"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn is_mock(&self) -> bool {
        false
    }

    fn produce(&self, gap: &DetectedGap) -> InferenceResult {
        self.try_produce(gap)
            .unwrap_or_else(|err| self.fall_back(gap, &err))
    }
}
