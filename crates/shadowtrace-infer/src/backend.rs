use shadowtrace_core::{DetectedGap, InferenceResult};

/// One way of predicting what filled a gap.
///
/// Implementations never fail: anything that goes wrong is folded into a
/// flagged, low-trust result.
pub trait InferenceBackend: Send + Sync {
    /// Implementation name, e.g. `deterministic`
    fn name(&self) -> &str;

    /// Model identifier recorded on results
    fn model(&self) -> &str;

    fn is_mock(&self) -> bool;

    /// Predict the missing content for `gap` from its own context window
    fn produce(&self, gap: &DetectedGap) -> InferenceResult;
}
