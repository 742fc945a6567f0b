use serde::{Deserialize, Serialize};
use shadowtrace_core::{BackendKind, DetectedGap, InferenceResult, Settings};
use tracing::{debug, info, warn};

use crate::backend::InferenceBackend;
use crate::deterministic::DeterministicBackend;
use crate::remote::RemoteBackend;
use crate::transport::GeminiTransport;

/// What the engine is running on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    pub implementation: String,
    pub model: String,
    pub is_mock: bool,
}

pub struct InferenceEngine {
    backend: Box<dyn InferenceBackend>,
}

impl InferenceEngine {
    pub fn new(backend: Box<dyn InferenceBackend>) -> Self {
        Self { backend }
    }

    pub fn deterministic() -> Self {
        Self::new(Box::new(DeterministicBackend::new()))
    }

    /// Backend chosen by configuration only. A remote transport that cannot be
    /// built degrades to the deterministic backend.
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.backend_kind() {
            BackendKind::Deterministic => Self::deterministic(),
            BackendKind::Remote => match GeminiTransport::new(settings) {
                Ok(transport) => {
                    info!(model = %settings.gemini_model, "using remote inference backend");
                    Self::new(Box::new(RemoteBackend::new(
                        transport,
                        settings.gemini_model.clone(),
                    )))
                }
                Err(err) => {
                    warn!(error = %err, "remote backend unavailable, using deterministic");
                    Self::deterministic()
                }
            },
        }
    }

    pub fn analyze_gap(&self, gap: &DetectedGap) -> InferenceResult {
        self.backend.produce(gap)
    }

    /// One result per gap, in input order
    pub fn analyze_gaps(&self, gaps: &[DetectedGap]) -> Vec<InferenceResult> {
        let results: Vec<InferenceResult> = gaps.iter().map(|g| self.analyze_gap(g)).collect();
        debug!(
            gaps = gaps.len(),
            backend = self.backend.name(),
            "inference complete"
        );
        results
    }

    pub fn backend_info(&self) -> BackendInfo {
        BackendInfo {
            implementation: self.backend.name().to_string(),
            model: self.backend.model().to_string(),
            is_mock: self.backend.is_mock(),
        }
    }
}

impl Default for InferenceEngine {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_deterministic() {
        let engine = InferenceEngine::from_settings(&Settings::new());
        let info = engine.backend_info();
        assert_eq!(info.implementation, "deterministic");
        assert_eq!(info.model, "deterministic-mock");
        assert!(info.is_mock);
    }

    #[test]
    fn test_remote_selected_with_key() {
        let mut settings = Settings::new();
        settings.use_mock_ai = false;
        settings.gemini_api_key = Some("test-key".to_string());
        let info = InferenceEngine::from_settings(&settings).backend_info();
        assert_eq!(info.implementation, "remote");
        assert_eq!(info.model, "gemini-2.0-flash");
        assert!(!info.is_mock);
    }

    #[test]
    fn test_remote_without_key_stays_deterministic() {
        let mut settings = Settings::new();
        settings.use_mock_ai = false;
        assert!(InferenceEngine::from_settings(&settings).backend_info().is_mock);
    }

    #[test]
    fn test_empty_gap_list() {
        assert!(InferenceEngine::default().analyze_gaps(&[]).is_empty());
    }
}
