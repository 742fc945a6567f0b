use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use shadowtrace_core::{AnchorRole, ContextEntry, DetectedGap, DetectionType, Relevance};
use shadowtrace_infer::{
    CompletionTransport, InferenceEngine, RemoteBackend, RemoteError, RetryPolicy, Sleeper,
    FALLBACK_FLAG,
};

#[derive(Clone, Default)]
struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

/// Fails with `error()` for the first `failures` calls, then answers `reply`
struct FlakyTransport {
    calls: Arc<AtomicU32>,
    failures: u32,
    error: fn() -> RemoteError,
    reply: String,
}

impl CompletionTransport for FlakyTransport {
    fn complete(&self, _prompt: &str) -> Result<String, RemoteError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            return Err((self.error)());
        }
        Ok(self.reply.clone())
    }
}

fn forbidden() -> RemoteError {
    RemoteError::Status {
        code: 403,
        body: "upstream said no".to_string(),
    }
}

fn rate_limited() -> RemoteError {
    RemoteError::Status {
        code: 429,
        body: "slow down".to_string(),
    }
}

fn unavailable() -> RemoteError {
    RemoteError::Status {
        code: 503,
        body: "try later".to_string(),
    }
}

fn oversized_request() -> RemoteError {
    RemoteError::Status {
        code: 400,
        body: "prompt exceeds 5000 tokens, see quota docs".to_string(),
    }
}

fn connection_reset() -> RemoteError {
    RemoteError::Network(
        "error sending request for url (https://example.test): connection reset by peer"
            .to_string(),
    )
}

fn sample_gap(before_seq: u32) -> DetectedGap {
    let ts = NaiveDate::from_ymd_opt(2024, 1, 12)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let entry = |sequence: u32, sender: &str, content: &str| ContextEntry {
        sequence,
        sender: sender.to_string(),
        content: content.to_string(),
        timestamp: ts,
    };
    DetectedGap {
        before_seq,
        after_seq: before_seq + 1,
        before_timestamp: ts,
        after_timestamp: ts,
        time_gap_seconds: 14400,
        detection_type: DetectionType::TimeAnomaly,
        suspicion_score: 0.4,
        suspicion_reasons: vec!["Unusual gap of 240 minutes detected".to_string()],
        context_before: vec![
            entry(before_seq - 2, "Alice", "did the transfer go through"),
            entry(before_seq - 1, "Bob", "checking"),
            entry(before_seq, "Alice", "well?"),
        ],
        context_after: vec![entry(before_seq + 1, "Alice", "You there?")],
        estimated_missing: Some(2),
    }
}

fn remote(
    failures: u32,
    error: fn() -> RemoteError,
    reply: &str,
) -> (
    RemoteBackend<FlakyTransport, RecordingSleeper>,
    Arc<AtomicU32>,
    RecordingSleeper,
) {
    let calls = Arc::new(AtomicU32::new(0));
    let sleeper = RecordingSleeper::default();
    let transport = FlakyTransport {
        calls: Arc::clone(&calls),
        failures,
        error,
        reply: reply.to_string(),
    };
    let backend = RemoteBackend::with_policy(
        transport,
        "gemini-2.0-flash",
        RetryPolicy::new(),
        sleeper.clone(),
    );
    (backend, calls, sleeper)
}

const GOOD_REPLY: &str = r#"```json
{"predicted_intent": "Bob confirming the transfer", "predicted_content": null,
 "predicted_sender": "Bob", "confidence_score": 0.35,
 "reasoning": "Alice keeps asking about the transfer", "hallucination_flags": []}
```"#;

#[test]
fn test_non_retryable_failure_still_returns_result() {
    let (backend, calls, sleeper) = remote(u32::MAX, forbidden, GOOD_REPLY);
    let engine = InferenceEngine::new(Box::new(backend));

    let result = engine.analyze_gap(&sample_gap(5));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.0.lock().unwrap().is_empty());

    assert_eq!(result.backend, "gemini-2.0-flash (fallback to mock)");
    assert!(result.hallucination_flags.contains(&FALLBACK_FLAG.to_string()));
    assert!(result.hallucination_flags.contains(&"MOCK_DATA".to_string()));
    assert!(result
        .hallucination_flags
        .iter()
        .any(|f| f.starts_with("REMOTE_ERROR: remote returned status 403")));
    assert!(result.confidence_score <= 0.85);
}

#[test]
fn test_rate_limited_then_success() {
    let (backend, calls, sleeper) = remote(2, rate_limited, GOOD_REPLY);
    let engine = InferenceEngine::new(Box::new(backend));

    let result = engine.analyze_gap(&sample_gap(5));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        *sleeper.0.lock().unwrap(),
        vec![Duration::from_secs(1), Duration::from_secs(2)]
    );

    assert_eq!(result.backend, "gemini-2.0-flash");
    assert_eq!(result.predicted_intent, "Bob confirming the transfer");
    assert_eq!(result.predicted_content, None);
    assert_eq!(result.predicted_sender.as_deref(), Some("Bob"));
    assert_eq!(result.confidence_score, 0.35);
    assert_eq!(result.hallucination_flags, vec!["AI_GENERATED"]);
}

#[test]
fn test_retries_exhausted_falls_back() {
    let (backend, calls, sleeper) = remote(u32::MAX, unavailable, GOOD_REPLY);
    let result = InferenceEngine::new(Box::new(backend)).analyze_gap(&sample_gap(5));

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(sleeper.0.lock().unwrap().len(), 2);
    assert!(result.backend.ends_with("(fallback to mock)"));
}

#[test]
fn test_connection_reset_is_retried() {
    let (backend, calls, sleeper) = remote(1, connection_reset, GOOD_REPLY);
    let result = InferenceEngine::new(Box::new(backend)).analyze_gap(&sample_gap(5));

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(*sleeper.0.lock().unwrap(), vec![Duration::from_secs(1)]);
    assert_eq!(result.backend, "gemini-2.0-flash");
}

#[test]
fn test_client_error_mentioning_quota_is_not_retried() {
    let (backend, calls, sleeper) = remote(u32::MAX, oversized_request, GOOD_REPLY);
    let result = InferenceEngine::new(Box::new(backend)).analyze_gap(&sample_gap(5));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sleeper.0.lock().unwrap().is_empty());
    assert!(result.backend.ends_with("(fallback to mock)"));
}

#[test]
fn test_anchors_reference_context_window() {
    let (backend, _, _) = remote(0, unavailable, GOOD_REPLY);
    let result = InferenceEngine::new(Box::new(backend)).analyze_gap(&sample_gap(5));

    let anchors: Vec<(u32, AnchorRole, Relevance)> = result
        .context_anchors
        .iter()
        .map(|a| (a.sequence, a.role, a.relevance))
        .collect();
    assert_eq!(
        anchors,
        vec![
            (3, AnchorRole::BeforeGap, Relevance::Low),
            (4, AnchorRole::BeforeGap, Relevance::Medium),
            (5, AnchorRole::BeforeGap, Relevance::High),
            (6, AnchorRole::AfterGap, Relevance::High),
        ]
    );
}

#[test]
fn test_analyze_gaps_preserves_order() {
    let engine = InferenceEngine::deterministic();
    let gaps = vec![sample_gap(9), sample_gap(3), sample_gap(5)];
    let results = engine.analyze_gaps(&gaps);

    let after_anchors: Vec<u32> = results
        .iter()
        .map(|r| r.context_anchors.last().unwrap().sequence)
        .collect();
    assert_eq!(after_anchors, vec![10, 4, 6]);
}
