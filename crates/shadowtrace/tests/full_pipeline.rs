mod common;

use common::sample_transcript;
use shadowtrace_core::{DetectedGap, DetectionType, MessageType, Settings, ENV_USE_MOCK_AI};
use shadowtrace_gaps::{detect_all, filter_by_suspicion};
use shadowtrace_infer::{InferenceEngine, DETERMINISTIC_MODEL};
use shadowtrace_profile::{find_anomalies, get_summary, Anomaly, MetadataEngine};

#[test]
fn test_full_pipeline_deterministic() {
    let text = sample_transcript(30, 20, 10);
    let outcome = shadowtrace_parser::parse(&text);

    assert_eq!(outcome.messages.len(), 30);
    assert_eq!(outcome.errors.len(), 1, "export header is reported, not parsed");
    assert_eq!(outcome.participants, vec!["Rina", "Budi"]);
    assert_eq!(outcome.messages[9].message_type, MessageType::Deleted);

    let summary = get_summary(&outcome.messages).unwrap();
    assert_eq!(summary.total_messages, 30);
    assert_eq!(summary.deleted_count, 1);

    let gaps = detect_all(&outcome.messages);
    let pairs: Vec<(u32, u32, DetectionType)> = gaps
        .iter()
        .map(|g| (g.before_seq, g.after_seq, g.detection_type))
        .collect();
    assert!(pairs.contains(&(9, 10, DetectionType::ExplicitDeletion)));
    assert!(pairs.contains(&(10, 11, DetectionType::ExplicitDeletion)));
    assert!(pairs.contains(&(20, 21, DetectionType::TimeAnomaly)));

    let silence = gaps.iter().find(|g| g.before_seq == 20).unwrap();
    assert_eq!(silence.time_gap_seconds, 6 * 3600);
    assert!(silence.estimated_missing.unwrap() >= 1);

    let engine = InferenceEngine::from_settings(&Settings::new());
    assert!(engine.backend_info().is_mock);
    assert_eq!(engine.backend_info().model, DETERMINISTIC_MODEL);

    let results = engine.analyze_gaps(&gaps);
    assert_eq!(results.len(), gaps.len());
    for (gap, result) in gaps.iter().zip(&results) {
        assert!(result.confidence_score <= 0.85);
        assert!(result.reasoning.starts_with("[MOCK REASONING]"));
        assert!(result.hallucination_flags.contains(&"MOCK_DATA".to_string()));
        let last = result.context_anchors.last().unwrap();
        assert_eq!(last.sequence, gap.after_seq);
    }
}

#[test]
fn test_metadata_sees_the_same_silence() {
    let text = sample_transcript(30, 20, 0);
    let outcome = shadowtrace_parser::parse(&text);

    let silences: Vec<(u32, u32)> = find_anomalies(&outcome.messages)
        .into_iter()
        .filter_map(|a| match a {
            Anomaly::UnusualSilence {
                before_seq,
                after_seq,
                ..
            } => Some((before_seq, after_seq)),
            _ => None,
        })
        .collect();
    assert_eq!(silences, vec![(20, 21)]);

    let engine = MetadataEngine::new(&outcome.messages);
    let rina = engine.analyze_sender("Rina").unwrap();
    assert_eq!(rina.message_count, 15);
    assert_eq!(rina.deleted_message_count, 0);
}

#[test]
fn test_filter_then_reload_from_json_lines() {
    let text = sample_transcript(30, 20, 10);
    let outcome = shadowtrace_parser::parse(&text);
    let gaps = filter_by_suspicion(detect_all(&outcome.messages), 0.5);
    assert!(gaps.iter().all(|g| g.suspicion_score >= 0.5));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaps.jsonl");
    let body: String = gaps
        .iter()
        .map(|g| serde_json::to_string(g).unwrap() + "\n")
        .collect();
    std::fs::write(&path, body).unwrap();

    let reloaded: Vec<DetectedGap> = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(reloaded, gaps);

    let engine = InferenceEngine::deterministic();
    assert_eq!(engine.analyze_gaps(&reloaded), engine.analyze_gaps(&gaps));
}

#[test]
fn test_remote_without_key_degrades_to_deterministic() {
    let settings = Settings::from_lookup(|key| match key {
        ENV_USE_MOCK_AI => Some("false".to_string()),
        _ => None,
    })
    .unwrap();
    let engine = InferenceEngine::from_settings(&settings);
    assert!(engine.backend_info().is_mock);
}
