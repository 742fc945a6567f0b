use shadowtrace_core::{ContextEntry, DetectedGap};

fn render_context(entries: &[ContextEntry]) -> String {
    if entries.is_empty() {
        return "(no messages)".to_string();
    }
    entries
        .iter()
        .map(|e| format!("[#{} {}] {}: {}", e.sequence, e.timestamp, e.sender, e.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forensic reconstruction request for one gap
pub fn build_prompt(gap: &DetectedGap) -> String {
    let estimated = gap
        .estimated_missing
        .map(|n| n.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    format!(
        "You are a forensic chat analyst reconstructing messages that may have been deleted.\n\
         \n\
         CONTEXT BEFORE GAP:\n\
         {before}\n\
         \n\
         [GAP: {seconds} seconds between #{before_seq} and #{after_seq}, estimated {estimated} missing message(s)]\n\
         Detection type: {kind}\n\
         Detection reasons: {reasons}\n\
         \n\
         CONTEXT AFTER GAP:\n\
         {after}\n\
         \n\
         RULES:\n\
         1. Only predict content that is directly supported by the surrounding messages. \
         If nothing in the text supports a prediction, set predicted_content to null.\n\
         2. Never invent names, amounts, places or events that do not appear in the context.\n\
         3. confidence_score must be between 0.0 and 1.0 and never above 0.85.\n\
         4. Every speculative claim must be listed in hallucination_flags.\n\
         \n\
         Respond with a single JSON object and nothing else:\n\
         {{\"predicted_intent\": \"short description of what was likely discussed\", \
         \"predicted_content\": \"possible message text or null\", \
         \"predicted_sender\": \"most likely sender or null\", \
         \"confidence_score\": 0.0, \
         \"reasoning\": \"how the context supports the prediction\", \
         \"hallucination_flags\": [\"speculative aspects\"]}}\n",
        before = render_context(&gap.context_before),
        after = render_context(&gap.context_after),
        seconds = gap.time_gap_seconds,
        before_seq = gap.before_seq,
        after_seq = gap.after_seq,
        estimated = estimated,
        kind = gap.detection_type,
        reasons = gap.suspicion_reasons.join(", "),
    )
}
