//! Lenient parsing of completion text into prediction fields

use serde_json::{Map, Value};

use crate::transport::RemoteError;

pub const UNDETERMINED_INTENT: &str = "UNDETERMINED";
pub const AI_GENERATED_FLAG: &str = "AI_GENERATED";

const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_REASONING: &str = "No reasoning provided";

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCompletion {
    pub predicted_intent: String,
    pub predicted_content: Option<String>,
    pub predicted_sender: Option<String>,
    pub confidence_score: f64,
    pub reasoning: String,
    /// Model-reported flags followed by `AI_GENERATED`
    pub hallucination_flags: Vec<String>,
}

/// Drop a surrounding markdown code fence, if any
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // skip the language tag line
    let body = rest.split_once('\n').map(|(_, b)| b).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// First `{` that starts a complete JSON object
fn first_object(text: &str) -> Option<Map<String, Value>> {
    text.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}

fn optional_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A finite number, bare or quoted (`0.7` or `"0.7"`)
fn number_or_numeric_text(value: &Value) -> Option<f64> {
    let number = match value {
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        other => other.as_f64()?,
    };
    number.is_finite().then_some(number)
}

pub fn parse_completion(text: &str) -> Result<ParsedCompletion, RemoteError> {
    let body = strip_fences(text);
    let map = first_object(body).ok_or_else(|| {
        RemoteError::MalformedResponse("no JSON object in completion".to_string())
    })?;

    let confidence_score = map
        .get("confidence_score")
        .and_then(number_or_numeric_text)
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let mut hallucination_flags: Vec<String> = map
        .get("hallucination_flags")
        .and_then(Value::as_array)
        .map(|flags| {
            flags
                .iter()
                .filter_map(|f| f.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    hallucination_flags.push(AI_GENERATED_FLAG.to_string());

    Ok(ParsedCompletion {
        predicted_intent: optional_text(&map, "predicted_intent")
            .unwrap_or_else(|| UNDETERMINED_INTENT.to_string()),
        predicted_content: optional_text(&map, "predicted_content"),
        predicted_sender: optional_text(&map, "predicted_sender"),
        confidence_score,
        reasoning: optional_text(&map, "reasoning")
            .unwrap_or_else(|| DEFAULT_REASONING.to_string()),
        hallucination_flags,
    })
}
