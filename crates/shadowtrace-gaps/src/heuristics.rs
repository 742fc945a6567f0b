//! Shallow conversational heuristics: topic resets and interrupted sender runs

use shadowtrace_core::ParsedMessage;

const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "halo", "hai", "pagi", "siang", "sore", "malam",
];

const FAREWELLS: &[&str] = &["bye", "goodbye", "see you", "sampai", "dah", "dadah"];

const ACKNOWLEDGMENTS: &[&str] = &["ya", "iya", "yes", "no", "tidak", "ok", "oke", "okay"];

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn first_word(text: &str) -> Option<String> {
    words(text).into_iter().next()
}

fn contains_phrase(words: &[String], phrase: &str) -> bool {
    let needle: Vec<&str> = phrase.split(' ').collect();
    words
        .windows(needle.len())
        .any(|w| w.iter().zip(&needle).all(|(a, b)| a == b))
}

/// Reason string when `current` reads like it answers or reopens something
/// that is not in `previous`.
pub fn context_mismatch(previous: &ParsedMessage, current: &ParsedMessage) -> Option<&'static str> {
    let opener = first_word(&current.content)?;
    let prev_words = words(&previous.content);

    if GREETINGS.contains(&opener.as_str()) {
        let prev_is_greeting = prev_words
            .first()
            .is_some_and(|w| GREETINGS.contains(&w.as_str()));
        let prev_said_goodbye = FAREWELLS.iter().any(|f| contains_phrase(&prev_words, f));
        if !prev_said_goodbye && !prev_is_greeting {
            return Some("Abrupt topic change suggests missing context");
        }
    }

    if ACKNOWLEDGMENTS.contains(&opener.as_str()) && !previous.content.contains('?') {
        return Some("Reply without a preceding question suggests missing context");
    }

    None
}

/// Reason string when `messages[index]` continues a run of at least
/// `min_run` messages by the same sender that ends right before it.
pub fn pattern_break(
    messages: &[ParsedMessage],
    index: usize,
    min_run: usize,
    lookback: usize,
) -> Option<String> {
    if index == 0 || index >= messages.len() {
        return None;
    }
    let previous = &messages[index - 1];
    let current = &messages[index];
    if previous.sender != current.sender {
        return None;
    }

    let lower = index.saturating_sub(lookback);
    let run = messages[lower..index]
        .iter()
        .rev()
        .take_while(|m| m.sender == previous.sender)
        .count();

    (run >= min_run).then(|| {
        format!(
            "Same sender ({}) continues after gap - possible response deleted",
            previous.sender
        )
    })
}
