//! Content classification: deletion, system notice, media placeholder, text

use regex::RegexSet;
use shadowtrace_core::MessageType;
use std::sync::OnceLock;

static DELETED_MARKERS: OnceLock<RegexSet> = OnceLock::new();
static SYSTEM_MARKERS: OnceLock<RegexSet> = OnceLock::new();
static MEDIA_MARKERS: OnceLock<RegexSet> = OnceLock::new();

fn deleted_markers() -> &'static RegexSet {
    DELETED_MARKERS.get_or_init(|| {
        RegexSet::new([
            r"(?i)^this message was deleted\.?$",
            r"(?i)^you deleted this message\.?$",
            r"(?i)^pesan ini telah dihapus\.?$",
        ])
        .unwrap()
    })
}

fn system_markers() -> &'static RegexSet {
    SYSTEM_MARKERS.get_or_init(|| {
        RegexSet::new([
            r"(?i)messages and calls are end-to-end encrypted",
            r"(?i)created group",
            r"(?i)added you",
            r"(?i)changed the subject",
            r"(?i)left the group",
            r"(?i)removed \w+",
        ])
        .unwrap()
    })
}

fn media_markers() -> &'static RegexSet {
    MEDIA_MARKERS.get_or_init(|| {
        RegexSet::new([
            r"(?i)<media omitted>",
            r"(?i)\(file attached\)",
            r"(?i)image omitted",
            r"(?i)video omitted",
            r"(?i)audio omitted",
            r"(?i)gif omitted",
            r"(?i)sticker omitted",
        ])
        .unwrap()
    })
}

/// Classify the first line of a message. Deletion wins over system, system over media.
pub fn classify_content(content: &str) -> MessageType {
    let content = content.trim();
    if deleted_markers().is_match(content) {
        MessageType::Deleted
    } else if system_markers().is_match(content) {
        MessageType::System
    } else if media_markers().is_match(content) {
        MessageType::Media
    } else {
        MessageType::Text
    }
}
