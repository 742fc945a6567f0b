//! Read-only descriptive analytics over a parsed transcript

mod anomalies;
mod engine;
mod patterns;
mod sender;

pub use anomalies::Anomaly;
pub use engine::{
    analyze_all_senders, detect_activity_patterns, find_anomalies, get_summary, DateRange,
    MetadataEngine, TranscriptSummary,
};
pub use patterns::{Burst, ConversationPattern, PatternDetail};
pub use sender::SenderProfile;
