//! Line-oriented parser for exported chat transcripts

mod classify;
mod grammar;
mod parser;

pub use classify::classify_content;
pub use grammar::{match_line, parse_datetime, LineMatch};
pub use parser::{parse, ParseError, ParseOutcome, ParseStats, TranscriptParser};
