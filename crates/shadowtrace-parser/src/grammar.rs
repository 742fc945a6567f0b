//! Ordered line grammars and date-time formats for supported export styles

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// Tried in order; the first grammar whose tokens also yield a timestamp wins
const LINE_GRAMMARS: &[(&str, &str)] = &[
    // 12/01/2024, 10:30 - Sender: text  (also 1/12/24, 10:30 PM)
    (
        "dash",
        r"^(\d{1,2}/\d{1,2}/\d{2,4}),?\s+(\d{1,2}:\d{2}(?::\d{2})?(?:\s*[APap][Mm])?)\s*[-–]\s*([^:]+):\s*(.*)$",
    ),
    // [12/01/2024, 10:30:15] Sender: text
    (
        "bracketed",
        r"^\[(\d{1,2}/\d{1,2}/\d{2,4}),?\s+(\d{1,2}:\d{2}:\d{2})\]\s*([^:]+):\s*(.*)$",
    ),
    // 2024-01-12 10:30:15 - Sender: text
    (
        "iso",
        r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2})\s*[-–]\s*([^:]+):\s*(.*)$",
    ),
];

struct DateTimeFormat {
    pattern: &'static str,
    year_digits: usize,
}

/// First successful parse wins. Year width gates each format since chrono's
/// `%Y` would otherwise accept a two-digit year literally.
const DATETIME_FORMATS: &[DateTimeFormat] = &[
    DateTimeFormat {
        pattern: "%d/%m/%Y %H:%M",
        year_digits: 4,
    },
    DateTimeFormat {
        pattern: "%d/%m/%y %H:%M",
        year_digits: 2,
    },
    DateTimeFormat {
        pattern: "%m/%d/%Y %I:%M %p",
        year_digits: 4,
    },
    DateTimeFormat {
        pattern: "%m/%d/%y %I:%M %p",
        year_digits: 2,
    },
    DateTimeFormat {
        pattern: "%Y-%m-%d %H:%M:%S",
        year_digits: 4,
    },
    DateTimeFormat {
        pattern: "%d/%m/%Y %H:%M:%S",
        year_digits: 4,
    },
    DateTimeFormat {
        pattern: "%d/%m/%y %H:%M:%S",
        year_digits: 2,
    },
];

static COMPILED_GRAMMARS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn grammars() -> &'static [(&'static str, Regex)] {
    COMPILED_GRAMMARS.get_or_init(|| {
        LINE_GRAMMARS
            .iter()
            .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
            .collect()
    })
}

/// A line recognized as the start of a new message
#[derive(Debug, Clone, PartialEq)]
pub struct LineMatch<'a> {
    pub grammar: &'static str,
    pub timestamp: NaiveDateTime,
    pub sender: &'a str,
    pub content: &'a str,
}

/// Try every grammar in order against a single (already trimmed) line
pub fn match_line(line: &str) -> Option<LineMatch<'_>> {
    for (name, re) in grammars() {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let (Some(date), Some(time), Some(sender)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            continue;
        };
        let content = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        if let Some(timestamp) = parse_datetime(date.as_str(), time.as_str()) {
            return Some(LineMatch {
                grammar: name,
                timestamp,
                sender: sender.as_str().trim(),
                content,
            });
        }
    }
    None
}

/// Parse date and time tokens against the ordered format list
pub fn parse_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let digits = year_digits(date);
    let combined = format!("{} {}", date.trim(), normalize_time(time));

    DATETIME_FORMATS
        .iter()
        .filter(|f| f.year_digits == digits)
        .find_map(|f| NaiveDateTime::parse_from_str(&combined, f.pattern).ok())
}

fn year_digits(date: &str) -> usize {
    let year = if date.contains('-') {
        date.split('-').next()
    } else {
        date.rsplit('/').next()
    };
    year.map(|y| y.trim().len()).unwrap_or(0)
}

/// `10:30pm` -> `10:30 PM`
fn normalize_time(time: &str) -> String {
    let time = time.trim();
    let upper = time.to_ascii_uppercase();
    if upper.ends_with("AM") || upper.ends_with("PM") {
        let (clock, meridiem) = upper.split_at(upper.len() - 2);
        format!("{} {}", clock.trim_end(), meridiem)
    } else {
        time.to_string()
    }
}
