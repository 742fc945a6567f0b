//! Synthetic chat exports with planted gaps, for demos and benchmarks

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const SENDERS: [&str; 4] = ["Alice", "Bob", "Charlie", "Diana"];
const DELETION_PAIR: [&str; 2] = ["Pejabat A", "Pejabat B"];

pub const EXPORT_HEADER: &str =
    "Messages and calls are end-to-end encrypted. No one outside of this chat can read or listen to them.";
pub const DELETED_MARKER: &str = "Pesan ini telah dihapus.";

/// Messages kept clear of planted gaps at either end
const EDGE_MARGIN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Topic {
    Negotiation,
    Planning,
    Casual,
    Suspicious,
}

impl Topic {
    const ORDINARY: [Topic; 3] = [Topic::Negotiation, Topic::Planning, Topic::Casual];

    fn lines(self) -> &'static [&'static str] {
        match self {
            Topic::Negotiation => &[
                "Kita perlu bicarakan angka ini",
                "Berapa yang bisa kamu tawarkan?",
                "Saya rasa 500 juta terlalu rendah",
                "Mari kita temui di tengah",
                "Oke, saya setuju dengan syaratnya",
                "Kirimkan kontraknya nanti",
            ],
            Topic::Planning => &[
                "Kapan kita bisa meeting?",
                "Bagaimana kalau Jumat?",
                "Jam 3 sore bisa?",
                "Oke fix, kita ketemu di kantor",
                "Jangan lupa bawa dokumennya",
                "Sudah saya siapkan semuanya",
            ],
            Topic::Casual => &[
                "Halo, apa kabar?",
                "Baik, kamu gimana?",
                "Sibuk banget minggu ini",
                "Sama, deadline mepet",
                "Semangat ya!",
                "Thanks, kamu juga",
            ],
            Topic::Suspicious => &[
                "Jangan bicarakan ini di telepon",
                "Hapus semua chat setelah ini",
                "Kita ketemu langsung saja",
                "Pastikan tidak ada yang tahu",
                "Ini harus rahasia",
                "Oke, saya mengerti",
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub messages: usize,
    pub gaps: usize,
    /// Chance of a deletion marker at each planted gap is one half
    pub include_deletions: bool,
    /// Messages right after a planted gap use the suspicious topic
    pub include_suspicious: bool,
    pub start: NaiveDateTime,
}

impl SynthConfig {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            messages: 100,
            gaps: 5,
            include_deletions: true,
            include_suspicious: true,
            start,
        }
    }
}

pub struct SyntheticChat {
    rng: StdRng,
}

impl SyntheticChat {
    /// Same seed and config produce the same transcript
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Up to `count` distinct positions in [EDGE_MARGIN, total - EDGE_MARGIN)
    fn positions(&mut self, total: usize, count: usize, margin: usize) -> HashSet<usize> {
        let span = total.saturating_sub(2 * margin);
        let count = count.min(span);
        rand::seq::index::sample(&mut self.rng, span, count)
            .into_iter()
            .map(|i| i + margin)
            .collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// Multi-party chat with 2-6 hour silences, some preceded by a deletion marker
    pub fn generate(&mut self, config: &SynthConfig) -> String {
        let mut senders: Vec<&str> = SENDERS.to_vec();
        senders.shuffle(&mut self.rng);
        senders.truncate(3);

        let gap_positions = self.positions(config.messages, config.gaps, EDGE_MARGIN);
        let mut lines = vec![EXPORT_HEADER.to_string()];
        let mut now = config.start;

        for i in 0..config.messages {
            let planted = gap_positions.contains(&i);
            if planted {
                now += Duration::minutes(self.rng.gen_range(120..=360));
                if config.include_deletions && self.rng.gen_bool(0.5) {
                    let sender = self.pick(&senders);
                    lines.push(format_line(now, sender, DELETED_MARKER));
                    now += Duration::seconds(self.rng.gen_range(5..=30));
                }
            } else {
                now += Duration::seconds(self.rng.gen_range(30..=900));
            }

            let topic = if config.include_suspicious && planted {
                Topic::Suspicious
            } else {
                *Topic::ORDINARY.choose(&mut self.rng).unwrap_or(&Topic::Casual)
            };

            let sender = self.pick(&senders);
            let mut content = self.pick(topic.lines()).to_string();
            if self.rng.gen_bool(0.3) {
                content.push(' ');
                content.push_str(self.pick(topic.lines()));
            }
            lines.push(format_line(now, sender, &content));
        }

        lines.join("\n")
    }

    /// Evenly paced two-party chat where `deletions` messages were replaced
    /// by the deletion marker
    pub fn generate_with_deletions(
        &mut self,
        messages: usize,
        deletions: usize,
        start: NaiveDateTime,
    ) -> String {
        let positions = self.positions(messages, deletions, 5);
        let mut lines = Vec::with_capacity(messages);
        let mut now = start;

        for i in 0..messages {
            now += Duration::seconds(self.rng.gen_range(60..=300));
            let sender = DELETION_PAIR[i % 2];
            let content = if positions.contains(&i) {
                DELETED_MARKER
            } else {
                let topic = if self.rng.gen_bool(0.5) {
                    Topic::Negotiation
                } else {
                    Topic::Planning
                };
                self.pick(topic.lines())
            };
            lines.push(format_line(now, sender, content));
        }

        lines.join("\n")
    }
}

fn format_line(timestamp: NaiveDateTime, sender: &str, content: &str) -> String {
    format!("{} - {}: {}", timestamp.format("%d/%m/%Y, %H:%M"), sender, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_seeded_output_is_reproducible() {
        let config = SynthConfig::new(start());
        let a = SyntheticChat::new(Some(42)).generate(&config);
        let b = SyntheticChat::new(Some(42)).generate(&config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_transcript_parses() {
        let config = SynthConfig::new(start());
        let text = SyntheticChat::new(Some(7)).generate(&config);
        let outcome = shadowtrace_parser::parse(&text);

        assert!(outcome.messages.len() >= 100);
        assert!(outcome.messages.len() <= 105);
        assert_eq!(outcome.errors.len(), 1, "only the export header is unparsed");
        assert!(outcome.participants.len() <= 3);
    }

    #[test]
    fn test_planted_silences() {
        let mut config = SynthConfig::new(start());
        config.include_deletions = false;
        let text = SyntheticChat::new(Some(3)).generate(&config);
        let outcome = shadowtrace_parser::parse(&text);
        assert_eq!(outcome.messages.len(), 100);

        let long_silences = outcome
            .messages
            .windows(2)
            .filter(|pair| (pair[1].timestamp - pair[0].timestamp).num_seconds() >= 2 * 3600)
            .count();
        assert_eq!(long_silences, 5);

        let gaps = shadowtrace_gaps::detect_all(&outcome.messages);
        assert!(gaps.iter().all(|g| g.after_seq == g.before_seq + 1));
    }

    #[test]
    fn test_deletions_only_transcript() {
        let text = SyntheticChat::new(Some(11)).generate_with_deletions(50, 5, start());
        let outcome = shadowtrace_parser::parse(&text);
        assert_eq!(outcome.messages.len(), 50);
        assert_eq!(outcome.stats().deleted_count, 5);
        assert_eq!(outcome.participants, vec!["Pejabat A", "Pejabat B"]);
    }

    #[test]
    fn test_short_transcript_has_no_planted_gaps() {
        let mut config = SynthConfig::new(start());
        config.messages = 12;
        let text = SyntheticChat::new(Some(1)).generate(&config);
        let outcome = shadowtrace_parser::parse(&text);
        assert_eq!(outcome.messages.len(), 12);
    }
}
