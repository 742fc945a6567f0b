use chrono::{Duration, NaiveDate, NaiveDateTime};

pub const DELETED_MARKER: &str = "Pesan ini telah dihapus.";

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn line(ts: NaiveDateTime, sender: &str, content: &str) -> String {
    format!("{} - {}: {}", ts.format("%d/%m/%Y, %H:%M"), sender, content)
}

/// Two-party chat at a steady five-minute pace with one long silence after
/// message `silence_after` and a deletion marker at `deleted_at` (1-based)
pub fn sample_transcript(total: u32, silence_after: u32, deleted_at: u32) -> String {
    let mut lines = vec![
        "Messages and calls are end-to-end encrypted. No one outside of this chat can read or listen to them."
            .to_string(),
    ];
    let mut now = start();
    for seq in 1..=total {
        if seq > 1 {
            now += if seq == silence_after + 1 {
                Duration::hours(6)
            } else {
                Duration::minutes(5)
            };
        }
        let sender = if seq % 2 == 1 { "Rina" } else { "Budi" };
        let content = if seq == deleted_at {
            DELETED_MARKER.to_string()
        } else {
            format!("update {} on the shipment schedule", seq)
        };
        lines.push(line(now, sender, &content));
    }
    lines.join("\n")
}
