use chrono::{Duration, Local, Timelike};

use crate::synth::{SynthConfig, SyntheticChat};

pub fn run(messages: usize, gaps: usize, seed: Option<u64>, deletions_only: bool) -> anyhow::Result<()> {
    let now = Local::now().naive_local();
    let now = now.with_second(0).unwrap_or(now);
    let mut generator = SyntheticChat::new(seed);

    let text = if deletions_only {
        generator.generate_with_deletions(messages, gaps, now - Duration::days(7))
    } else {
        let mut config = SynthConfig::new(now - Duration::days(30));
        config.messages = messages;
        config.gaps = gaps;
        generator.generate(&config)
    };

    println!("{}", text);
    Ok(())
}
