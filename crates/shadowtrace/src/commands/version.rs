pub fn run() -> anyhow::Result<()> {
    println!("shadowtrace {}", env!("CARGO_PKG_VERSION"));
    println!("Chat transcript gap forensics");
    Ok(())
}
