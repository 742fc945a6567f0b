use shadowtrace_infer::InferenceEngine;

use super::load_settings;

pub fn run() -> anyhow::Result<()> {
    let settings = load_settings(false)?;
    let info = InferenceEngine::from_settings(&settings).backend_info();

    println!("Inference backend");
    println!("  implementation: {}", info.implementation);
    println!("  model:          {}", info.model);
    println!("  mock:           {}", info.is_mock);
    println!("  settings:       {:?}", settings);
    Ok(())
}
