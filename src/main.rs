use anchorstage::StageConfig;
use anyhow::Result;

mod demo;
mod engine;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => StageConfig::load(path)?,
        None => StageConfig::default(),
    };

    let mut state = demo::DemoState::new(&config)?;

    while !state.finished() {
        engine::update(&mut state)?;
    }

    Ok(())
}
