use std::fs::File;

use anyhow::{Context, Result};
use clap::Parser;

use flappy_session::app;
use flappy_session::config::Config;

fn init_logging(config: &Config) -> Result<()> {
    // stderr belongs to the terminal frame, so logs only go to a file
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("could not create log file {}", path.display()))?;
    env_logger::builder()
        .filter_level(config.log_level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config)?;
    app::run(&config).context("terminal session failed")
}
