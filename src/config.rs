use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

/// A Flappy Bird clone that runs in your terminal.
///
/// Enter or Space presses the play button and flaps, P pauses, Q quits.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(version, about)]
pub struct Config {
    /// Frames per second to pace the game loop at.
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Run without sound.
    #[arg(long)]
    pub mute: bool,

    /// Write logs to this file (nothing is logged otherwise).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log level used with --log-file; RUST_LOG overrides it.
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Multiplier on the background scroll speed.
    #[arg(long, default_value_t = 1.0, value_parser = parse_scroll_speed)]
    pub scroll_speed: f64,
}

fn parse_scroll_speed(s: &str) -> Result<f64, String> {
    let speed: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if speed.is_finite() && speed >= 0.0 {
        Ok(speed)
    } else {
        Err(format!("{speed} is not a finite, non-negative speed"))
    }
}

impl Config {
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps))
    }
}
