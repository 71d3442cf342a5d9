use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use buzzer_core::log_buffer::LOG_BUFFER_CAPACITY;
use buzzer_core::{ContinuousBuzzer, EmitterConfig, ToneOutput, consts};
use clap::Parser;
use log::{Level, LevelFilter};

mod buzzer;
mod log_capture;

use crate::buzzer::{DesktopTone, MutedTone};

/// Play a continuous buzzer tone for a number of signal cycles.
#[derive(Parser, Debug)]
#[command(name = "buzzer-desktop")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Tone frequency in Hz
    #[arg(short, long, env = "BUZZER_FREQUENCY_HZ", default_value_t = consts::DEFAULT_FREQUENCY_HZ)]
    frequency: f64,

    /// Length of each burst in milliseconds
    #[arg(long, env = "BUZZER_BURST_MS", default_value_t = consts::DEFAULT_BURST_DURATION_MS)]
    burst_ms: f64,

    /// Pause between bursts in milliseconds
    #[arg(long, env = "BUZZER_PAUSE_MS", default_value_t = consts::DEFAULT_PAUSE_DURATION_MS)]
    pause_ms: u32,

    /// How many times to play the signal
    #[arg(short, long, default_value_t = 1)]
    cycles: u32,

    /// How long the signal plays in each cycle, in milliseconds
    #[arg(long, default_value_t = 1000)]
    play_ms: u64,

    /// Silence after each cycle, in milliseconds
    #[arg(long, default_value_t = 500)]
    rest_ms: u64,

    /// Time the bursts without opening an audio device
    #[arg(long)]
    mute: bool,

    /// Console log level (error, warn, info, debug, trace)
    #[arg(long, env = "BUZZER_LOG", default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    /// Least severe level repeated in the summary at exit
    #[arg(long, default_value_t = Level::Warn)]
    capture_level: Level,
}

impl Cli {
    fn emitter_config(&self) -> EmitterConfig {
        EmitterConfig {
            burst_duration_ms: self.burst_ms,
            pause_duration_ms: self.pause_ms,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    log_capture::init(cli.log_level, cli.capture_level);

    let output: Arc<dyn ToneOutput> = if cli.mute {
        Arc::new(MutedTone)
    } else {
        Arc::new(DesktopTone::new().context("Failed to open audio output")?)
    };

    let mut buzzer = ContinuousBuzzer::with_config(output, cli.emitter_config());
    buzzer.set_on_play(|| log::debug!("Signal playing"));
    buzzer.set_on_stop(|| log::debug!("Signal stopped"));

    let result = run_cycles(&mut buzzer, &cli);

    let captured = log_capture::recent_log_entries(LOG_BUFFER_CAPACITY);
    if !captured.is_empty() {
        eprintln!("{} captured log line(s) during the session:", captured.len());
        for entry in captured.iter().rev() {
            eprintln!("  {} {}", entry.level, entry.message);
        }
    }

    result
}

fn run_cycles(buzzer: &mut ContinuousBuzzer, cli: &Cli) -> Result<()> {
    for cycle in 1..=cli.cycles {
        log::info!("Sampling signal, cycle {}/{}", cycle, cli.cycles);

        buzzer
            .start(cli.frequency)
            .context("Failed to start buzzer")?;
        thread::sleep(Duration::from_millis(cli.play_ms));
        buzzer.stop();
        buzzer.wait().context("Buzzer stopped unexpectedly")?;

        if cycle < cli.cycles {
            thread::sleep(Duration::from_millis(cli.rest_ms));
        }
    }

    log::info!("Sampling finished");
    Ok(())
}
