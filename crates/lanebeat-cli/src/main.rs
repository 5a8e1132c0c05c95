mod autoplay;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // Log to stderr so JSON on stdout stays clean
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lanebeat=info,lanebeat_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Chart {
            difficulty,
            song,
            bpm,
            duration,
            seed,
            output,
        } => commands::chart::run(
            difficulty,
            song.as_deref(),
            bpm.zip(duration),
            seed,
            output.as_deref(),
        ),
        Command::Play {
            difficulty,
            song,
            accuracy_ms,
            miss_rate,
            seed,
            config,
            scores,
            json,
        } => commands::play::run(commands::play::PlayOptions {
            difficulty,
            song: &song,
            accuracy_ms,
            miss_rate,
            seed,
            config: config.as_deref(),
            scores: &scores,
            json,
        }),
        Command::Replay {
            chart,
            taps,
            config,
            json,
        } => commands::replay::run(&chart, &taps, config.as_deref(), json),
        Command::Songs => commands::songs::run(),
    }
}
