//! CLI argument definitions for lanebeat.

use clap::{Parser, Subcommand};
use lanebeat_core::Difficulty;

#[derive(Parser)]
#[command(name = "lanebeat")]
#[command(about = "Rhythm game chart generator and judgement engine", version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a chart and print it as JSON
    Chart {
        /// easy, normal or hard
        #[arg(short, long)]
        difficulty: Difficulty,
        /// Built-in song id (see `songs`)
        #[arg(long, conflicts_with_all = ["bpm", "duration"], required_unless_present = "bpm")]
        song: Option<String>,
        /// Tempo in beats per minute
        #[arg(long, requires = "duration")]
        bpm: Option<f64>,
        /// Song length in seconds
        #[arg(long, requires = "bpm")]
        duration: Option<f64>,
        /// Override the derived seed
        #[arg(long)]
        seed: Option<u64>,
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Play a song with the simulated player
    Play {
        #[arg(short, long, default_value = "normal")]
        difficulty: Difficulty,
        /// Built-in song id
        #[arg(long, default_value = "practice")]
        song: String,
        /// Maximum timing error of the simulated player
        #[arg(long, default_value = "60")]
        accuracy_ms: f64,
        /// Probability of skipping a note (0.0 - 1.0)
        #[arg(long, default_value = "0.05")]
        miss_rate: f64,
        /// Seed for the simulated player
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Engine config file (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<String>,
        /// High score file (JSON)
        #[arg(long, value_name = "FILE", default_value = "highscores.json")]
        scores: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a recorded tap log against a chart
    Replay {
        /// Chart file (JSON, as written by `chart`)
        #[arg(long, value_name = "FILE")]
        chart: String,
        /// Tap log file (JSON array of {lane, time})
        #[arg(long, value_name = "FILE")]
        taps: String,
        /// Engine config file (JSON)
        #[arg(short, long, value_name = "FILE")]
        config: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List built-in songs
    Songs,
}
