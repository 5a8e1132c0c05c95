//! Play command implementation.

use anyhow::{Context, Result};
use lanebeat_core::{Difficulty, Driver, Engine, HighScores, Tier, find_song};
use serde::Serialize;
use tracing::{info, warn};

use super::{load_config, print_summary};
use crate::autoplay::AutoPlayer;

pub struct PlayOptions<'a> {
    pub difficulty: Difficulty,
    pub song: &'a str,
    pub accuracy_ms: f64,
    pub miss_rate: f64,
    pub seed: u64,
    pub config: Option<&'a str>,
    pub scores: &'a str,
    pub json: bool,
}

#[derive(Serialize)]
struct PlayReport<'a> {
    #[serde(flatten)]
    summary: &'a lanebeat_core::RunSummary,
    high_score: u32,
    is_new_high_score: bool,
}

/// Play a built-in song with the simulated player and record the result
pub fn run(options: PlayOptions<'_>) -> Result<()> {
    let config = load_config(options.config)?;
    let song = find_song(options.song)?;
    let chart = song.chart(options.difficulty)?;
    let player = AutoPlayer::new(options.accuracy_ms, options.miss_rate, options.seed)?;
    let taps = player.taps(&chart);

    if !options.json {
        println!(
            "{} [{}] - {} notes, {} BPM",
            song.title,
            options.difficulty.expand_name(),
            chart.len(),
            song.bpm
        );
    }

    let mut driver = Driver::new(Engine::new(chart, config)?);
    let mut miss_streak = 0u32;
    let summary = driver.run_with(&taps, |event| {
        if event.tier == Tier::Miss {
            miss_streak += 1;
            if miss_streak == 5 {
                warn!("Five misses in a row at {:.2}s", event.time);
            }
        } else {
            miss_streak = 0;
        }
    })?;

    let mut scores = HighScores::load(options.scores)
        .with_context(|| format!("Failed to load high scores from {}", options.scores))?;
    let is_new_high_score = scores.record(&summary);
    if is_new_high_score {
        scores
            .save(options.scores)
            .with_context(|| format!("Failed to save high scores to {}", options.scores))?;
        info!("Saved high scores to {}", options.scores);
    }
    let high_score = scores.best_score(summary.difficulty);

    if options.json {
        let report = PlayReport {
            summary: &summary,
            high_score,
            is_new_high_score,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&summary);
        if is_new_high_score {
            println!("NEW HIGH SCORE!");
        } else {
            println!("High score: {}", high_score);
        }
    }

    Ok(())
}
