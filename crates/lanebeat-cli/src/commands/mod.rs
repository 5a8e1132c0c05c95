//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod chart;
pub mod play;
pub mod replay;
pub mod songs;

use anyhow::{Context, Result};
use lanebeat_core::{EngineConfig, RunSummary};

/// Load an engine config file, or the defaults when none is given
pub fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load engine config from {}", path)),
        None => Ok(EngineConfig::default()),
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("=== Result ===");
    println!("Song:       {} [{}]", summary.song_id, summary.difficulty.expand_name());
    println!("Score:      {}", summary.score);
    println!("Grade:      {}", summary.grade);
    println!("Accuracy:   {:.2}%", summary.accuracy);
    println!(
        "Max combo:  {}{}",
        summary.max_combo,
        if summary.full_combo { " (FULL COMBO)" } else { "" }
    );
    println!(
        "PERFECT {} / GOOD {} / NORMAL {} / MISS {}",
        summary.counts.perfect, summary.counts.good, summary.counts.normal, summary.counts.miss
    );
}
