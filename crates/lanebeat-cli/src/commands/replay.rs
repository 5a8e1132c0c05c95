//! Replay command implementation.

use anyhow::{Context, Result};
use lanebeat_core::{Chart, Driver, Engine, TapEvent};
use tracing::info;

use super::{load_config, print_summary};

/// Replay a tap log against a chart file
pub fn run(chart_path: &str, taps_path: &str, config: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config)?;

    let content = std::fs::read_to_string(chart_path)
        .with_context(|| format!("Failed to read chart {}", chart_path))?;
    let chart: Chart = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse chart {}", chart_path))?;

    let content = std::fs::read_to_string(taps_path)
        .with_context(|| format!("Failed to read tap log {}", taps_path))?;
    let taps: Vec<TapEvent> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse tap log {}", taps_path))?;

    info!(
        "Replaying {} taps against {} {} ({} notes)",
        taps.len(),
        chart.song_id(),
        chart.difficulty(),
        chart.len()
    );

    let mut driver = Driver::new(Engine::new(chart, config)?);
    let summary = driver.run(&taps)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    Ok(())
}
