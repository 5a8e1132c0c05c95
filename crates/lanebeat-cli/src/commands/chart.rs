//! Chart command implementation.

use anyhow::{Result, bail};
use lanebeat_core::{ChartGenerator, Difficulty, find_song};

/// Generate a chart for a built-in song or an explicit tempo and length
pub fn run(
    difficulty: Difficulty,
    song: Option<&str>,
    tempo: Option<(f64, f64)>,
    seed: Option<u64>,
    output: Option<&str>,
) -> Result<()> {
    let mut generator = match (song, tempo) {
        (Some(id), _) => {
            let song = find_song(id)?;
            ChartGenerator::new(difficulty, song.bpm, song.duration).song_id(song.id)
        }
        (None, Some((bpm, duration))) => ChartGenerator::new(difficulty, bpm, duration),
        (None, None) => bail!("Either --song or --bpm with --duration is required"),
    };
    if let Some(seed) = seed {
        generator = generator.seed(seed);
    }

    let chart = generator.generate()?;
    let content = serde_json::to_string_pretty(&chart)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, &content)?;
        eprintln!(
            "Wrote {} notes ({} {}) to: {}",
            chart.len(),
            chart.song_id(),
            difficulty,
            output_path
        );
    } else {
        println!("{}", content);
    }

    Ok(())
}
