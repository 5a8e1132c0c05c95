//! Songs command implementation.

use anyhow::Result;
use lanebeat_core::catalog;

pub fn run() -> Result<()> {
    println!("{:<14} {:>5} {:>8}  Title", "ID", "BPM", "Length");
    for song in catalog() {
        let minutes = (song.duration / 60.0).floor();
        let seconds = song.duration - minutes * 60.0;
        println!(
            "{:<14} {:>5} {:>5}:{:02}  {}",
            song.id, song.bpm, minutes, seconds as u32, song.title
        );
    }
    Ok(())
}
