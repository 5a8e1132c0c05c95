use serde::Serialize;

use crate::chart::{Chart, ChartGenerator, Difficulty};
use crate::error::{Error, Result};

/// Song metadata needed to build a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongInfo {
    pub id: &'static str,
    pub title: &'static str,
    pub bpm: f64,
    /// Audio length in seconds
    pub duration: f64,
}

impl SongInfo {
    /// Build the chart for this song at the given difficulty
    pub fn chart(&self, difficulty: Difficulty) -> Result<Chart> {
        ChartGenerator::new(difficulty, self.bpm, self.duration)
            .song_id(self.id)
            .generate()
    }
}

const SONGS: &[SongInfo] = &[
    SongInfo {
        id: "zuizui_rock",
        title: "Zuizui Song (Japanese Rock)",
        bpm: 82.0,
        duration: 206.0,
    },
    SongInfo {
        id: "zuizui_anime",
        title: "Zuizui Song 2025 (Anime)",
        bpm: 76.0,
        duration: 192.0,
    },
    SongInfo {
        id: "practice",
        title: "Practice",
        bpm: 80.0,
        duration: 60.0,
    },
];

/// All built-in songs
pub fn catalog() -> &'static [SongInfo] {
    SONGS
}

pub fn find_song(id: &str) -> Result<&'static SongInfo> {
    SONGS
        .iter()
        .find(|song| song.id == id)
        .ok_or_else(|| Error::UnknownSong(id.to_string()))
}
