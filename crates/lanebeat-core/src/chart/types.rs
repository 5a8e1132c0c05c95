use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::chart::Difficulty;
use crate::error::{Error, Result};

/// Default number of input lanes
pub const DEFAULT_LANE_COUNT: u8 = 4;

/// A single chart entry. Immutable once the chart is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Arc<str>,
    /// Seconds from run start
    pub time: f64,
    pub lane: u8,
}

impl Note {
    pub fn new(id: impl Into<Arc<str>>, time: f64, lane: u8) -> Self {
        Self {
            id: id.into(),
            time,
            lane,
        }
    }
}

/// Serialized form of a chart, validated on the way into [`Chart`]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawChart {
    song_id: Arc<str>,
    difficulty: Difficulty,
    duration: f64,
    #[serde(default = "default_lane_count")]
    lane_count: u8,
    notes: Vec<Note>,
}

fn default_lane_count() -> u8 {
    DEFAULT_LANE_COUNT
}

/// Time-ordered notes for one (song, difficulty) pair.
///
/// Construction validates that every note lies within `[0, duration]`,
/// sits in a known lane, and has a unique id. Deserialization goes through
/// the same checks, so an invalid chart can never reach the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawChart", into = "RawChart")]
pub struct Chart {
    song_id: Arc<str>,
    difficulty: Difficulty,
    duration: f64,
    lane_count: u8,
    notes: Vec<Note>,
    index: HashMap<Arc<str>, usize>,
}

impl Chart {
    pub fn new(
        song_id: impl Into<Arc<str>>,
        difficulty: Difficulty,
        duration: f64,
        lane_count: u8,
        mut notes: Vec<Note>,
    ) -> Result<Self> {
        if !duration.is_finite() || duration < 0.0 {
            return Err(Error::InvalidChart(format!(
                "duration must be a non-negative number, got {duration}"
            )));
        }
        if lane_count == 0 {
            return Err(Error::InvalidChart("lane count must be at least 1".into()));
        }

        for note in &notes {
            if !note.time.is_finite() || note.time < 0.0 || note.time > duration {
                return Err(Error::InvalidChart(format!(
                    "note {} at {}s lies outside [0, {}]",
                    note.id, note.time, duration
                )));
            }
            if note.lane >= lane_count {
                return Err(Error::InvalidChart(format!(
                    "note {} uses lane {} but chart has {} lanes",
                    note.id, note.lane, lane_count
                )));
            }
        }

        notes.sort_by(|a, b| a.time.total_cmp(&b.time).then_with(|| a.id.cmp(&b.id)));

        let mut index = HashMap::with_capacity(notes.len());
        for (i, note) in notes.iter().enumerate() {
            if index.insert(note.id.clone(), i).is_some() {
                return Err(Error::InvalidChart(format!("duplicate note id {}", note.id)));
            }
        }

        Ok(Self {
            song_id: song_id.into(),
            difficulty,
            duration,
            lane_count,
            notes,
            index,
        })
    }

    pub fn song_id(&self) -> &str {
        &self.song_id
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Song length in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn lane_count(&self) -> u8 {
        self.lane_count
    }

    /// Notes ordered by target time, then id
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Position of a note in [`Chart::notes`]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.index_of(id).map(|i| &self.notes[i])
    }
}

impl TryFrom<RawChart> for Chart {
    type Error = Error;

    fn try_from(raw: RawChart) -> Result<Self> {
        Chart::new(
            raw.song_id,
            raw.difficulty,
            raw.duration,
            raw.lane_count,
            raw.notes,
        )
    }
}

impl From<Chart> for RawChart {
    fn from(chart: Chart) -> Self {
        Self {
            song_id: chart.song_id,
            difficulty: chart.difficulty,
            duration: chart.duration,
            lane_count: chart.lane_count,
            notes: chart.notes,
        }
    }
}
