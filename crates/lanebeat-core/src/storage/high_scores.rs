use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chart::Difficulty;
use crate::error::Result;
use crate::play::RunSummary;
use crate::score::Grade;

/// Best run recorded for one difficulty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub song_id: Arc<str>,
    pub max_combo: u32,
    pub grade: Grade,
    pub achieved_at: DateTime<Utc>,
}

/// Per-difficulty best scores.
///
/// Scores only ever go up: a run replaces the stored entry when its score is
/// strictly higher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    db: BTreeMap<Difficulty, HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON file. A missing file is an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No high score file at {:?}, starting empty", path);
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path)?;
        let scores = serde_json::from_str(&content)?;
        Ok(scores)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn best(&self, difficulty: Difficulty) -> Option<&HighScoreEntry> {
        self.db.get(&difficulty)
    }

    /// Best score for `difficulty`, 0 when nothing is recorded
    pub fn best_score(&self, difficulty: Difficulty) -> u32 {
        self.best(difficulty).map_or(0, |entry| entry.score)
    }

    /// Record a finished run. Returns true if it set a new best.
    pub fn record(&mut self, summary: &RunSummary) -> bool {
        self.record_at(summary, Utc::now())
    }

    pub fn record_at(&mut self, summary: &RunSummary, achieved_at: DateTime<Utc>) -> bool {
        let previous = self.best_score(summary.difficulty);
        let is_new_best = match self.db.get(&summary.difficulty) {
            Some(entry) => summary.score > entry.score,
            None => summary.score > 0,
        };
        if !is_new_best {
            return false;
        }

        info!(
            "New {} high score: {} (was {})",
            summary.difficulty, summary.score, previous
        );
        self.db.insert(
            summary.difficulty,
            HighScoreEntry {
                score: summary.score,
                song_id: summary.song_id.clone(),
                max_combo: summary.max_combo,
                grade: summary.grade,
                achieved_at,
            },
        );
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Difficulty, &HighScoreEntry)> {
        self.db.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}
