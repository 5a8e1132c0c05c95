use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chart::Difficulty;
use crate::config::ScoringMode;
use crate::score::{ComboEffect, Grade, Judgement, Tier};

/// Per-tier judgement counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub perfect: u32,
    pub good: u32,
    pub normal: u32,
    pub miss: u32,
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Perfect => self.perfect,
            Tier::Good => self.good,
            Tier::Normal => self.normal,
            Tier::Miss => self.miss,
        }
    }

    fn increment(&mut self, tier: Tier) {
        let slot = match tier {
            Tier::Perfect => &mut self.perfect,
            Tier::Good => &mut self.good,
            Tier::Normal => &mut self.normal,
            Tier::Miss => &mut self.miss,
        };
        *slot += 1;
    }

    /// Non-miss judgements
    pub fn hits(&self) -> u32 {
        self.perfect + self.good + self.normal
    }

    pub fn total(&self) -> u32 {
        self.hits() + self.miss
    }
}

/// Live score and combo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreSnapshot {
    pub score: u32,
    pub combo: u32,
}

/// Mutable run aggregate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunState {
    pub score: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub counts: TierCounts,
    /// Sum of unscaled tier points, used for accuracy
    pub base_points: u32,
}

/// Final, immutable result of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub song_id: Arc<str>,
    pub difficulty: Difficulty,
    pub score: u32,
    #[serde(flatten)]
    pub counts: TierCounts,
    pub max_combo: u32,
    pub total_notes: u32,
    /// Percentage of the maximum base points, 0-100
    pub accuracy: f64,
    pub grade: Grade,
    pub full_combo: bool,
}

/// Accumulates judgements and produces the run summary.
///
/// `finalize` builds the summary on first call and returns the cached value
/// afterwards. Judgements reported after finalization are dropped.
#[derive(Debug, Clone)]
pub struct RunTracker {
    song_id: Arc<str>,
    difficulty: Difficulty,
    total_notes: u32,
    /// Points for a Perfect, the per-note maximum before combo scaling
    max_note_points: u32,
    scoring: ScoringMode,
    state: RunState,
    summary: Option<RunSummary>,
}

impl RunTracker {
    pub fn new(
        song_id: Arc<str>,
        difficulty: Difficulty,
        total_notes: u32,
        max_note_points: u32,
        scoring: ScoringMode,
    ) -> Self {
        Self {
            song_id,
            difficulty,
            total_notes,
            max_note_points,
            scoring,
            state: RunState::default(),
            summary: None,
        }
    }

    /// Apply one judgement. Returns the points awarded.
    pub fn report(&mut self, judgement: &Judgement) -> u32 {
        if self.summary.is_some() {
            warn!("Judgement {} reported after run end, ignoring", judgement.tier);
            return 0;
        }

        let state = &mut self.state;
        state.counts.increment(judgement.tier);

        match judgement.combo {
            ComboEffect::Reset => {
                state.combo = 0;
                0
            }
            ComboEffect::Increment => {
                state.combo += 1;
                state.max_combo = state.max_combo.max(state.combo);
                let awarded = self.scoring.award(judgement.points, state.combo);
                state.score = state.score.saturating_add(awarded);
                state.base_points = state.base_points.saturating_add(judgement.points);
                awarded
            }
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            score: self.state.score,
            combo: self.state.combo,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.summary.is_some()
    }

    /// Build the summary once; later calls return the same value.
    pub fn finalize(&mut self) -> RunSummary {
        let summary = match self.summary.take() {
            Some(summary) => summary,
            None => {
                let summary = self.build_summary();
                info!(
                    "Run finished: {} {} score={} P/G/N/M={}/{}/{}/{} max_combo={} ({})",
                    summary.song_id,
                    summary.difficulty,
                    summary.score,
                    summary.counts.perfect,
                    summary.counts.good,
                    summary.counts.normal,
                    summary.counts.miss,
                    summary.max_combo,
                    summary.grade
                );
                summary
            }
        };
        self.summary = Some(summary.clone());
        summary
    }

    /// Clear all progress for a new attempt
    pub fn reset(&mut self) {
        self.state = RunState::default();
        self.summary = None;
    }

    fn build_summary(&self) -> RunSummary {
        let state = &self.state;
        // Stray-tap misses count against accuracy too
        let judged = state.counts.total().max(self.total_notes);
        let max_points = judged as u64 * self.max_note_points as u64;

        let (accuracy, grade) = if judged == 0 || max_points == 0 {
            (0.0, Grade::NoPlay)
        } else {
            let ratio = state.base_points as f64 / max_points as f64;
            (ratio * 100.0, Grade::from_accuracy(ratio))
        };

        RunSummary {
            song_id: self.song_id.clone(),
            difficulty: self.difficulty,
            score: state.score,
            counts: state.counts,
            max_combo: state.max_combo,
            total_notes: self.total_notes,
            accuracy,
            grade,
            full_combo: self.total_notes > 0 && state.counts.miss == 0,
        }
    }
}
