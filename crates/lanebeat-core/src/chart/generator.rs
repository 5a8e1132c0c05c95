//! Deterministic chart generation.
//!
//! Notes are laid out on a beat grid whose density depends on the difficulty.
//! Every random decision is drawn from a `ChaCha8Rng` seeded from the inputs,
//! so the same (difficulty, bpm, duration) always produces the same chart.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::chart::{Chart, DEFAULT_LANE_COUNT, Difficulty, Note};
use crate::error::{Error, Result};

/// Songs shorter than this produce an empty chart
pub const MIN_CHART_DURATION: f64 = 1.0;

/// Beats of silence before the first note (one bar)
pub const LEAD_IN_BEATS: f64 = 4.0;

/// Song id used when the caller does not name one
pub const DEFAULT_SONG_ID: &str = "generated";

/// Upper bound on beat grid slots in one chart. A tempo that needs more is
/// rejected instead of laid out.
pub const MAX_GRID_SLOTS: u64 = 100_000;

/// Generate a chart with default lane count and a seed derived from the inputs
pub fn generate(difficulty: Difficulty, bpm: f64, duration: f64) -> Result<Chart> {
    ChartGenerator::new(difficulty, bpm, duration).generate()
}

/// Chart generator with optional overrides
#[derive(Debug, Clone)]
pub struct ChartGenerator {
    difficulty: Difficulty,
    bpm: f64,
    duration: f64,
    lane_count: u8,
    song_id: Arc<str>,
    seed: Option<u64>,
}

impl ChartGenerator {
    pub fn new(difficulty: Difficulty, bpm: f64, duration: f64) -> Self {
        Self {
            difficulty,
            bpm,
            duration,
            lane_count: DEFAULT_LANE_COUNT,
            song_id: Arc::from(DEFAULT_SONG_ID),
            seed: None,
        }
    }

    pub fn song_id(mut self, song_id: impl Into<Arc<str>>) -> Self {
        self.song_id = song_id.into();
        self
    }

    pub fn lane_count(mut self, lane_count: u8) -> Self {
        self.lane_count = lane_count;
        self
    }

    /// Replace the derived seed. The result is still reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generate(&self) -> Result<Chart> {
        if !self.bpm.is_finite() || self.bpm <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "bpm must be positive, got {}",
                self.bpm
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(Error::InvalidInput(format!(
                "duration must be non-negative, got {}",
                self.duration
            )));
        }
        if self.lane_count == 0 {
            return Err(Error::InvalidInput("lane count must be at least 1".into()));
        }

        let notes = if self.duration < MIN_CHART_DURATION {
            Vec::new()
        } else {
            self.layout_notes(&self.grid()?)
        };

        debug!(
            "Generated {} notes for {} ({} BPM, {:.1}s)",
            notes.len(),
            self.difficulty,
            self.bpm,
            self.duration
        );

        Chart::new(
            self.song_id.clone(),
            self.difficulty,
            self.duration,
            self.lane_count,
            notes,
        )
    }

    /// Slot layout for the tempo, bounded by [`MAX_GRID_SLOTS`]
    fn grid(&self) -> Result<Grid> {
        let beat = 60.0 / self.bpm;
        let slot = beat * self.difficulty.beats_per_slot();
        let lead_in = beat * LEAD_IN_BEATS;

        let span = (self.duration - lead_in).max(0.0);
        let slots = (span / slot).ceil();
        if !slots.is_finite() || slots > MAX_GRID_SLOTS as f64 {
            return Err(Error::InvalidInput(format!(
                "bpm {} is too fast for a {:.1}s {} chart (more than {} slots)",
                self.bpm, self.duration, self.difficulty, MAX_GRID_SLOTS
            )));
        }

        Ok(Grid {
            lead_in,
            slot,
            slots: slots as u64,
        })
    }

    fn layout_notes(&self, grid: &Grid) -> Vec<Note> {
        let seed = self
            .seed
            .unwrap_or_else(|| derive_seed(self.difficulty, self.bpm, self.duration));
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let slot = grid.slot;

        let mut placer = LanePlacer::new(self.difficulty, self.lane_count);
        let mut notes = Vec::new();

        for slot_index in 0..grid.slots {
            let time = grid.lead_in + slot * slot_index as f64;
            if time >= self.duration {
                break;
            }

            if rng.random_bool(self.difficulty.rest_chance()) {
                continue;
            }

            if let Some(lane) = placer.place(&mut rng, time) {
                notes.push(self.make_note(notes.len(), time, lane));
            }

            let fill = time + slot / 2.0;
            if fill < self.duration && rng.random_bool(self.difficulty.fill_chance()) {
                if let Some(lane) = placer.place(&mut rng, fill) {
                    notes.push(self.make_note(notes.len(), fill, lane));
                }
            }
        }

        notes
    }

    fn make_note(&self, n: usize, time: f64, lane: u8) -> Note {
        Note::new(format!("{}-{:05}", self.difficulty, n), time, lane)
    }
}

struct Grid {
    lead_in: f64,
    slot: f64,
    slots: u64,
}

/// Lane selection honoring per-lane spacing and the difficulty's step limit
struct LanePlacer {
    difficulty: Difficulty,
    lane_count: u8,
    last_lane: Option<u8>,
    last_time: Vec<f64>,
}

impl LanePlacer {
    // Slack for float error on grid-aligned spacing
    const EPSILON: f64 = 1e-9;

    fn new(difficulty: Difficulty, lane_count: u8) -> Self {
        Self {
            difficulty,
            lane_count,
            last_lane: None,
            last_time: vec![f64::NEG_INFINITY; lane_count as usize],
        }
    }

    fn place(&mut self, rng: &mut ChaCha8Rng, time: f64) -> Option<u8> {
        let preferred = self.preferred_lane(rng);
        let min_spacing = self.difficulty.min_lane_spacing();

        let mut lanes: Vec<u8> = (0..self.lane_count).collect();
        lanes.sort_by_key(|&lane| (lane.abs_diff(preferred), lane));

        let lane = lanes.into_iter().find(|&lane| {
            let spaced = time - self.last_time[lane as usize] + Self::EPSILON >= min_spacing;
            spaced && self.step_allowed(lane)
        })?;

        self.last_lane = Some(lane);
        self.last_time[lane as usize] = time;
        Some(lane)
    }

    fn preferred_lane(&self, rng: &mut ChaCha8Rng) -> u8 {
        match (self.difficulty.max_lane_step(), self.last_lane) {
            (Some(step), Some(last)) => {
                let low = last.saturating_sub(step);
                let high = last.saturating_add(step).min(self.lane_count - 1);
                rng.random_range(low..=high)
            }
            _ => rng.random_range(0..self.lane_count),
        }
    }

    fn step_allowed(&self, lane: u8) -> bool {
        match (self.difficulty.max_lane_step(), self.last_lane) {
            (Some(step), Some(last)) => lane.abs_diff(last) <= step,
            _ => true,
        }
    }
}

/// Stable seed from the generator inputs
fn derive_seed(difficulty: Difficulty, bpm: f64, duration: f64) -> u64 {
    let mut h = 0x9E37_79B9_7F4A_7C15u64 ^ difficulty as u64;
    for word in [bpm.to_bits(), duration.to_bits()] {
        h = (h ^ word).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        h ^= h >> 31;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_is_deterministic() {
        let a = generate(Difficulty::Hard, 82.0, 60.0).unwrap();
        let b = generate(Difficulty::Hard, 82.0, 60.0).unwrap();
        assert_eq!(a.notes(), b.notes());
    }

    #[test]
    fn test_seed_override_changes_layout() {
        let base = ChartGenerator::new(Difficulty::Hard, 120.0, 60.0);
        let a = base.clone().seed(1).generate().unwrap();
        let b = base.clone().seed(2).generate().unwrap();
        let a_lanes: Vec<u8> = a.notes().iter().map(|n| n.lane).collect();
        let b_lanes: Vec<u8> = b.notes().iter().map(|n| n.lane).collect();
        assert_ne!(a_lanes, b_lanes);
    }

    #[test]
    fn test_times_within_duration_and_ids_unique() {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let chart = generate(difficulty, 76.0, 45.0).unwrap();
            assert!(!chart.is_empty());
            let mut ids = HashSet::new();
            for note in chart.notes() {
                assert!(note.time >= 0.0 && note.time < 45.0);
                assert!(note.lane < DEFAULT_LANE_COUNT);
                assert!(ids.insert(note.id.clone()));
            }
        }
    }

    #[test]
    fn test_harder_charts_are_denser() {
        let easy = generate(Difficulty::Easy, 82.0, 120.0).unwrap();
        let normal = generate(Difficulty::Normal, 82.0, 120.0).unwrap();
        let hard = generate(Difficulty::Hard, 82.0, 120.0).unwrap();
        assert!(easy.len() < normal.len());
        assert!(normal.len() < hard.len());
    }

    #[test]
    fn test_min_lane_spacing_respected() {
        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let chart = generate(difficulty, 180.0, 90.0).unwrap();
            let mut last = [f64::NEG_INFINITY; DEFAULT_LANE_COUNT as usize];
            for note in chart.notes() {
                let gap = note.time - last[note.lane as usize];
                assert!(gap + 1e-6 >= difficulty.min_lane_spacing());
                last[note.lane as usize] = note.time;
            }
        }
    }

    #[test]
    fn test_easy_moves_one_lane_at_a_time() {
        let chart = generate(Difficulty::Easy, 82.0, 120.0).unwrap();
        for pair in chart.notes().windows(2) {
            assert!(pair[0].lane.abs_diff(pair[1].lane) <= 1);
        }
    }

    #[test]
    fn test_short_duration_yields_empty_chart() {
        let chart = generate(Difficulty::Hard, 120.0, 0.5).unwrap();
        assert!(chart.is_empty());
        let chart = generate(Difficulty::Hard, 120.0, 0.0).unwrap();
        assert!(chart.is_empty());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        assert!(generate(Difficulty::Easy, 0.0, 60.0).is_err());
        assert!(generate(Difficulty::Easy, f64::NAN, 60.0).is_err());
        assert!(generate(Difficulty::Easy, 120.0, -1.0).is_err());
        assert!(generate(Difficulty::Easy, 120.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_absurd_tempo_is_rejected() {
        for bpm in [1e12, f64::MAX] {
            let result = ChartGenerator::new(Difficulty::Hard, bpm, 60.0).generate();
            assert!(matches!(result, Err(Error::InvalidInput(_))), "bpm {bpm}");
        }
    }

    #[test]
    fn test_fast_tempo_still_generates() {
        let chart = generate(Difficulty::Hard, 400.0, 60.0).unwrap();
        assert!(!chart.is_empty());
        assert!(chart.notes().iter().all(|note| note.time < 60.0));
    }

    #[test]
    fn test_first_note_after_lead_in() {
        let chart = generate(Difficulty::Normal, 120.0, 30.0).unwrap();
        let first = &chart.notes()[0];
        // 4 beats at 120 BPM
        assert!(first.time >= 2.0 - 1e-9);
    }
}
