//! Deterministic simulated player.
//!
//! Produces a tap log for a chart: each note is either skipped or tapped
//! with a uniform timing error. The log depends only on the chart and seed.

use anyhow::{Result, bail};
use lanebeat_core::{Chart, TapEvent};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy)]
pub struct AutoPlayer {
    /// Maximum absolute timing error in milliseconds
    accuracy_ms: f64,
    /// Probability of skipping a note
    miss_rate: f64,
    seed: u64,
}

impl AutoPlayer {
    pub fn new(accuracy_ms: f64, miss_rate: f64, seed: u64) -> Result<Self> {
        if !accuracy_ms.is_finite() || accuracy_ms < 0.0 {
            bail!("accuracy must be a non-negative number of ms, got {}", accuracy_ms);
        }
        if !(0.0..=1.0).contains(&miss_rate) {
            bail!("miss rate must be between 0 and 1, got {}", miss_rate);
        }
        Ok(Self {
            accuracy_ms,
            miss_rate,
            seed,
        })
    }

    pub fn taps(&self, chart: &Chart) -> Vec<TapEvent> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let spread = self.accuracy_ms / 1000.0;

        chart
            .notes()
            .iter()
            .filter_map(|note| {
                if rng.random_bool(self.miss_rate) {
                    return None;
                }
                let error = rng.random_range(-spread..=spread);
                Some(TapEvent::new(note.lane, note.time + error))
            })
            .collect()
    }
}
