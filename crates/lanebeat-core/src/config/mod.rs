//! Engine configuration.
//!
//! This module contains:
//! - `EngineConfig` - per-run timing, policy and scoring settings
//! - `EmptyLanePolicy` - what a tap on an empty lane does
//! - `ScoringMode` - flat or combo-scaled points
//! - Timing default constants

mod engine;

pub use engine::*;

/// Timing defaults, all in seconds.
///
/// A note spawns `FALL_DURATION` before its target time and auto-misses once
/// it is more than `MISS_THRESHOLD` late. The run ends `END_GRACE` after the
/// song so trailing notes can still resolve.
pub mod timing {
    /// Time a note spends in the active set before its target time.
    pub const FALL_DURATION: f64 = 2.5;

    /// Maximum lateness before an unresolved note is judged Miss.
    pub const MISS_THRESHOLD: f64 = 0.7;

    /// Extra time after the song ends before the run terminates.
    pub const END_GRACE: f64 = 2.0;

    /// Driver tick interval (~60 Hz).
    pub const TICK_INTERVAL: f64 = 0.016;
}

/// Combo bonus parameters for [`ScoringMode::ComboBonus`].
///
/// Points are scaled by `1 + STEP_PERCENT / 100 * floor(combo / EVERY)`,
/// rounded down.
pub mod combo_bonus {
    pub const EVERY: u32 = 10;
    pub const STEP_PERCENT: u32 = 10;
}
