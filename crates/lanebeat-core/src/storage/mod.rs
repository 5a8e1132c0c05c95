//! Persistent player data.
//!
//! - `HighScores` - best score per difficulty, stored as JSON

mod high_scores;

pub use high_scores::*;
