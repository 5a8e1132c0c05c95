//! Chart-related types.
//!
//! This module contains:
//! - `Difficulty` - difficulty tiers (EASY, NORMAL, HARD)
//! - `Note`, `Chart` - validated, time-ordered note charts
//! - `ChartGenerator` - deterministic chart generation
//! - `SongInfo` - built-in song catalog

mod difficulty;
mod generator;
mod song;
mod types;

pub use difficulty::*;
pub use generator::*;
pub use song::*;
pub use types::*;
