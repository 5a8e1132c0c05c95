//! Score-related types.
//!
//! This module contains:
//! - `Tier`, `Judgement`, `JudgementPolicy` - timing offset classification
//! - `JudgementWindows` - per-difficulty tolerance tables
//! - `Grade` - letter grades (D, C, B, A, S)

mod grade;
mod judge;

pub use grade::*;
pub use judge::*;
