use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Difficulty {
    Easy = 0,
    Normal = 1,
    Hard = 2,
}

impl Difficulty {
    pub fn short_name(&self) -> &'static str {
        self.into()
    }

    /// Get the upper-case display name (e.g., "NORMAL")
    pub fn expand_name(&self) -> &'static str {
        match self {
            Self::Easy => "EASY",
            Self::Normal => "NORMAL",
            Self::Hard => "HARD",
        }
    }

    /// Beat subdivision used for the base note grid.
    ///
    /// Easy places a note every other beat, Normal every beat, Hard every half beat.
    pub fn beats_per_slot(&self) -> f64 {
        match self {
            Self::Easy => 2.0,
            Self::Normal => 1.0,
            Self::Hard => 0.5,
        }
    }

    /// Chance that a slot is split in two by a fill note
    pub fn fill_chance(&self) -> f64 {
        match self {
            Self::Easy => 0.0,
            Self::Normal => 0.25,
            Self::Hard => 0.3,
        }
    }

    /// Chance that a slot is left empty as a rest
    pub fn rest_chance(&self) -> f64 {
        match self {
            Self::Easy => 0.15,
            Self::Normal => 0.1,
            Self::Hard => 0.05,
        }
    }

    /// Minimum time (seconds) between two notes in the same lane
    pub fn min_lane_spacing(&self) -> f64 {
        match self {
            Self::Easy => 0.5,
            Self::Normal => 0.3,
            Self::Hard => 0.15,
        }
    }

    /// Largest lane jump between consecutive notes, `None` for unrestricted
    pub fn max_lane_step(&self) -> Option<u8> {
        match self {
            Self::Easy => Some(1),
            Self::Normal => Some(2),
            Self::Hard => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
