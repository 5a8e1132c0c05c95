use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{EnumString, IntoStaticStr};
use tracing::debug;

use crate::chart::Difficulty;
use crate::config::{combo_bonus, timing};
use crate::error::{Error, Result};
use crate::score::{JudgementPolicy, JudgementWindows};

/// Behavior of a tap on a lane with no active note
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmptyLanePolicy {
    /// The tap is dropped without penalty
    #[default]
    Ignore,
    /// The tap counts as a Miss and breaks the combo
    Miss,
}

/// How hit points are awarded
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ScoringMode {
    /// Tier points, unchanged
    #[default]
    Flat,
    /// Tier points scaled up every ten combo
    ComboBonus,
}

impl ScoringMode {
    /// Points awarded for a hit that brings the combo to `combo`
    pub fn award(&self, points: u32, combo: u32) -> u32 {
        match self {
            Self::Flat => points,
            Self::ComboBonus => {
                let percent = 100 + combo_bonus::STEP_PERCENT * (combo / combo_bonus::EVERY);
                points.saturating_mul(percent) / 100
            }
        }
    }
}

/// Per-run engine settings. Times are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fall_duration: f64,
    pub miss_threshold: f64,
    pub end_grace: f64,
    pub tick_interval: f64,
    pub empty_lane_policy: EmptyLanePolicy,
    pub scoring: ScoringMode,
    /// Overrides the per-difficulty windows when set
    pub windows: Option<JudgementWindows>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fall_duration: timing::FALL_DURATION,
            miss_threshold: timing::MISS_THRESHOLD,
            end_grace: timing::END_GRACE,
            tick_interval: timing::TICK_INTERVAL,
            empty_lane_policy: EmptyLanePolicy::default(),
            scoring: ScoringMode::default(),
            windows: None,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        debug!("Loaded engine config from {:?}", path.as_ref());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn windows_for(&self, difficulty: Difficulty) -> JudgementWindows {
        self.windows
            .unwrap_or_else(|| JudgementWindows::for_difficulty(difficulty))
    }

    pub fn policy_for(&self, difficulty: Difficulty) -> Result<JudgementPolicy> {
        JudgementPolicy::new(self.windows_for(difficulty))
    }

    /// Check timing values and windows for every difficulty.
    ///
    /// The miss threshold must cover the widest hit window, otherwise notes
    /// would auto-miss while still hittable.
    pub fn validate(&self) -> Result<()> {
        if !self.fall_duration.is_finite() || self.fall_duration <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "fall_duration must be positive, got {}",
                self.fall_duration
            )));
        }
        if !self.miss_threshold.is_finite() || self.miss_threshold <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "miss_threshold must be positive, got {}",
                self.miss_threshold
            )));
        }
        if !self.end_grace.is_finite() || self.end_grace < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "end_grace must be non-negative, got {}",
                self.end_grace
            )));
        }
        if !self.tick_interval.is_finite() || self.tick_interval <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "tick_interval must be positive, got {}",
                self.tick_interval
            )));
        }

        for difficulty in [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard] {
            let windows = self.windows_for(difficulty);
            windows.validate()?;
            if self.miss_threshold * 1000.0 < windows.widest_ms() {
                return Err(Error::InvalidConfig(format!(
                    "miss_threshold ({}s) is narrower than the {} window ({}ms)",
                    self.miss_threshold,
                    difficulty,
                    windows.widest_ms()
                )));
            }
        }

        Ok(())
    }
}
