use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use crate::chart::Difficulty;
use crate::error::{Error, Result};

// Base windows per difficulty, in milliseconds: [perfect, good, normal].
pub const EASY_WINDOWS_MS: [f64; 3] = [150.0, 300.0, 500.0];
pub const NORMAL_WINDOWS_MS: [f64; 3] = [100.0, 200.0, 350.0];
pub const HARD_WINDOWS_MS: [f64; 3] = [50.0, 100.0, 200.0];

pub const PERFECT_POINTS: u32 = 100;
pub const GOOD_POINTS: u32 = 50;
pub const NORMAL_POINTS: u32 = 20;

/// Judgement tier, best first
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
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Tier {
    Perfect,
    Good,
    Normal,
    Miss,
}

impl Tier {
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// What a judgement does to the running combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboEffect {
    Increment,
    Reset,
}

/// Inclusive `|offset|` bound and reward for one tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierWindow {
    pub bound_ms: f64,
    pub points: u32,
}

/// Tolerance table for the three hit tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgementWindows {
    pub perfect: TierWindow,
    pub good: TierWindow,
    pub normal: TierWindow,
}

impl JudgementWindows {
    pub fn from_bounds(bounds_ms: [f64; 3]) -> Self {
        Self {
            perfect: TierWindow {
                bound_ms: bounds_ms[0],
                points: PERFECT_POINTS,
            },
            good: TierWindow {
                bound_ms: bounds_ms[1],
                points: GOOD_POINTS,
            },
            normal: TierWindow {
                bound_ms: bounds_ms[2],
                points: NORMAL_POINTS,
            },
        }
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::from_bounds(EASY_WINDOWS_MS),
            Difficulty::Normal => Self::from_bounds(NORMAL_WINDOWS_MS),
            Difficulty::Hard => Self::from_bounds(HARD_WINDOWS_MS),
        }
    }

    /// Hit tiers in order of increasing tolerance
    pub fn tiers(&self) -> [(Tier, TierWindow); 3] {
        [
            (Tier::Perfect, self.perfect),
            (Tier::Good, self.good),
            (Tier::Normal, self.normal),
        ]
    }

    /// Largest hit bound (ms)
    pub fn widest_ms(&self) -> f64 {
        self.normal.bound_ms
    }

    /// Bounds must be positive and strictly widening, points strictly shrinking
    pub fn validate(&self) -> Result<()> {
        let tiers = self.tiers();
        for (tier, window) in &tiers {
            if !window.bound_ms.is_finite() || window.bound_ms <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} window must be positive, got {}ms",
                    tier, window.bound_ms
                )));
            }
        }
        for pair in tiers.windows(2) {
            let (tighter, looser) = (&pair[0], &pair[1]);
            if looser.1.bound_ms <= tighter.1.bound_ms {
                return Err(Error::InvalidConfig(format!(
                    "{} window ({}ms) must be wider than {} window ({}ms)",
                    looser.0, looser.1.bound_ms, tighter.0, tighter.1.bound_ms
                )));
            }
            if looser.1.points >= tighter.1.points {
                return Err(Error::InvalidConfig(format!(
                    "{} must award fewer points than {}",
                    looser.0, tighter.0
                )));
            }
        }
        Ok(())
    }
}

/// Graded outcome for one resolved note
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub tier: Tier,
    pub points: u32,
    pub combo: ComboEffect,
}

impl Judgement {
    pub const MISS: Judgement = Judgement {
        tier: Tier::Miss,
        points: 0,
        combo: ComboEffect::Reset,
    };
}

/// Maps timing offsets to judgements
#[derive(Debug, Clone, PartialEq)]
pub struct JudgementPolicy {
    windows: JudgementWindows,
}

impl JudgementPolicy {
    pub fn new(windows: JudgementWindows) -> Result<Self> {
        windows.validate()?;
        Ok(Self { windows })
    }

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        Self {
            windows: JudgementWindows::for_difficulty(difficulty),
        }
    }

    pub fn windows(&self) -> &JudgementWindows {
        &self.windows
    }

    /// Classify an offset (input time - target time) in milliseconds.
    ///
    /// Bounds are inclusive. Anything outside the widest window, or a
    /// non-finite offset, is a Miss.
    pub fn classify(&self, offset_ms: f64) -> Judgement {
        let distance = offset_ms.abs();
        if !distance.is_finite() {
            return Judgement::MISS;
        }

        self.windows
            .tiers()
            .into_iter()
            .find(|(_, window)| distance <= window.bound_ms)
            .map(|(tier, window)| Judgement {
                tier,
                points: window.points,
                combo: ComboEffect::Increment,
            })
            .unwrap_or(Judgement::MISS)
    }

    pub fn points(&self, tier: Tier) -> u32 {
        match tier {
            Tier::Perfect => self.windows.perfect.points,
            Tier::Good => self.windows.good.points,
            Tier::Normal => self.windows.normal.points,
            Tier::Miss => 0,
        }
    }
}
