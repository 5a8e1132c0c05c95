use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// Letter grade of a finished run, ordered worst to best
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
    Default,
    IntoStaticStr,
)]
pub enum Grade {
    /// Chart with nothing to judge
    #[default]
    #[strum(serialize = "-")]
    NoPlay,
    D,
    C,
    B,
    A,
    S,
}

/// Minimum accuracy for each passing grade, best first
const ACCURACY_FLOORS: [(f64, Grade); 4] = [
    (0.95, Grade::S),
    (0.85, Grade::A),
    (0.70, Grade::B),
    (0.50, Grade::C),
];

impl Grade {
    /// Grade for an accuracy ratio in [0, 1]
    pub fn from_accuracy(ratio: f64) -> Self {
        ACCURACY_FLOORS
            .iter()
            .find(|(floor, _)| ratio >= *floor)
            .map_or(Self::D, |&(_, grade)| grade)
    }

    pub fn short_name(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_name())
    }
}
