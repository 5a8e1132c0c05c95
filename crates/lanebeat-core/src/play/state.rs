use serde::Serialize;
use strum::IntoStaticStr;
use tracing::{info, warn};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
pub enum RunPhase {
    /// Created, waiting for the first tick
    Ready,
    Playing,
    /// Summary produced; further input is ignored
    Finished,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// Run phase tracker
///
/// ## Transition Rules
///
/// Valid transitions:
/// - Ready -> Playing (first tick)
/// - Playing -> Finished (clock passed the end of the song plus grace)
/// - Ready -> Finished (run ended before it started)
///
/// Everything else is blocked, in particular leaving `Finished` except
/// through [`PhaseTracker::reset`].
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: RunPhase,
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Ready,
        }
    }

    /// Check if a phase transition is valid
    pub fn is_valid_transition(from: RunPhase, to: RunPhase) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (RunPhase::Ready, RunPhase::Playing)
                | (RunPhase::Playing, RunPhase::Finished)
                | (RunPhase::Ready, RunPhase::Finished)
        )
    }

    /// Move to `to` if allowed. Returns true when the phase changed.
    pub fn transition(&mut self, to: RunPhase) -> bool {
        if self.phase == to {
            return false;
        }
        if !Self::is_valid_transition(self.phase, to) {
            warn!(
                "Invalid run phase transition: {} -> {}, keeping {}",
                self.phase, to, self.phase
            );
            return false;
        }

        info!("Run phase: {} -> {}", self.phase, to);
        self.phase = to;
        true
    }

    pub fn reset(&mut self) {
        self.phase = RunPhase::Ready;
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Finished
    }
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}
