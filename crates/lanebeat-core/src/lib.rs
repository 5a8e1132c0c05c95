pub mod chart;
pub mod config;
pub mod error;
pub mod play;
pub mod score;
pub mod storage;

pub use chart::{
    Chart, ChartGenerator, Difficulty, Note, SongInfo, catalog, find_song, generate,
};
pub use config::{EmptyLanePolicy, EngineConfig, ScoringMode};
pub use error::{Error, Result};
pub use play::{
    Clock, Driver, Engine, JudgementEvent, NoteState, RunPhase, RunState, RunSummary,
    ScoreSnapshot, TapEvent, TapOutcome, TickReport, TierCounts,
};
pub use score::{Grade, Judgement, JudgementPolicy, JudgementWindows, Tier};
pub use storage::{HighScoreEntry, HighScores};
