//! Run engine: ties chart, scheduling window, input resolution and scoring
//! together behind a tick/tap interface.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::chart::Chart;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::play::{
    NoteState, PhaseTracker, Resolution, RunPhase, RunState, RunSummary, RunTracker,
    SchedulingWindow, ScoreSnapshot, resolve,
};
use crate::score::{Judgement, JudgementPolicy, Tier};

/// A judgement for UI feedback
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JudgementEvent {
    /// `None` for a stray tap on an empty lane
    pub note_id: Option<Arc<str>>,
    pub lane: u8,
    pub tier: Tier,
    /// Input time minus target time; `None` for auto-misses and stray taps
    pub offset_ms: Option<f64>,
    pub points: u32,
    /// Clock time the judgement was made
    pub time: f64,
}

/// Result of one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<JudgementEvent>,
    pub score: ScoreSnapshot,
    /// Set on the tick that ends the run
    pub summary: Option<RunSummary>,
}

/// Result of one tap
#[derive(Debug, Clone, PartialEq)]
pub enum TapOutcome {
    Judged(JudgementEvent),
    Ignored,
}

/// One run of one chart.
///
/// Single-threaded by construction: `tick` and `tap` take `&mut self`, so
/// the clock and input paths can never interleave mid-update.
#[derive(Debug, Clone)]
pub struct Engine {
    chart: Chart,
    config: EngineConfig,
    policy: JudgementPolicy,
    window: SchedulingWindow,
    tracker: RunTracker,
    phase: PhaseTracker,
    last_tick: Option<f64>,
}

impl Engine {
    pub fn new(chart: Chart, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let policy = config.policy_for(chart.difficulty())?;
        let window = SchedulingWindow::new(&chart, &config);
        let tracker = RunTracker::new(
            Arc::from(chart.song_id()),
            chart.difficulty(),
            chart.len() as u32,
            policy.points(Tier::Perfect),
            config.scoring,
        );

        debug!(
            "Engine ready: {} {} ({} notes, {:.1}s)",
            chart.song_id(),
            chart.difficulty(),
            chart.len(),
            chart.duration()
        );

        Ok(Self {
            chart,
            config,
            policy,
            window,
            tracker,
            phase: PhaseTracker::new(),
            last_tick: None,
        })
    }

    /// Clock time after which the run ends
    pub fn end_time(&self) -> f64 {
        self.chart.duration() + self.config.end_grace
    }

    /// Advance the run clock to `now`.
    ///
    /// Spawns notes entering the window, auto-misses expired ones and, once
    /// `now` passes [`Engine::end_time`], flushes what is left and produces
    /// the summary. Ticks after the run has finished do nothing.
    pub fn tick(&mut self, now: f64) -> Result<TickReport> {
        if !now.is_finite() {
            return Err(Error::InvalidInput(format!("tick time must be finite, got {now}")));
        }
        if let Some(last) = self.last_tick.filter(|&last| now <= last) {
            return Err(Error::NonMonotonicTick { time: now, last });
        }
        self.last_tick = Some(now);

        if self.phase.is_finished() {
            return Ok(TickReport {
                score: self.tracker.snapshot(),
                ..Default::default()
            });
        }
        if self.phase.phase() == RunPhase::Ready {
            self.phase.transition(RunPhase::Playing);
        }

        let missed = self.window.advance(&self.chart, now);
        let mut events = self.report_misses(&missed, now);

        let mut summary = None;
        if now > self.end_time() {
            let (flushed, run_summary) = self.end_run(now);
            events.extend(flushed);
            summary = Some(run_summary);
        }

        Ok(TickReport {
            events,
            score: self.tracker.snapshot(),
            summary,
        })
    }

    /// Resolve a tap in `lane` at time `now`.
    ///
    /// The active set reflects the last tick, so `now` may not precede it.
    /// Taps before the first tick or after the run has ended are ignored.
    pub fn tap(&mut self, lane: u8, now: f64) -> Result<TapOutcome> {
        let lane_count = self.chart.lane_count();
        if lane >= lane_count {
            return Err(Error::InvalidLane { lane, lane_count });
        }
        if !now.is_finite() {
            return Err(Error::InvalidInput(format!("tap time must be finite, got {now}")));
        }
        if let Some(last) = self.last_tick.filter(|&last| now < last) {
            return Err(Error::InvalidInput(format!(
                "tap at {now}s precedes the last tick at {last}s"
            )));
        }
        if self.phase.phase() != RunPhase::Playing {
            debug!("Tap on lane {} ignored in phase {}", lane, self.phase.phase());
            return Ok(TapOutcome::Ignored);
        }

        let resolution = resolve(
            &self.chart,
            &mut self.window,
            &self.policy,
            self.config.empty_lane_policy,
            lane,
            now,
        );

        let event = match resolution {
            Resolution::Ignored => return Ok(TapOutcome::Ignored),
            Resolution::StrayMiss => {
                debug!("Stray tap on empty lane {} at {:.3}s", lane, now);
                let points = self.tracker.report(&Judgement::MISS);
                JudgementEvent {
                    note_id: None,
                    lane,
                    tier: Tier::Miss,
                    offset_ms: None,
                    points,
                    time: now,
                }
            }
            Resolution::Judged {
                index,
                offset_ms,
                judgement,
            } => {
                let points = self.tracker.report(&judgement);
                JudgementEvent {
                    note_id: Some(self.chart.notes()[index].id.clone()),
                    lane,
                    tier: judgement.tier,
                    offset_ms: Some(offset_ms),
                    points,
                    time: now,
                }
            }
        };

        Ok(TapOutcome::Judged(event))
    }

    /// End the run now: miss every unresolved note and build the summary.
    ///
    /// Idempotent; later calls return the cached summary.
    pub fn finish(&mut self) -> RunSummary {
        if self.tracker.is_finalized() {
            return self.tracker.finalize();
        }
        let now = self.last_tick.unwrap_or(0.0);
        let (_, summary) = self.end_run(now);
        summary
    }

    /// Discard progress and return to `Ready` with the same chart
    pub fn reset(&mut self) {
        info!("Resetting run for {}", self.chart.song_id());
        self.window.reset();
        self.tracker.reset();
        self.phase.reset();
        self.last_tick = None;
    }

    fn end_run(&mut self, now: f64) -> (Vec<JudgementEvent>, RunSummary) {
        let flushed = self.window.flush();
        if !flushed.is_empty() {
            warn!(
                "{} note(s) unresolved at run end, judging as miss",
                flushed.len()
            );
        }
        let events = self.report_misses(&flushed, now);
        self.phase.transition(RunPhase::Finished);
        (events, self.tracker.finalize())
    }

    fn report_misses(&mut self, indices: &[usize], now: f64) -> Vec<JudgementEvent> {
        indices
            .iter()
            .map(|&index| {
                let note = &self.chart.notes()[index];
                debug!("Auto-miss {} (target {:.3}s)", note.id, note.time);
                self.tracker.report(&Judgement::MISS);
                JudgementEvent {
                    note_id: Some(note.id.clone()),
                    lane: note.lane,
                    tier: Tier::Miss,
                    offset_ms: None,
                    points: 0,
                    time: now,
                }
            })
            .collect()
    }

    pub fn chart(&self) -> &Chart {
        &self.chart
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn phase(&self) -> RunPhase {
        self.phase.phase()
    }

    pub fn score(&self) -> ScoreSnapshot {
        self.tracker.snapshot()
    }

    pub fn state(&self) -> &RunState {
        self.tracker.state()
    }

    pub fn note_state(&self, id: &str) -> Option<NoteState> {
        self.chart
            .index_of(id)
            .and_then(|index| self.window.state(index))
    }

    pub fn active_count(&self) -> usize {
        self.window.active_count()
    }

    pub fn processed_count(&self) -> usize {
        self.window.processed_count()
    }

    /// True once every note has been hit or missed
    pub fn is_exhausted(&self) -> bool {
        self.window.is_exhausted()
    }

    /// Time of the last accepted tick
    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Difficulty, Note};
    use crate::config::EmptyLanePolicy;

    fn engine(notes: Vec<Note>, config: EngineConfig) -> Engine {
        let chart = Chart::new("song", Difficulty::Easy, 5.0, 4, notes).unwrap();
        Engine::new(chart, config).unwrap()
    }

    #[test]
    fn test_tick_must_increase() {
        let mut engine = engine(vec![], EngineConfig::default());
        engine.tick(1.0).unwrap();
        assert!(matches!(
            engine.tick(1.0),
            Err(Error::NonMonotonicTick { .. })
        ));
        assert!(matches!(
            engine.tick(0.5),
            Err(Error::NonMonotonicTick { .. })
        ));
        assert!(matches!(
            engine.tick(f64::NAN),
            Err(Error::InvalidInput(_))
        ));
        assert!(engine.tick(1.1).is_ok());
    }

    #[test]
    fn test_unknown_lane_is_rejected() {
        let mut engine = engine(vec![Note::new("a", 2.0, 0)], EngineConfig::default());
        engine.tick(0.0).unwrap();
        assert!(matches!(
            engine.tap(4, 2.0),
            Err(Error::InvalidLane {
                lane: 4,
                lane_count: 4
            })
        ));
    }

    #[test]
    fn test_tap_before_last_tick_is_rejected() {
        let mut engine = engine(vec![Note::new("a", 2.0, 0)], EngineConfig::default());
        engine.tick(1.0).unwrap();
        assert!(matches!(engine.tap(0, 0.9), Err(Error::InvalidInput(_))));
        assert_eq!(engine.note_state("a"), Some(NoteState::Active));

        // Same instant as the tick is fine
        assert_eq!(engine.tap(1, 1.0).unwrap(), TapOutcome::Ignored);
        assert_eq!(engine.last_tick(), Some(1.0));
    }

    #[test]
    fn test_tap_before_start_is_ignored() {
        let mut engine = engine(vec![Note::new("a", 2.0, 0)], EngineConfig::default());
        assert_eq!(engine.tap(0, 0.0).unwrap(), TapOutcome::Ignored);
        assert_eq!(engine.phase(), RunPhase::Ready);
    }

    #[test]
    fn test_stray_tap_miss_policy() {
        let config = EngineConfig {
            empty_lane_policy: EmptyLanePolicy::Miss,
            ..Default::default()
        };
        let mut engine = engine(vec![Note::new("a", 2.0, 0)], config);
        engine.tick(1.0).unwrap();
        engine.tap(0, 2.0).unwrap();
        assert_eq!(engine.score().combo, 1);

        match engine.tap(2, 2.1).unwrap() {
            TapOutcome::Judged(event) => {
                assert_eq!(event.tier, Tier::Miss);
                assert!(event.note_id.is_none());
            }
            TapOutcome::Ignored => panic!("Expected stray miss"),
        }
        assert_eq!(engine.score().combo, 0);
        assert_eq!(engine.state().counts.miss, 1);
    }

    #[test]
    fn test_run_ends_after_grace() {
        let mut engine = engine(vec![Note::new("a", 4.9, 1)], EngineConfig::default());
        engine.tick(0.0).unwrap();

        // duration 5.0 + grace 2.0
        let report = engine.tick(7.0).unwrap();
        assert!(report.summary.is_none());
        assert_eq!(report.events.len(), 1);

        let report = engine.tick(7.016).unwrap();
        let summary = report.summary.unwrap();
        assert_eq!(summary.counts.miss, 1);
        assert_eq!(engine.phase(), RunPhase::Finished);

        // Finished runs ignore further input
        let report = engine.tick(8.0).unwrap();
        assert!(report.events.is_empty());
        assert!(report.summary.is_none());
        assert_eq!(engine.tap(1, 8.0).unwrap(), TapOutcome::Ignored);
    }

    #[test]
    fn test_short_grace_flushes_active_notes() {
        let config = EngineConfig {
            end_grace: 0.0,
            ..Default::default()
        };
        let mut engine = engine(vec![Note::new("a", 5.0, 2)], config);
        engine.tick(3.0).unwrap();
        assert_eq!(engine.active_count(), 1);

        let report = engine.tick(5.1).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].tier, Tier::Miss);
        assert!(report.summary.is_some());
        assert_eq!(engine.note_state("a"), Some(NoteState::Missed));
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut engine = engine(
            vec![Note::new("a", 2.0, 0), Note::new("b", 3.0, 1)],
            EngineConfig::default(),
        );
        engine.tick(1.0).unwrap();
        engine.tap(0, 2.0).unwrap();

        let first = engine.finish();
        let second = engine.finish();
        assert_eq!(first, second);
        assert_eq!(first.counts.perfect, 1);
        assert_eq!(first.counts.miss, 1);
        assert_eq!(engine.processed_count(), 2);
    }

    #[test]
    fn test_reset_allows_retry() {
        let mut engine = engine(vec![Note::new("a", 2.0, 0)], EngineConfig::default());
        engine.tick(1.0).unwrap();
        engine.tap(0, 2.0).unwrap();
        engine.finish();

        engine.reset();
        assert_eq!(engine.phase(), RunPhase::Ready);
        assert_eq!(engine.score(), ScoreSnapshot::default());
        assert_eq!(engine.note_state("a"), Some(NoteState::Unspawned));
        assert!(engine.tick(0.5).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let chart = Chart::new("song", Difficulty::Easy, 5.0, 4, vec![]).unwrap();
        let config = EngineConfig {
            fall_duration: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Engine::new(chart, config),
            Err(Error::InvalidConfig(_))
        ));
    }
}
