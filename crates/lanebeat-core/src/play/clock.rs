use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::play::{Engine, JudgementEvent, RunPhase, RunSummary, TapOutcome};

/// Fixed-step run clock.
///
/// Time is derived from the tick count rather than accumulated, so long runs
/// do not drift.
#[derive(Debug, Clone)]
pub struct Clock {
    interval: f64,
    ticks: u64,
}

impl Clock {
    pub fn new(interval: f64) -> Self {
        Self { interval, ticks: 0 }
    }

    /// Return the time of the next tick. The first tick is at 0.0.
    pub fn advance(&mut self) -> f64 {
        let now = self.ticks as f64 * self.interval;
        self.ticks += 1;
        now
    }

    /// Time of the last tick returned by [`Clock::advance`]
    pub fn now(&self) -> Option<f64> {
        self.ticks
            .checked_sub(1)
            .map(|tick| tick as f64 * self.interval)
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}

/// A recorded tap: lane plus run clock time in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapEvent {
    pub lane: u8,
    pub time: f64,
}

impl TapEvent {
    pub fn new(lane: u8, time: f64) -> Self {
        Self { lane, time }
    }
}

/// Plays a tap log against an engine on a fixed-step clock.
///
/// A tap is delivered at its own timestamp once the engine has been ticked
/// to that time, so it sees exactly the notes active at that instant. The
/// same chart, config and tap log always produce the same summary.
#[derive(Debug, Clone)]
pub struct Driver {
    engine: Engine,
    clock: Clock,
}

impl Driver {
    pub fn new(engine: Engine) -> Self {
        let clock = Clock::new(engine.config().tick_interval);
        Self { engine, clock }
    }

    pub fn run(&mut self, taps: &[TapEvent]) -> Result<RunSummary> {
        self.run_with(taps, |_| {})
    }

    /// Run to completion, passing every judgement to `on_event` as it happens
    pub fn run_with<F>(&mut self, taps: &[TapEvent], mut on_event: F) -> Result<RunSummary>
    where
        F: FnMut(&JudgementEvent),
    {
        if let Some(tap) = taps.iter().find(|tap| !tap.time.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "tap on lane {} has non-finite time {}",
                tap.lane, tap.time
            )));
        }

        let mut taps = taps.to_vec();
        taps.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.lane.cmp(&b.lane)));

        self.engine.reset();
        self.clock.reset();
        debug!(
            "Driving {} with {} taps at {:.3}s steps",
            self.engine.chart().song_id(),
            taps.len(),
            self.clock.interval()
        );

        let mut pending = taps.iter().peekable();
        loop {
            let now = self.clock.advance();

            // Taps between the previous step and this one, each at its own time
            while let Some(tap) = pending.next_if(|tap| tap.time < now) {
                if let Some(summary) = self.step_to(tap.time, &mut on_event)? {
                    return Ok(summary);
                }
                if let TapOutcome::Judged(event) = self.engine.tap(tap.lane, tap.time)? {
                    on_event(&event);
                }
            }

            if let Some(summary) = self.step_to(now, &mut on_event)? {
                if pending.peek().is_some() {
                    debug!("{} tap(s) after run end dropped", pending.len());
                }
                return Ok(summary);
            }

            if self.engine.phase() == RunPhase::Finished {
                return Ok(self.engine.finish());
            }
        }
    }

    /// Tick the engine at `time` unless it is already there.
    ///
    /// Returns the summary if this tick ended the run.
    fn step_to<F>(&mut self, time: f64, on_event: &mut F) -> Result<Option<RunSummary>>
    where
        F: FnMut(&JudgementEvent),
    {
        if self.engine.last_tick().is_some_and(|last| time <= last) {
            return Ok(None);
        }
        let report = self.engine.tick(time)?;
        report.events.iter().for_each(&mut *on_event);
        Ok(report.summary)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Chart, Difficulty, Note};
    use crate::config::EngineConfig;
    use crate::score::Tier;

    fn driver(notes: Vec<Note>) -> Driver {
        let chart = Chart::new("song", Difficulty::Normal, 4.0, 4, notes).unwrap();
        Driver::new(Engine::new(chart, EngineConfig::default()).unwrap())
    }

    #[test]
    fn test_clock_starts_at_zero() {
        let mut clock = Clock::new(0.016);
        assert_eq!(clock.now(), None);
        assert_eq!(clock.advance(), 0.0);
        assert_eq!(clock.advance(), 0.016);
        assert_eq!(clock.now(), Some(0.016));

        clock.reset();
        assert_eq!(clock.advance(), 0.0);
    }

    #[test]
    fn test_clock_does_not_drift() {
        let mut clock = Clock::new(0.016);
        for _ in 0..1000 {
            clock.advance();
        }
        assert_eq!(clock.advance(), 1000.0 * 0.016);
    }

    #[test]
    fn test_perfect_taps() {
        let mut driver = driver(vec![Note::new("a", 1.0, 0), Note::new("b", 2.0, 3)]);
        let taps = [TapEvent::new(0, 1.0), TapEvent::new(3, 2.0)];

        let mut tiers = Vec::new();
        let summary = driver
            .run_with(&taps, |event| tiers.push(event.tier))
            .unwrap();

        assert_eq!(tiers, vec![Tier::Perfect, Tier::Perfect]);
        assert_eq!(summary.counts.perfect, 2);
        assert_eq!(summary.max_combo, 2);
        assert!(summary.full_combo);
        assert_eq!(driver.engine().phase(), RunPhase::Finished);
    }

    #[test]
    fn test_no_taps_misses_everything() {
        let mut driver = driver(vec![Note::new("a", 1.0, 0), Note::new("b", 2.0, 1)]);
        let summary = driver.run(&[]).unwrap();
        assert_eq!(summary.counts.miss, 2);
        assert_eq!(summary.score, 0);
        assert!(!summary.full_combo);
    }

    #[test]
    fn test_unsorted_taps_are_ordered() {
        let notes = vec![Note::new("a", 1.0, 0), Note::new("b", 2.0, 1)];
        let sorted = driver(notes.clone())
            .run(&[TapEvent::new(0, 1.0), TapEvent::new(1, 2.0)])
            .unwrap();
        let shuffled = driver(notes)
            .run(&[TapEvent::new(1, 2.0), TapEvent::new(0, 1.0)])
            .unwrap();
        assert_eq!(sorted, shuffled);
    }

    #[test]
    fn test_rerun_is_deterministic() {
        let mut driver = driver(vec![Note::new("a", 1.0, 0), Note::new("b", 2.0, 1)]);
        let taps = [TapEvent::new(0, 1.05), TapEvent::new(2, 1.5)];
        let first = driver.run(&taps).unwrap();
        let second = driver.run(&taps).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_tap_is_an_error() {
        let mut driver = driver(vec![Note::new("a", 1.0, 0)]);
        assert!(matches!(
            driver.run(&[TapEvent::new(9, 1.0)]),
            Err(Error::InvalidLane { .. })
        ));
        assert!(matches!(
            driver.run(&[TapEvent::new(0, f64::INFINITY)]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_early_stray_tap_leaves_upcoming_note_alone() {
        // Spawns at 2.51 - 2.5 = 0.01s, between the first two clock steps
        let mut driver = driver(vec![Note::new("a", 2.51, 0)]);
        let taps = [TapEvent::new(0, 0.005), TapEvent::new(0, 2.51)];

        let summary = driver.run(&taps).unwrap();
        assert_eq!(summary.counts.perfect, 1);
        assert_eq!(summary.counts.miss, 0);
        assert!(summary.full_combo);
    }

    #[test]
    fn test_tap_between_steps_sees_notes_spawned_by_then() {
        // Spawns at 0.02s; the tap at 0.025s lands before the 0.032s step
        let mut driver = driver(vec![Note::new("a", 2.52, 1)]);
        let mut events = Vec::new();
        driver
            .run_with(&[TapEvent::new(1, 0.025)], |event| events.push(event.clone()))
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].tier, Tier::Miss);
        assert_eq!(events[0].time, 0.025);
        assert_eq!(events[0].note_id.as_deref(), Some("a"));
    }

    #[test]
    fn test_tap_log_json() {
        let taps: Vec<TapEvent> =
            serde_json::from_str(r#"[{"lane": 2, "time": 1.25}, {"lane": 0, "time": 3.0}]"#)
                .unwrap();
        assert_eq!(taps, vec![TapEvent::new(2, 1.25), TapEvent::new(0, 3.0)]);
    }
}
