use std::collections::VecDeque;

use serde::Serialize;
use tracing::debug;

use crate::chart::Chart;
use crate::config::EngineConfig;

/// Lifecycle of a single note within a run
///
/// ```text
/// Unspawned -> Active -> Hit
///                     -> Missed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoteState {
    Unspawned,
    Active,
    Hit,
    Missed,
}

impl NoteState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Hit | Self::Missed)
    }
}

/// Tracks which notes are active (spawned, unresolved) at the current time.
///
/// Notes are addressed by their index in [`Chart::notes`]. Active notes are
/// kept per lane in chart order, so each lane queue is sorted by target time.
/// A note enters the active set once and leaves it once; the per-note state
/// vector doubles as the processed set.
#[derive(Debug, Clone)]
pub struct SchedulingWindow {
    fall_duration: f64,
    miss_threshold: f64,
    song_duration: f64,
    states: Vec<NoteState>,
    /// Next chart index that has not been considered for spawning
    next_spawn: usize,
    active: Vec<VecDeque<usize>>,
    active_count: usize,
    processed_count: usize,
}

impl SchedulingWindow {
    pub fn new(chart: &Chart, config: &EngineConfig) -> Self {
        Self {
            fall_duration: config.fall_duration,
            miss_threshold: config.miss_threshold,
            song_duration: chart.duration(),
            states: vec![NoteState::Unspawned; chart.len()],
            next_spawn: 0,
            active: vec![VecDeque::new(); chart.lane_count() as usize],
            active_count: 0,
            processed_count: 0,
        }
    }

    /// Run one tick: spawn newly visible notes, then sweep expired ones.
    ///
    /// Returns the indices of notes that auto-missed, in chart order.
    pub fn advance(&mut self, chart: &Chart, now: f64) -> Vec<usize> {
        self.spawn(chart, now);
        self.sweep(chart, now)
    }

    fn spawn(&mut self, chart: &Chart, now: f64) {
        let notes = chart.notes();
        while let Some(note) = notes.get(self.next_spawn) {
            if now < note.time - self.fall_duration {
                break;
            }
            let index = self.next_spawn;
            self.next_spawn += 1;

            if note.time > self.song_duration || self.states[index] != NoteState::Unspawned {
                continue;
            }

            self.states[index] = NoteState::Active;
            self.active[note.lane as usize].push_back(index);
            self.active_count += 1;
            debug!("Spawned {} (lane {}, target {:.3}s)", note.id, note.lane, note.time);
        }
    }

    fn sweep(&mut self, chart: &Chart, now: f64) -> Vec<usize> {
        let notes = chart.notes();
        let mut missed = Vec::new();

        for lane in &mut self.active {
            while let Some(&index) = lane.front() {
                if now - notes[index].time <= self.miss_threshold {
                    break;
                }
                lane.pop_front();
                missed.push(index);
            }
        }

        for &index in &missed {
            self.states[index] = NoteState::Missed;
            self.active_count -= 1;
            self.processed_count += 1;
        }

        missed.sort_unstable();
        missed
    }

    /// Active note indices in `lane`, earliest target first
    pub fn active_in_lane(&self, lane: u8) -> impl Iterator<Item = usize> + '_ {
        self.active
            .get(lane as usize)
            .into_iter()
            .flat_map(|queue| queue.iter().copied())
    }

    /// Remove an active note consumed by input, moving it to `outcome`.
    ///
    /// Returns false if the note was not active in `lane` or `outcome` is not
    /// terminal, leaving state untouched.
    pub fn take(&mut self, lane: u8, index: usize, outcome: NoteState) -> bool {
        if !outcome.is_terminal() {
            return false;
        }
        let Some(queue) = self.active.get_mut(lane as usize) else {
            return false;
        };
        let Some(position) = queue.iter().position(|&i| i == index) else {
            return false;
        };

        queue.remove(position);
        self.states[index] = outcome;
        self.active_count -= 1;
        self.processed_count += 1;
        true
    }

    /// Resolve every remaining note as missed (end of run).
    ///
    /// Returns the indices of flushed notes in chart order.
    pub fn flush(&mut self) -> Vec<usize> {
        let flushed: Vec<usize> = self
            .states
            .iter()
            .enumerate()
            .filter(|(_, state)| !state.is_terminal())
            .map(|(index, _)| index)
            .collect();

        for &index in &flushed {
            self.states[index] = NoteState::Missed;
        }
        for lane in &mut self.active {
            lane.clear();
        }
        self.next_spawn = self.states.len();
        self.active_count = 0;
        self.processed_count += flushed.len();
        flushed
    }

    /// Forget all progress, keeping the chart layout
    pub fn reset(&mut self) {
        self.states.fill(NoteState::Unspawned);
        self.next_spawn = 0;
        for lane in &mut self.active {
            lane.clear();
        }
        self.active_count = 0;
        self.processed_count = 0;
    }

    pub fn state(&self, index: usize) -> Option<NoteState> {
        self.states.get(index).copied()
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn processed_count(&self) -> usize {
        self.processed_count
    }

    /// True once every note has reached a terminal state
    pub fn is_exhausted(&self) -> bool {
        self.processed_count == self.states.len()
    }
}
