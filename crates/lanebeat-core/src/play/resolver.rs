//! Input resolution: match a tap against the active notes of its lane.

use tracing::debug;

use crate::chart::Chart;
use crate::config::EmptyLanePolicy;
use crate::play::{NoteState, SchedulingWindow};
use crate::score::{Judgement, JudgementPolicy};

/// Outcome of resolving one tap
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A note was consumed and judged
    Judged {
        index: usize,
        offset_ms: f64,
        judgement: Judgement,
    },
    /// No active note in the lane and the policy penalizes stray taps
    StrayMiss,
    /// No active note in the lane and the tap is ignored
    Ignored,
}

/// Pick the active note in `lane` closest to `now`.
///
/// Ties on absolute offset go to the lowest note id.
pub fn select_candidate(
    chart: &Chart,
    window: &SchedulingWindow,
    lane: u8,
    now: f64,
) -> Option<usize> {
    let notes = chart.notes();
    window.active_in_lane(lane).min_by(|&a, &b| {
        let da = (notes[a].time - now).abs();
        let db = (notes[b].time - now).abs();
        da.total_cmp(&db).then_with(|| notes[a].id.cmp(&notes[b].id))
    })
}

/// Resolve a tap in `lane` at time `now`.
///
/// At most one note is consumed. The caller validates the lane.
pub fn resolve(
    chart: &Chart,
    window: &mut SchedulingWindow,
    policy: &JudgementPolicy,
    empty_lane: EmptyLanePolicy,
    lane: u8,
    now: f64,
) -> Resolution {
    let Some(index) = select_candidate(chart, window, lane, now) else {
        return match empty_lane {
            EmptyLanePolicy::Ignore => Resolution::Ignored,
            EmptyLanePolicy::Miss => Resolution::StrayMiss,
        };
    };

    let note = &chart.notes()[index];
    let offset_ms = (now - note.time) * 1000.0;
    let judgement = policy.classify(offset_ms);

    let outcome = if judgement.tier.is_miss() {
        NoteState::Missed
    } else {
        NoteState::Hit
    };
    if !window.take(lane, index, outcome) {
        return Resolution::Ignored;
    }
    debug!(
        "Tap lane {} at {:.3}s -> {} ({:+.1}ms, {})",
        lane, now, note.id, offset_ms, judgement.tier
    );

    Resolution::Judged {
        index,
        offset_ms,
        judgement,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{Difficulty, Note};
    use crate::config::EngineConfig;
    use crate::score::{JudgementWindows, Tier};

    fn setup(notes: Vec<Note>) -> (Chart, SchedulingWindow, JudgementPolicy) {
        let chart = Chart::new("test", Difficulty::Easy, 10.0, 4, notes).unwrap();
        let window = SchedulingWindow::new(&chart, &EngineConfig::default());
        let policy =
            JudgementPolicy::new(JudgementWindows::from_bounds([150.0, 300.0, 500.0])).unwrap();
        (chart, window, policy)
    }

    #[test]
    fn test_selects_closest_note() {
        let (chart, mut window, policy) =
            setup(vec![Note::new("a", 2.0, 0), Note::new("b", 2.05, 0)]);
        window.advance(&chart, 1.0);

        let resolution = resolve(&chart, &mut window, &policy, EmptyLanePolicy::Ignore, 0, 2.02);
        match resolution {
            Resolution::Judged {
                index, judgement, ..
            } => {
                assert_eq!(&*chart.notes()[index].id, "a");
                assert_eq!(judgement.tier, Tier::Perfect);
            }
            other => panic!("Expected judgement, got {:?}", other),
        }
        assert_eq!(window.state(1), Some(NoteState::Active));
    }

    #[test]
    fn test_tie_goes_to_lowest_id() {
        let (chart, window, _) = setup(vec![Note::new("b", 1.5, 2), Note::new("a", 2.5, 2)]);
        let mut window = window;
        window.advance(&chart, 1.0);

        let winner = select_candidate(&chart, &window, 2, 2.0).unwrap();
        assert_eq!(&*chart.notes()[winner].id, "a");
    }

    #[test]
    fn test_other_lanes_are_ignored() {
        let (chart, mut window, policy) = setup(vec![Note::new("a", 2.0, 0)]);
        window.advance(&chart, 1.0);

        let resolution = resolve(&chart, &mut window, &policy, EmptyLanePolicy::Ignore, 1, 2.0);
        assert_eq!(resolution, Resolution::Ignored);
        assert_eq!(window.state(0), Some(NoteState::Active));
    }

    #[test]
    fn test_empty_lane_miss_policy() {
        let (chart, mut window, policy) = setup(vec![Note::new("a", 2.0, 0)]);
        window.advance(&chart, 1.0);

        let resolution = resolve(&chart, &mut window, &policy, EmptyLanePolicy::Miss, 3, 2.0);
        assert_eq!(resolution, Resolution::StrayMiss);
        assert_eq!(window.processed_count(), 0);
    }

    #[test]
    fn test_early_tap_consumes_note_as_miss() {
        let (chart, mut window, policy) = setup(vec![Note::new("a", 3.0, 0)]);
        window.advance(&chart, 1.0);

        let resolution = resolve(&chart, &mut window, &policy, EmptyLanePolicy::Ignore, 0, 1.0);
        match resolution {
            Resolution::Judged {
                offset_ms,
                judgement,
                ..
            } => {
                assert!((offset_ms + 2000.0).abs() < 1e-6);
                assert_eq!(judgement.tier, Tier::Miss);
            }
            other => panic!("Expected judgement, got {:?}", other),
        }
        assert_eq!(window.state(0), Some(NoteState::Missed));
    }

    #[test]
    fn test_consumes_exactly_one_note() {
        let (chart, mut window, policy) = setup(vec![
            Note::new("a", 2.0, 0),
            Note::new("b", 2.0, 1),
            Note::new("c", 2.1, 0),
        ]);
        window.advance(&chart, 1.5);

        let before = window.processed_count();
        resolve(&chart, &mut window, &policy, EmptyLanePolicy::Ignore, 0, 2.0);
        assert_eq!(window.processed_count(), before + 1);
        assert_eq!(window.active_count(), 2);
    }
}
