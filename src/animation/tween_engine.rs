//! Headless, clock-driven implementation of [`Animator`].
//!
//! Keeps the computed style of every target and advances all running
//! timelines on [`TweenEngine::update`]. Hosts that render call `update`
//! once per frame and read styles back with [`TweenEngine::style_of`].

use crate::trail::slot_pool::SlotId;
use crate::utils::clock::Clock;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::timeline::{Animator, CompletionToken, Prop, Segment, Style, Target, Timeline};

#[derive(Debug)]
struct RunningSegment {
    segment: Segment,
    /// Style of the target when the segment began; `None` until then.
    start: Option<Style>,
    finished: bool,
}

#[derive(Debug)]
struct RunningTimeline {
    started_at: Instant,
    segments: Vec<RunningSegment>,
    completion: Option<CompletionToken>,
}

impl RunningTimeline {
    fn is_finished(&self) -> bool {
        self.segments.iter().all(|s| s.finished)
    }

    fn targets_slot(&self, slot: SlotId) -> bool {
        self.segments
            .iter()
            .any(|s| s.segment.tween.target.slot() == Some(slot))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub played: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Debug)]
pub struct TweenEngine {
    clock: Arc<dyn Clock>,
    timelines: Vec<RunningTimeline>,
    styles: HashMap<Target, Style>,
    rng: StdRng,
    stats: EngineStats,
}

impl TweenEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_rng(clock, StdRng::from_entropy())
    }

    /// Engine with a reproducible random sequence.
    pub fn with_seed(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self::with_rng(clock, StdRng::seed_from_u64(seed))
    }

    fn with_rng(clock: Arc<dyn Clock>, rng: StdRng) -> Self {
        Self {
            clock,
            timelines: Vec::new(),
            styles: HashMap::new(),
            rng,
            stats: EngineStats::default(),
        }
    }

    /// Advances every running timeline to the clock's current time and fires
    /// the completion tokens of the ones that ended.
    pub fn update(&mut self) {
        let now = self.clock.now();
        let mut finished = Vec::new();
        for mut timeline in std::mem::take(&mut self.timelines) {
            Self::advance(&mut self.styles, &mut timeline, now);
            if timeline.is_finished() {
                finished.push(timeline);
            } else {
                self.timelines.push(timeline);
            }
        }

        for timeline in finished {
            self.stats.completed += 1;
            if let Some(token) = timeline.completion {
                token.fire();
            }
        }
    }

    fn advance(styles: &mut HashMap<Target, Style>, timeline: &mut RunningTimeline, now: Instant) {
        let elapsed = now.duration_since(timeline.started_at).as_secs_f64();
        for running in timeline.segments.iter_mut() {
            if running.finished || elapsed < running.segment.offset {
                continue;
            }
            let tween = &running.segment.tween;
            let current = styles.entry(tween.target).or_default();
            let start = running.start.get_or_insert_with(|| {
                if let Some(from) = &tween.from {
                    current.overlay(from);
                }
                current.clone()
            });

            let progress = if tween.duration <= 0.0 {
                1.0
            } else {
                (elapsed - running.segment.offset) / tween.duration
            };
            let value = Style::interpolate(start, &tween.to, tween.ease.apply(progress));
            current.overlay(&value);
            if progress >= 1.0 {
                running.finished = true;
            }
        }
    }

    pub fn style_of(&self, target: Target) -> Option<&Style> {
        self.styles.get(&target)
    }

    /// Current value of `prop` on `target`, resting value if never assigned.
    pub fn value_of(&self, target: Target, prop: Prop) -> f64 {
        self.styles
            .get(&target)
            .map(|s| s.resolved(prop))
            .unwrap_or_else(|| prop.resting_value())
    }

    pub fn is_animating(&self, slot: SlotId) -> bool {
        self.timelines.iter().any(|t| t.targets_slot(slot))
    }

    pub fn running_timelines(&self) -> usize {
        self.timelines.len()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}

impl Animator for TweenEngine {
    fn set(&mut self, target: Target, style: &Style) {
        self.styles.entry(target).or_default().overlay(style);
    }

    fn play(&mut self, timeline: Timeline) {
        log::debug!(
            "TweenEngine::play: {} segments over {:.2}s",
            timeline.segments().len(),
            timeline.duration()
        );
        let (segments, completion) = timeline.into_parts();
        let started_at = self.clock.now();
        let mut running = RunningTimeline {
            started_at,
            segments: segments
                .into_iter()
                .map(|segment| RunningSegment {
                    segment,
                    start: None,
                    finished: false,
                })
                .collect(),
            completion,
        };
        self.stats.played += 1;

        // Segments at offset 0 render their start state right away.
        Self::advance(&mut self.styles, &mut running, started_at);
        if running.is_finished() {
            self.stats.completed += 1;
            if let Some(token) = running.completion {
                token.fire();
            }
            return;
        }
        self.timelines.push(running);
    }

    fn kill_tweens_of(&mut self, slot: SlotId) {
        let (killed, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timelines)
            .into_iter()
            .partition(|t| t.targets_slot(slot));
        self.timelines = running;
        for timeline in &killed {
            let dropped = timeline.completion.as_ref().map(CompletionToken::completion);
            log::debug!("TweenEngine::kill_tweens_of: slot={slot} dropped={dropped:?}");
        }
        self.stats.cancelled += killed.len() as u64;
    }

    fn random(&mut self, min: f64, max: f64) -> f64 {
        if !min.is_finite() || !max.is_finite() {
            return if min.is_finite() { min } else { 0.0 };
        }
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng.gen_range(low..=high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::easing::Ease;
    use crate::animation::timeline::{Completion, Tween};
    use crate::trail::slot_pool::ActivationId;
    use crate::utils::clock::ManualClock;
    use std::sync::mpsc;

    fn engine() -> (Arc<ManualClock>, TweenEngine) {
        let clock = Arc::new(ManualClock::new());
        let engine = TweenEngine::with_seed(clock.clone(), 7);
        (clock, engine)
    }

    fn token(slot: SlotId, id: u64) -> (CompletionToken, mpsc::Receiver<Completion>) {
        let (tx, rx) = mpsc::channel();
        let completion = Completion {
            slot,
            activation: ActivationId(id),
        };
        (CompletionToken::new(completion, tx), rx)
    }

    #[test]
    fn test_from_state_renders_immediately() {
        let (_clock, mut engine) = engine();
        engine.play(Timeline::new().add(
            Tween::from_to(
                Target::Slot(0),
                Style::new().opacity(1.0).x(0.0).z_index(4),
                Style::new().x(100.0),
            )
            .duration(1.0)
            .ease(Ease::Linear),
            0.0,
        ));
        assert_eq!(engine.value_of(Target::Slot(0), Prop::Opacity), 1.0);
        assert_eq!(engine.value_of(Target::Slot(0), Prop::X), 0.0);
        assert_eq!(engine.value_of(Target::Slot(0), Prop::ZIndex), 4.0);
    }

    #[test]
    fn test_progress_and_completion() {
        let (clock, mut engine) = engine();
        let (token, rx) = token(1, 9);
        engine.play(
            Timeline::new()
                .add(
                    Tween::from_to(Target::Slot(1), Style::new().x(0.0), Style::new().x(100.0))
                        .duration(1.0)
                        .ease(Ease::Linear),
                    0.0,
                )
                .on_complete(token),
        );

        clock.advance_ms(500);
        engine.update();
        assert!((engine.value_of(Target::Slot(1), Prop::X) - 50.0).abs() < 1e-6);
        assert!(rx.try_recv().is_err());
        assert!(engine.is_animating(1));

        clock.advance_ms(600);
        engine.update();
        assert_eq!(engine.value_of(Target::Slot(1), Prop::X), 100.0);
        assert_eq!(rx.try_recv().unwrap().activation, ActivationId(9));
        assert!(!engine.is_animating(1));
        assert_eq!(engine.stats().completed, 1);
    }

    #[test]
    fn test_delayed_segment_starts_from_current_state() {
        let (clock, mut engine) = engine();
        engine.play(
            Timeline::new()
                .add(
                    Tween::from_to(
                        Target::Slot(0),
                        Style::new().opacity(1.0).scale(1.0),
                        Style::new().scale(1.0),
                    )
                    .duration(0.4),
                    0.0,
                )
                .add(
                    Tween::to(Target::Slot(0), Style::new().opacity(0.0).scale(0.2))
                        .duration(0.4)
                        .ease(Ease::Linear),
                    0.4,
                ),
        );
        clock.advance_ms(600);
        engine.update();
        assert!((engine.value_of(Target::Slot(0), Prop::Opacity) - 0.5).abs() < 1e-6);
        clock.advance_ms(300);
        engine.update();
        assert_eq!(engine.value_of(Target::Slot(0), Prop::Opacity), 0.0);
        assert_eq!(engine.running_timelines(), 0);
    }

    #[test]
    fn test_kill_drops_completion() {
        let (clock, mut engine) = engine();
        let (token, rx) = token(3, 1);
        engine.play(
            Timeline::new()
                .add(
                    Tween::to(Target::Inner(3), Style::new().scale(1.0)).duration(0.4),
                    0.0,
                )
                .on_complete(token),
        );
        engine.kill_tweens_of(3);
        clock.advance_ms(1000);
        engine.update();
        assert!(rx.try_recv().is_err());
        assert_eq!(engine.stats().cancelled, 1);
    }

    #[test]
    fn test_zero_length_timeline_completes_on_play() {
        let (_clock, mut engine) = engine();
        let (token, rx) = token(0, 2);
        engine.play(
            Timeline::new()
                .set(Target::Container, Style::new().perspective(1000.0), 0.0)
                .on_complete(token),
        );
        assert!(rx.try_recv().is_ok());
        assert_eq!(engine.value_of(Target::Container, Prop::Perspective), 1000.0);
    }

    #[test]
    fn test_random_is_bounded_and_seeded() {
        let (clock, mut a) = engine();
        let mut b = TweenEngine::with_seed(clock, 7);
        for _ in 0..100 {
            let v = a.random(0.5, 1.6);
            assert!((0.5..=1.6).contains(&v));
            assert_eq!(v, b.random(0.5, 1.6));
        }
        assert!(a.random(3.0, -3.0).abs() <= 3.0);
        assert_eq!(a.random(2.0, 2.0), 2.0);
    }
}
