//! Per-container trail engine: owns the pointer state, the slot pool and the
//! activity accounting, and decides on every tick whether to activate a slot.

use crate::animation::timeline::{Animator, Completion};
use crate::config::TrailConfig;
use crate::trail::activity::ActivityTracker;
use crate::trail::pointer::{sample, PointerInput, PointerState};
use crate::trail::slot_pool::{SlotId, SlotPool, BASE_Z_INDEX};
use crate::trail::surface::Surface;
use crate::trail::variants::{ActivationContext, Variant, VariantStrategy};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrailState {
    /// No pointer sample seen yet; ticks do nothing.
    Initializing,
    Running,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub activated: Option<SlotId>,
    /// Completion reports applied at the start of the tick.
    pub completed: usize,
    pub z_index_reset: bool,
}

pub struct TrailController<S: Surface, A: Animator> {
    threshold: f64,
    variant: Option<Variant>,
    strategy: Option<Box<dyn VariantStrategy>>,
    state: TrailState,
    pointer: PointerState,
    pool: SlotPool,
    tracker: ActivityTracker,
    surface: S,
    animator: A,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
}

impl<S: Surface, A: Animator> TrailController<S, A> {
    /// Builds the engine for the container behind `surface`. Never fails: an
    /// unknown variant or a container without slots yields an engine that
    /// ticks but never activates anything.
    pub fn new(config: &TrailConfig, surface: S, mut animator: A) -> Self {
        let variant = config.resolve_variant();
        let threshold = config.effective_threshold();
        let mut pool = SlotPool::measure(&surface);
        if pool.is_empty() {
            log::warn!("TrailController::new: container has no slots");
        }
        pool.resize(&surface, &mut animator);
        let strategy = variant.map(|v| v.build(pool.len()));
        log::info!(
            "TrailController::new: variant={:?} threshold={threshold} slots={}",
            variant.map(Variant::name),
            pool.len()
        );

        let (completion_tx, completion_rx) = mpsc::channel();
        Self {
            threshold,
            variant,
            strategy,
            state: TrailState::Initializing,
            pointer: PointerState::default(),
            pool,
            tracker: ActivityTracker::new(),
            surface,
            animator,
            completion_tx,
            completion_rx,
        }
    }

    /// Records a pointer or touch sample. The first accepted sample seeds the
    /// smoothed position and starts the tick loop. Returns `false` when the
    /// input carried no position.
    pub fn pointer_moved(&mut self, input: &PointerInput) -> bool {
        let Some(position) = sample(input, &self.surface.container_bounds()) else {
            log::debug!("TrailController::pointer_moved: input without position");
            return false;
        };

        match self.state {
            TrailState::Initializing => {
                self.pointer.seed(position);
                self.state = TrailState::Running;
                log::info!("TrailController::pointer_moved: first sample at {position:?}, running");
            }
            TrailState::Running => self.pointer.raw = position,
        }
        true
    }

    pub fn tick(&mut self) -> TickReport {
        if self.state != TrailState::Running {
            return TickReport::default();
        }

        let mut report = TickReport {
            completed: self.drain_completions(),
            ..TickReport::default()
        };

        self.pointer.smooth();
        let distance = self.pointer.distance_since_trigger();
        if distance > self.threshold {
            if let Some(strategy) = self.strategy.as_mut() {
                let container = self.surface.container_bounds();
                let mut ctx = ActivationContext::new(
                    &mut self.pool,
                    &mut self.tracker,
                    &mut self.animator,
                    &self.completion_tx,
                    self.pointer,
                    container,
                );
                report.activated = strategy.activate(&mut ctx);
                log::debug!(
                    "TrailController::tick: distance={distance:.1} slot={:?} z={} active={}",
                    report.activated,
                    self.pool.z_index(),
                    self.tracker.active_count()
                );
            }
            self.pointer.mark_triggered();
        }

        if self.tracker.is_idle() && self.pool.z_index() != BASE_Z_INDEX {
            self.pool.reset_z_index();
            report.z_index_reset = true;
        }
        report
    }

    fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self
                .pool
                .complete(completion.slot, completion.activation, &mut self.tracker)
            {
                applied += 1;
            }
        }
        applied
    }

    /// Resets every slot to its default look and re-measures it.
    pub fn resize(&mut self) {
        log::debug!("TrailController::resize: {:?}", self.surface.container_bounds());
        self.pool.resize(&self.surface, &mut self.animator);
    }

    /// Cancels everything in flight and hands back the surface and animator.
    pub fn teardown(mut self) -> (S, A) {
        self.pool.cancel_all(&mut self.animator, &mut self.tracker);
        self.pool.resize(&self.surface, &mut self.animator);
        log::info!("TrailController::teardown: released {} slots", self.pool.len());
        (self.surface, self.animator)
    }

    /// Tears down and initializes again with `config` against the same slot
    /// elements. The new engine waits for a fresh first pointer sample.
    pub fn rebuild(self, config: &TrailConfig) -> Self {
        log::info!("TrailController::rebuild: variant={}", config.variant);
        let (surface, animator) = self.teardown();
        Self::new(config, surface, animator)
    }

    pub fn state(&self) -> TrailState {
        self.state
    }

    pub fn variant(&self) -> Option<Variant> {
        self.variant
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn pool(&self) -> &SlotPool {
        &self.pool
    }

    pub fn tracker(&self) -> &ActivityTracker {
        &self.tracker
    }

    pub fn is_idle(&self) -> bool {
        self.tracker.is_idle()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::timeline::{Prop, Target};
    use crate::animation::tween_engine::TweenEngine;
    use crate::utils::clock::ManualClock;
    use crate::utils::geometry::{Position, Rect};
    use std::sync::Arc;

    struct TestSurface {
        bounds: Rect,
        slots: usize,
    }

    impl Surface for TestSurface {
        fn container_bounds(&self) -> Rect {
            self.bounds
        }

        fn slot_count(&self) -> usize {
            self.slots
        }

        fn measure_slot(&self, _slot: SlotId) -> Rect {
            Rect::new(0.0, 0.0, 200.0, 250.0)
        }
    }

    type Controller = TrailController<TestSurface, TweenEngine>;

    fn controller(config: TrailConfig, slots: usize) -> (Arc<ManualClock>, Controller) {
        let clock = Arc::new(ManualClock::new());
        let surface = TestSurface {
            bounds: Rect::new(0.0, 0.0, 800.0, 600.0),
            slots,
        };
        let engine = TweenEngine::with_seed(clock.clone(), 3);
        (clock, TrailController::new(&config, surface, engine))
    }

    fn move_to(controller: &mut Controller, x: f64, y: f64) {
        assert!(controller.pointer_moved(&PointerInput::Mouse(Position::new(x, y))));
    }

    fn frame(clock: &ManualClock, controller: &mut Controller, millis: u64) -> TickReport {
        clock.advance_ms(millis);
        controller.animator_mut().update();
        controller.tick()
    }

    #[test]
    fn test_jump_past_threshold_activates_once() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 5);
        move_to(&mut controller, 0.0, 0.0);
        assert_eq!(controller.tick().activated, None);

        move_to(&mut controller, 100.0, 0.0);
        let report = controller.tick();
        assert_eq!(report.activated, Some(1));
        assert_eq!(controller.pointer().last_triggered, Position::new(100.0, 0.0));
        assert_eq!(controller.tracker().active_count(), 1);
        assert_eq!(controller.tick().activated, None);
    }

    #[test]
    fn test_threshold_uses_raw_position() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 5);
        move_to(&mut controller, 100.0, 0.0);
        assert!(controller.tick().activated.is_some());

        // Exactly at the threshold is not enough.
        move_to(&mut controller, 180.0, 0.0);
        assert_eq!(controller.tick().activated, None);

        // Smoothed has barely moved past the last trigger; raw travel decides.
        move_to(&mut controller, 180.5, 0.0);
        let smoothed = controller.pointer().smoothed;
        assert!(smoothed.distance(controller.pointer().last_triggered) < 80.0);
        assert!(controller.tick().activated.is_some());
    }

    #[test]
    fn test_ticks_before_first_sample_do_nothing() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 5);
        assert_eq!(controller.tick(), TickReport::default());
        assert_eq!(controller.state(), TrailState::Initializing);

        assert!(!controller.pointer_moved(&PointerInput::Touch(Vec::new())));
        assert_eq!(controller.state(), TrailState::Initializing);

        let touch = PointerInput::Touch(vec![Position::new(300.0, 40.0)]);
        assert!(controller.pointer_moved(&touch));
        assert_eq!(controller.state(), TrailState::Running);
        assert_eq!(controller.pointer().smoothed, Position::new(300.0, 40.0));
    }

    #[test]
    fn test_replaced_activation_counts_once() {
        let (clock, mut controller) = controller(TrailConfig::default(), 1);
        move_to(&mut controller, 100.0, 0.0);
        assert_eq!(controller.tick().activated, Some(0));
        move_to(&mut controller, 200.0, 0.0);
        assert_eq!(controller.tick().activated, Some(0));
        assert_eq!(controller.tracker().active_count(), 1);

        let report = frame(&clock, &mut controller, 1000);
        assert_eq!(report.completed, 1);
        assert!(controller.is_idle());
        assert!(report.z_index_reset);
        assert_eq!(controller.pool().z_index(), BASE_Z_INDEX);
    }

    #[test]
    fn test_z_index_grows_while_active() {
        let (clock, mut controller) = controller(TrailConfig::default(), 5);
        for step in 1..=3 {
            move_to(&mut controller, step as f64 * 100.0, 0.0);
            controller.tick();
        }
        assert_eq!(controller.pool().z_index(), BASE_Z_INDEX + 3);
        assert_eq!(
            controller.animator().value_of(Target::Slot(3), Prop::ZIndex),
            4.0
        );
        assert!(!frame(&clock, &mut controller, 100).z_index_reset);
        assert!(frame(&clock, &mut controller, 1000).z_index_reset);
        assert!(!controller.tick().z_index_reset);
    }

    #[test]
    fn test_unknown_variant_is_inert() {
        let (_clock, mut controller) = controller(TrailConfig::default().with_variant("42"), 5);
        assert_eq!(controller.variant(), None);
        move_to(&mut controller, 100.0, 0.0);
        assert_eq!(controller.tick().activated, None);
        assert_eq!(controller.pointer().last_triggered, Position::new(100.0, 0.0));
        assert!(controller.is_idle());
        assert_eq!(controller.animator().running_timelines(), 0);
    }

    #[test]
    fn test_empty_container() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 0);
        move_to(&mut controller, 500.0, 300.0);
        let report = controller.tick();
        assert_eq!(report.activated, None);
        assert!(!report.z_index_reset);
        assert!(controller.is_idle());
        controller.resize();
        assert_eq!(controller.pool().len(), 0);
    }

    #[test]
    fn test_rebuild_keeps_slots() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 6);
        move_to(&mut controller, 100.0, 0.0);
        controller.tick();
        move_to(&mut controller, 200.0, 0.0);
        controller.tick();
        assert_eq!(controller.tracker().active_count(), 2);

        let controller = controller.rebuild(&TrailConfig::default().with_variant("stacked"));
        assert_eq!(controller.variant(), Some(Variant::Stacked));
        assert_eq!(controller.pool().len(), 6);
        assert_eq!(controller.pool().cursor(), 0);
        assert!(controller.is_idle());
        assert_eq!(controller.state(), TrailState::Initializing);
        assert_eq!(controller.animator().running_timelines(), 0);
        assert_eq!(controller.animator().stats().cancelled, 2);
        assert_eq!(
            controller.animator().value_of(Target::Slot(1), Prop::Opacity),
            0.0
        );
    }

    #[test]
    fn test_resize_remeasures_against_container() {
        let (_clock, mut controller) = controller(TrailConfig::default(), 2);
        controller.surface_mut().bounds = Rect::new(100.0, 50.0, 400.0, 300.0);
        controller.resize();
        move_to(&mut controller, 150.0, 60.0);
        assert_eq!(controller.pointer().raw, Position::new(50.0, 10.0));
        assert_eq!(controller.pool().rect(1), Rect::new(0.0, 0.0, 200.0, 250.0));
    }
}
