//! Activation strategies.
//!
//! Every variant shares one lifecycle: take the next slot, cancel whatever
//! was still running on it, record the start, then play a timeline that
//! ends fully transparent and reports completion. The first three steps live
//! in [`ActivationContext::begin`] so a strategy only decides what the
//! timeline looks like.

use crate::animation::easing::Ease;
use crate::animation::timeline::{
    Animator, Completion, CompletionToken, Style, Target, Timeline, Tween,
};
use crate::trail::activity::ActivityTracker;
use crate::trail::pointer::PointerState;
use crate::trail::slot_pool::{ActivationId, SlotId, SlotPool};
use crate::utils::geometry::{Position, Rect};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Sender;

pub mod basic;
pub mod depth;
pub mod rotating;
pub mod speed;
pub mod stacked;

use basic::{DirectionalTrail, DriftTrail, FlashTrail, GrowTrail};
use depth::DepthTrail;
use rotating::RotatingTrail;
use speed::SpeedMappedTrail;
use stacked::StackedTrail;

/// Scale slots shrink to while fading out.
pub const EXIT_SCALE: f64 = 0.2;

/// The eight trail styles, keyed by their configuration number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Drift = 1,
    Flash = 2,
    Grow = 3,
    Directional = 4,
    Rotating = 5,
    SpeedMapped = 6,
    Stacked = 7,
    Depth = 8,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown trail variant: {0:?}")]
pub struct UnknownVariant(pub String);

impl Variant {
    /// Read-only registry, in configuration order.
    pub const ALL: [Variant; 8] = [
        Variant::Drift,
        Variant::Flash,
        Variant::Grow,
        Variant::Directional,
        Variant::Rotating,
        Variant::SpeedMapped,
        Variant::Stacked,
        Variant::Depth,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Drift => "drift",
            Variant::Flash => "flash",
            Variant::Grow => "grow",
            Variant::Directional => "directional",
            Variant::Rotating => "rotating",
            Variant::SpeedMapped => "speed_mapped",
            Variant::Stacked => "stacked",
            Variant::Depth => "depth",
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.id() == id)
    }

    /// Fresh strategy for a pool of `slot_count` slots.
    pub fn build(self, slot_count: usize) -> Box<dyn VariantStrategy> {
        match self {
            Variant::Drift => Box::new(DriftTrail),
            Variant::Flash => Box::new(FlashTrail),
            Variant::Grow => Box::new(GrowTrail),
            Variant::Directional => Box::new(DirectionalTrail::default()),
            Variant::Rotating => Box::new(RotatingTrail::default()),
            Variant::SpeedMapped => Box::new(SpeedMappedTrail::default()),
            Variant::Stacked => Box::new(StackedTrail::new(slot_count)),
            Variant::Depth => Box::new(DepthTrail::default()),
        }
    }
}

impl FromStr for Variant {
    type Err = UnknownVariant;

    /// Accepts the configuration number ("1".."8") or the variant name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let selector = s.trim();
        let by_id = selector.parse::<u8>().ok().and_then(Variant::from_id);
        by_id
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|v| v.name().eq_ignore_ascii_case(selector))
            })
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id(), self.name())
    }
}

/// One interchangeable activation algorithm.
pub trait VariantStrategy: fmt::Debug {
    fn variant(&self) -> Variant;

    /// Runs one activation. Returns the slot used, `None` when the pool is
    /// empty.
    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId>;
}

/// A slot claimed for one activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Activation {
    pub id: ActivationId,
    pub slot: SlotId,
    pub z_index: u32,
    pub rect: Rect,
}

impl Activation {
    pub fn outer(&self) -> Target {
        Target::Slot(self.slot)
    }

    pub fn inner(&self) -> Target {
        Target::Inner(self.slot)
    }

    /// Translation that centers the slot on `at`.
    pub fn centered(&self, at: Position) -> (f64, f64) {
        self.rect.centered_on(at)
    }
}

/// Everything a strategy may touch during one activation.
pub struct ActivationContext<'a> {
    pool: &'a mut SlotPool,
    tracker: &'a mut ActivityTracker,
    animator: &'a mut dyn Animator,
    completions: &'a Sender<Completion>,
    pub pointer: PointerState,
    pub container: Rect,
}

impl<'a> ActivationContext<'a> {
    pub fn new(
        pool: &'a mut SlotPool,
        tracker: &'a mut ActivityTracker,
        animator: &'a mut dyn Animator,
        completions: &'a Sender<Completion>,
        pointer: PointerState,
        container: Rect,
    ) -> Self {
        Self {
            pool,
            tracker,
            animator,
            completions,
            pointer,
            container,
        }
    }

    /// Claims the next slot: advance the pool (raising z-order), cancel the
    /// slot's pending sequence, record the start.
    pub fn begin(&mut self) -> Option<Activation> {
        let slot = self.pool.advance()?;
        self.pool
            .cancel_pending(slot, &mut *self.animator, &mut *self.tracker);
        self.tracker.begin();
        let id = self.pool.occupy(slot);
        Some(Activation {
            id,
            slot,
            z_index: self.pool.z_index(),
            rect: self.pool.rect(slot),
        })
    }

    /// Plays the activation's timeline with its completion report attached.
    pub fn play(&mut self, activation: &Activation, timeline: Timeline) {
        let token = CompletionToken::new(
            Completion {
                slot: activation.slot,
                activation: activation.id,
            },
            self.completions.clone(),
        );
        self.animator.play(timeline.on_complete(token));
    }

    /// Force-fades `slot` outside the activation lifecycle. Whatever still
    /// ran on it is cancelled first so its accounting stays exact.
    pub fn retire(&mut self, slot: SlotId, timeline: Timeline) {
        self.pool
            .cancel_pending(slot, &mut *self.animator, &mut *self.tracker);
        self.animator.play(timeline);
    }

    pub fn random(&mut self, min: f64, max: f64) -> f64 {
        self.animator.random(min, max)
    }

    pub fn slot_count(&self) -> usize {
        self.pool.len()
    }

    pub fn predecessor_of(&self, slot: SlotId, window: usize) -> SlotId {
        self.pool.predecessor_of(slot, window)
    }

    /// Starting style every variant shares: visible, stacked on top,
    /// centered on the smoothed pointer.
    pub fn entry_from(&self, activation: &Activation) -> Style {
        Style::new()
            .opacity(1.0)
            .z_index(activation.z_index)
            .at(activation.centered(self.pointer.smoothed))
    }

    /// Entry end state: centered on the raw pointer.
    pub fn entry_to(&self, activation: &Activation) -> Style {
        Style::new().at(activation.centered(self.pointer.raw))
    }
}

/// Standard exit: fade out while shrinking.
pub fn fade_out(activation: &Activation, duration: f64, ease: Ease) -> Tween {
    Tween::to(
        activation.outer(),
        Style::new().opacity(0.0).scale(EXIT_SCALE),
    )
    .duration(duration)
    .ease(ease)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::animation::tween_engine::TweenEngine;
    use crate::utils::clock::ManualClock;
    use std::sync::mpsc::{self, Receiver};
    use std::sync::Arc;

    /// Standalone pieces for driving a strategy without a controller.
    pub struct Harness {
        pub clock: Arc<ManualClock>,
        pub engine: TweenEngine,
        pub pool: SlotPool,
        pub tracker: ActivityTracker,
        pub pointer: PointerState,
        pub container: Rect,
        tx: Sender<Completion>,
        rx: Receiver<Completion>,
    }

    impl Harness {
        pub fn new(slots: usize) -> Self {
            let clock = Arc::new(ManualClock::new());
            let (tx, rx) = mpsc::channel();
            Self {
                engine: TweenEngine::with_seed(clock.clone(), 42),
                clock,
                pool: SlotPool::from_rects(vec![Rect::new(0.0, 0.0, 200.0, 100.0); slots]),
                tracker: ActivityTracker::new(),
                pointer: PointerState::default(),
                container: Rect::new(0.0, 0.0, 800.0, 600.0),
                tx,
                rx,
            }
        }

        pub fn activate(&mut self, strategy: &mut dyn VariantStrategy) -> Option<SlotId> {
            let mut ctx = ActivationContext::new(
                &mut self.pool,
                &mut self.tracker,
                &mut self.engine,
                &self.tx,
                self.pointer,
                self.container,
            );
            strategy.activate(&mut ctx)
        }

        /// Advances time and applies every completion that arrived.
        pub fn run_ms(&mut self, millis: u64) {
            self.clock.advance_ms(millis);
            self.engine.update();
            while let Ok(c) = self.rx.try_recv() {
                self.pool.complete(c.slot, c.activation, &mut self.tracker);
            }
        }
    }
}
