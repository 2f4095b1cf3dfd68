use crate::animation::easing::Ease;
use crate::animation::timeline::{Style, Target, Timeline, Tween};
use crate::trail::slot_pool::SlotId;

use super::{ActivationContext, Variant, VariantStrategy};

/// Upper bound on slots left on screen at once.
pub const MAX_VISIBLE: usize = 9;

const ENTRY_DURATION: f64 = 0.4;
const RETIRE_DURATION: f64 = 0.4;
const RETIRE_SCALE: f64 = 1.3;

/// Variant 7: images pile up with a slight random tilt and stay put. Once
/// the window is full, every activation pushes the oldest one out.
#[derive(Debug)]
pub struct StackedTrail {
    window: usize,
    visible: usize,
    last_retired: Option<SlotId>,
}

impl StackedTrail {
    pub fn new(slot_count: usize) -> Self {
        Self {
            window: MAX_VISIBLE.min(slot_count.saturating_sub(1)),
            visible: 0,
            last_retired: None,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn last_retired(&self) -> Option<SlotId> {
        self.last_retired
    }
}

impl VariantStrategy for StackedTrail {
    fn variant(&self) -> Variant {
        Variant::Stacked
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let activation = ctx.begin()?;
        self.visible = (self.visible + 1).min(self.window);

        let scale = ctx.random(0.5, 1.6);
        let shrink = ctx.random(0.2, 0.6).max(0.0);
        let rotation = ctx.random(-3.0, 3.0);
        let timeline = Timeline::new().add(
            Tween::from_to(
                activation.outer(),
                ctx.entry_from(&activation)
                    .scale(scale - shrink)
                    .rotation(0.0),
                ctx.entry_to(&activation).scale(scale).rotation(rotation),
            )
            .duration(ENTRY_DURATION)
            .ease(Ease::Power3Out),
            0.0,
        );
        ctx.play(&activation, timeline);

        if self.window > 0 && self.visible >= self.window {
            let oldest = ctx.predecessor_of(activation.slot, self.window);
            log::debug!(
                "StackedTrail::activate: retiring slot {oldest} for slot {}",
                activation.slot
            );
            let fade = Timeline::new().add(
                Tween::to(
                    Target::Slot(oldest),
                    Style::new().opacity(0.0).scale(RETIRE_SCALE),
                )
                .duration(RETIRE_DURATION)
                .ease(Ease::Power4Out),
                0.0,
            );
            ctx.retire(oldest, fade);
            self.last_retired = Some(oldest);
        }
        Some(activation.slot)
    }
}
