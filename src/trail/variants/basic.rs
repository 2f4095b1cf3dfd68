//! The four pop-in variants: each enters at the smoothed pointer, travels to
//! the raw pointer, then fades while shrinking.

use crate::animation::easing::Ease;
use crate::animation::timeline::{Style, Timeline, Tween};
use crate::trail::slot_pool::SlotId;
use crate::utils::geometry::unit_or_zero;
use cgmath::Vector2;

use super::{fade_out, ActivationContext, Variant, VariantStrategy};

const ENTRY_DURATION: f64 = 0.4;
const EXIT_DURATION: f64 = 0.4;

/// Variant 1: slides from the smoothed to the raw pointer at full size.
#[derive(Debug, Default)]
pub struct DriftTrail;

impl VariantStrategy for DriftTrail {
    fn variant(&self) -> Variant {
        Variant::Drift
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let activation = ctx.begin()?;
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation).scale(1.0),
                    ctx.entry_to(&activation),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(
                fade_out(&activation, EXIT_DURATION, Ease::Power3Out),
                ENTRY_DURATION,
            );
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}

/// Variant 2: pops in from nothing while the image inside flashes bright and
/// settles.
#[derive(Debug, Default)]
pub struct FlashTrail;

impl VariantStrategy for FlashTrail {
    fn variant(&self) -> Variant {
        Variant::Flash
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let activation = ctx.begin()?;
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation).scale(0.0),
                    ctx.entry_to(&activation).scale(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(
                Tween::from_to(
                    activation.inner(),
                    Style::new().scale(2.8).brightness(2.5),
                    Style::new().scale(1.0).brightness(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(fade_out(&activation, EXIT_DURATION, Ease::Power2Out), 0.45);
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}

/// Variant 3: grows from a fifth of its size while travelling.
#[derive(Debug, Default)]
pub struct GrowTrail;

impl VariantStrategy for GrowTrail {
    fn variant(&self) -> Variant {
        Variant::Grow
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let activation = ctx.begin()?;
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation).scale(0.2),
                    ctx.entry_to(&activation).scale(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(
                fade_out(&activation, EXIT_DURATION, Ease::Power3Out),
                ENTRY_DURATION,
            );
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}

/// Variant 4: like the flash variant with a softer zoom. Records the unit
/// travel direction of each activation.
#[derive(Debug)]
pub struct DirectionalTrail {
    last_direction: Vector2<f64>,
}

impl Default for DirectionalTrail {
    fn default() -> Self {
        Self {
            last_direction: Vector2::new(0.0, 0.0),
        }
    }
}

impl DirectionalTrail {
    /// Unit vector from the smoothed to the raw pointer at the last
    /// activation; zero if they coincided.
    pub fn last_direction(&self) -> Vector2<f64> {
        self.last_direction
    }
}

impl VariantStrategy for DirectionalTrail {
    fn variant(&self) -> Variant {
        Variant::Directional
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        self.last_direction = unit_or_zero(ctx.pointer.smoothed.delta_to(ctx.pointer.raw));

        let activation = ctx.begin()?;
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation).scale(0.8),
                    ctx.entry_to(&activation).scale(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(
                Tween::from_to(
                    activation.inner(),
                    Style::new().scale(1.8).brightness(2.0),
                    Style::new().scale(1.0).brightness(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power1Out),
                0.0,
            )
            .add(
                fade_out(&activation, EXIT_DURATION, Ease::Power3Out),
                ENTRY_DURATION,
            );
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}
