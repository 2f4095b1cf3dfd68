use crate::animation::easing::Ease;
use crate::animation::timeline::{Style, Timeline, Tween};
use crate::trail::slot_pool::SlotId;
use crate::utils::geometry::unit_or_zero;
use cgmath::{Deg, InnerSpace, Rad, Vector2};

use super::{ActivationContext, Variant, VariantStrategy};

/// Pointer travel (px) that maps to a unit-length drift vector.
const SPEED_DIVISOR: f64 = 150.0;
/// How far past the pointer the slot lands at the end of its entry.
const LEAD_DISTANCE: f64 = 70.0;
/// How far the slot keeps drifting while it fades.
const DRIFT_DISTANCE: f64 = 120.0;
/// Extra rotation the slot starts with, against the turning direction.
const START_ROTATION_OFFSET: f64 = 10.0;

/// Travel angle of `delta` in degrees. Angles pointing left, (90, 270],
/// are turned half a revolution so images never end up upside down.
pub fn upright_angle(delta: Vector2<f64>) -> f64 {
    let mut angle = Deg::from(Rad(delta.y.atan2(delta.x))).0;
    if angle < 0.0 {
        angle += 360.0;
    }
    if angle > 90.0 && angle <= 270.0 {
        angle += 180.0;
    }
    angle
}

/// Variant 5: rotates into the travel direction and keeps drifting along it
/// while fading.
#[derive(Debug, Default)]
pub struct RotatingTrail {
    last_angle: f64,
    clockwise: bool,
}

impl RotatingTrail {
    pub fn last_angle(&self) -> f64 {
        self.last_angle
    }

    /// Whether the angle grew since the previous activation.
    pub fn is_clockwise(&self) -> bool {
        self.clockwise
    }
}

impl VariantStrategy for RotatingTrail {
    fn variant(&self) -> Variant {
        Variant::Rotating
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let delta = ctx.pointer.smoothed.delta_to(ctx.pointer.raw);
        let angle = upright_angle(delta);
        self.clockwise = angle >= self.last_angle;
        self.last_angle = angle;
        let start_angle = if self.clockwise {
            angle - START_ROTATION_OFFSET
        } else {
            angle + START_ROTATION_OFFSET
        };
        let drift = unit_or_zero(delta) * (delta.magnitude() / SPEED_DIVISOR);

        let activation = ctx.begin()?;
        let (x, y) = activation.centered(ctx.pointer.raw);
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation)
                        .brightness(0.8)
                        .scale(0.1)
                        .rotation(start_angle),
                    Style::new()
                        .scale(1.0)
                        .brightness(1.0)
                        .x(x + drift.x * LEAD_DISTANCE)
                        .y(y + drift.y * LEAD_DISTANCE)
                        .rotation(angle),
                )
                .duration(1.0)
                .ease(Ease::Power2Out),
                0.0,
            )
            .add(
                Tween::to(activation.outer(), Style::new().opacity(0.0))
                    .duration(0.4)
                    .ease(Ease::ExpoOut),
                0.5,
            )
            .add(
                Tween::to(
                    activation.outer(),
                    Style::new()
                        .translate_by(drift.x * DRIFT_DISTANCE, drift.y * DRIFT_DISTANCE),
                )
                .duration(1.5)
                .ease(Ease::Power4Out),
                0.05,
            );
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}
