use crate::animation::easing::Ease;
use crate::animation::timeline::{Style, Target, Timeline, Tween};
use crate::trail::pointer::PointerState;
use crate::trail::slot_pool::SlotId;
use crate::utils::geometry::{Position, Rect};

use super::{ActivationContext, Variant, VariantStrategy};

const MAX_TILT: f64 = 30.0;
const DEPTH_RANGE: f64 = 1200.0;
const MIN_BRIGHTNESS: f64 = 0.2;
const BRIGHTNESS_RANGE: f64 = 2.3;
const PERSPECTIVE: f64 = 1000.0;
const RECEDE_DEPTH: f64 = -800.0;

/// 3D pose of one activation, derived from where the pointer sits relative
/// to the container center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthPose {
    pub rotation_x: f64,
    pub rotation_y: f64,
    /// Within `[-600, 600]`; the center of the container is the far end.
    pub depth: f64,
    pub brightness: f64,
}

impl Default for DepthPose {
    fn default() -> Self {
        Self::from_proportion(0.0, 0.0, 0.5)
    }
}

impl DepthPose {
    fn from_proportion(rotation_x: f64, rotation_y: f64, proportion: f64) -> Self {
        let proportion = if proportion.is_nan() {
            0.0
        } else {
            proportion.clamp(0.0, 1.0)
        };
        Self {
            rotation_x,
            rotation_y,
            depth: proportion * DEPTH_RANGE - DEPTH_RANGE / 2.0,
            brightness: MIN_BRIGHTNESS + proportion * BRIGHTNESS_RANGE,
        }
    }

    /// Scale that makes the slot look nearer or farther.
    pub fn scale(&self) -> f64 {
        1.0 + self.depth / 1000.0
    }
}

fn ratio(value: f64, extent: f64) -> f64 {
    if extent > 0.0 && extent.is_finite() {
        value / extent
    } else {
        0.0
    }
}

/// Pose for the raw pointer inside `container`. A container without area
/// has no center to tilt around and yields an untilted, farthest pose.
pub fn pose_for(pointer: &PointerState, container: &Rect) -> DepthPose {
    let center = container.local_center();
    let rel = center.delta_to(pointer.raw);
    let tilt = |r: f64| (r * MAX_TILT).clamp(-MAX_TILT, MAX_TILT);

    let rotation_x = tilt(-ratio(rel.y, center.y));
    let rotation_y = tilt(ratio(rel.x, center.x));
    let max_distance = center.distance(Position::ORIGIN);
    let proportion = ratio(pointer.raw.distance(center), max_distance);
    DepthPose::from_proportion(rotation_x, rotation_y, proportion)
}

/// Variant 8: tilts towards the pointer and sinks away into the container
/// while fading.
#[derive(Debug, Default)]
pub struct DepthTrail {
    previous: DepthPose,
}

impl DepthTrail {
    /// Pose the next activation blends from.
    pub fn previous_pose(&self) -> DepthPose {
        self.previous
    }
}

impl VariantStrategy for DepthTrail {
    fn variant(&self) -> Variant {
        Variant::Depth
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let pose = pose_for(&ctx.pointer, &ctx.container);
        let previous = self.previous;

        let activation = ctx.begin()?;
        let timeline = Timeline::new()
            .set(Target::Container, Style::new().perspective(PERSPECTIVE), 0.0)
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation)
                        .z(0.0)
                        .scale(previous.scale())
                        .rotation_x(previous.rotation_x)
                        .rotation_y(previous.rotation_y)
                        .brightness(previous.brightness),
                    ctx.entry_to(&activation)
                        .scale(pose.scale())
                        .rotation_x(pose.rotation_x)
                        .rotation_y(pose.rotation_y)
                        .brightness(pose.brightness),
                )
                .duration(1.0)
                .ease(Ease::ExpoOut),
                0.0,
            )
            .add(
                Tween::to(
                    activation.outer(),
                    Style::new().opacity(0.0).z(RECEDE_DEPTH),
                )
                .duration(0.4)
                .ease(Ease::Power2Out),
                0.3,
            );
        ctx.play(&activation, timeline);
        self.previous = pose;
        Some(activation.slot)
    }
}
