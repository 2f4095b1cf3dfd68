use crate::animation::easing::Ease;
use crate::animation::timeline::{Style, Timeline, Tween};
use crate::trail::slot_pool::SlotId;

use super::{fade_out, ActivationContext, Variant, VariantStrategy};

const ENTRY_DURATION: f64 = 0.8;

/// Linear map from pointer speed onto `[min, max]`, saturating at
/// `max_speed`. `min` may exceed `max` for mappings that fall with speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedMapping {
    pub min: f64,
    pub max: f64,
    pub max_speed: f64,
}

impl SpeedMapping {
    pub const SCALE: SpeedMapping = SpeedMapping::new(0.3, 2.0, 200.0);
    pub const BRIGHTNESS: SpeedMapping = SpeedMapping::new(0.0, 1.3, 70.0);
    pub const BLUR: SpeedMapping = SpeedMapping::new(20.0, 0.0, 90.0);
    /// Grayscale as a fraction; multiplied by 100 for the percentage.
    pub const GRAYSCALE: SpeedMapping = SpeedMapping::new(600.0, 0.0, 90.0);

    pub const fn new(min: f64, max: f64, max_speed: f64) -> Self {
        Self {
            min,
            max,
            max_speed,
        }
    }

    pub fn map(&self, speed: f64) -> f64 {
        let speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
        let ratio = if self.max_speed > 0.0 {
            (speed / self.max_speed).clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.min + (self.max - self.min) * ratio
    }
}

/// Entry look derived from one activation's pointer speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLook {
    pub speed: f64,
    pub scale: f64,
    pub brightness: f64,
    pub blur: f64,
    /// Percent, within `[0, 100]`.
    pub grayscale: f64,
}

impl SpeedLook {
    pub fn for_speed(speed: f64) -> Self {
        Self {
            speed,
            scale: SpeedMapping::SCALE.map(speed),
            brightness: SpeedMapping::BRIGHTNESS.map(speed),
            blur: SpeedMapping::BLUR.map(speed),
            grayscale: (SpeedMapping::GRAYSCALE.map(speed) * 100.0).clamp(0.0, 100.0),
        }
    }
}

/// Variant 6: pointer speed drives the entry size and filters. Fast strokes
/// give large sharp images, slow strokes small blurred gray ones.
#[derive(Debug, Default)]
pub struct SpeedMappedTrail {
    last_look: Option<SpeedLook>,
}

impl SpeedMappedTrail {
    pub fn last_look(&self) -> Option<SpeedLook> {
        self.last_look
    }
}

impl VariantStrategy for SpeedMappedTrail {
    fn variant(&self) -> Variant {
        Variant::SpeedMapped
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>) -> Option<SlotId> {
        let look = SpeedLook::for_speed(ctx.pointer.speed());

        let activation = ctx.begin()?;
        self.last_look = Some(look);
        let timeline = Timeline::new()
            .add(
                Tween::from_to(
                    activation.outer(),
                    ctx.entry_from(&activation).scale(0.0),
                    ctx.entry_to(&activation)
                        .scale(look.scale)
                        .brightness(look.brightness)
                        .blur(look.blur)
                        .grayscale(look.grayscale),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power3Out),
                0.0,
            )
            .add(
                Tween::from_to(
                    activation.inner(),
                    Style::new().scale(2.0),
                    Style::new().scale(1.0),
                )
                .duration(ENTRY_DURATION)
                .ease(Ease::Power3Out),
                0.0,
            )
            .add(fade_out(&activation, 0.4, Ease::Power3In), 0.45);
        ctx.play(&activation, timeline);
        Some(activation.slot)
    }
}
