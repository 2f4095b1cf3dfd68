//! Vocabulary shared between the trail engine and an animation backend.
//!
//! The engine never renders anything itself. Every visual change is
//! described as a [`Style`] assignment or a [`Timeline`] of [`Tween`]s and
//! handed to an [`Animator`].

use crate::trail::slot_pool::{ActivationId, SlotId};
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;

use super::easing::Ease;

/// What a tween or assignment applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    /// The slot's outer element (position, scale, opacity, filters).
    Slot(SlotId),
    /// The image inside a slot; used for the inner zoom/flash effects.
    Inner(SlotId),
    /// The trail container itself.
    Container,
}

impl Target {
    pub fn slot(&self) -> Option<SlotId> {
        match self {
            Target::Slot(slot) | Target::Inner(slot) => Some(*slot),
            Target::Container => None,
        }
    }
}

/// Animatable properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prop {
    Opacity,
    Scale,
    X,
    Y,
    Z,
    Rotation,
    RotationX,
    RotationY,
    ZIndex,
    /// Brightness multiplier, 1.0 is unchanged.
    Brightness,
    /// Blur radius in pixels.
    Blur,
    /// Grayscale amount in percent.
    Grayscale,
    Perspective,
}

impl Prop {
    /// Value a property has when nothing was ever assigned to it.
    pub fn resting_value(self) -> f64 {
        match self {
            Prop::Opacity | Prop::Scale | Prop::Brightness => 1.0,
            _ => 0.0,
        }
    }

    /// Discrete properties jump to their target instead of interpolating.
    pub fn is_discrete(self) -> bool {
        matches!(self, Prop::ZIndex | Prop::Perspective)
    }
}

/// Sparse property bag. Only the properties present are touched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Style {
    values: BTreeMap<Prop, f64>,
    translate: Option<(f64, f64)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resting look of a slot: hidden, unscaled, not offset.
    pub fn slot_default() -> Self {
        Self::new().opacity(0.0).scale(1.0).x(0.0).y(0.0)
    }

    pub fn with(mut self, prop: Prop, value: f64) -> Self {
        self.values.insert(prop, value);
        self
    }

    pub fn opacity(self, value: f64) -> Self {
        self.with(Prop::Opacity, value)
    }

    pub fn scale(self, value: f64) -> Self {
        self.with(Prop::Scale, value)
    }

    pub fn x(self, value: f64) -> Self {
        self.with(Prop::X, value)
    }

    pub fn y(self, value: f64) -> Self {
        self.with(Prop::Y, value)
    }

    pub fn at(self, (x, y): (f64, f64)) -> Self {
        self.x(x).y(y)
    }

    pub fn z(self, value: f64) -> Self {
        self.with(Prop::Z, value)
    }

    pub fn rotation(self, degrees: f64) -> Self {
        self.with(Prop::Rotation, degrees)
    }

    pub fn rotation_x(self, degrees: f64) -> Self {
        self.with(Prop::RotationX, degrees)
    }

    pub fn rotation_y(self, degrees: f64) -> Self {
        self.with(Prop::RotationY, degrees)
    }

    pub fn z_index(self, value: u32) -> Self {
        self.with(Prop::ZIndex, value as f64)
    }

    pub fn brightness(self, value: f64) -> Self {
        self.with(Prop::Brightness, value)
    }

    pub fn blur(self, px: f64) -> Self {
        self.with(Prop::Blur, px)
    }

    pub fn grayscale(self, percent: f64) -> Self {
        self.with(Prop::Grayscale, percent)
    }

    pub fn perspective(self, value: f64) -> Self {
        self.with(Prop::Perspective, value)
    }

    /// Moves by `(dx, dy)` relative to wherever the target is when the tween
    /// starts.
    pub fn translate_by(mut self, dx: f64, dy: f64) -> Self {
        self.translate = Some((dx, dy));
        self
    }

    pub fn get(&self, prop: Prop) -> Option<f64> {
        self.values.get(&prop).copied()
    }

    /// Value of `prop`, falling back to its resting value.
    pub fn resolved(&self, prop: Prop) -> f64 {
        self.get(prop).unwrap_or_else(|| prop.resting_value())
    }

    pub fn translation(&self) -> Option<(f64, f64)> {
        self.translate
    }

    pub fn props(&self) -> impl Iterator<Item = (Prop, f64)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.translate.is_none()
    }

    /// Copies every property of `other` over `self`. Relative translation is
    /// not a stored property and is ignored here.
    pub fn overlay(&mut self, other: &Style) {
        for (prop, value) in other.props() {
            self.values.insert(prop, value);
        }
    }

    /// Interpolated style between `start` and the end state `end` at eased
    /// progress `t`. Only properties named by `end` are produced.
    pub fn interpolate(start: &Style, end: &Style, t: f64) -> Style {
        let mut out = Style::new();
        for (prop, target) in end.props() {
            let from = start.resolved(prop);
            let value = if prop.is_discrete() || t >= 1.0 {
                target
            } else {
                from + (target - from) * t
            };
            out.values.insert(prop, value);
        }
        if let Some((dx, dy)) = end.translate {
            let x = start.resolved(Prop::X);
            let y = start.resolved(Prop::Y);
            out.values.insert(Prop::X, x + dx * t);
            out.values.insert(Prop::Y, y + dy * t);
        }
        out
    }
}

/// A single from/to interpolation on one target.
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub target: Target,
    pub from: Option<Style>,
    pub to: Style,
    /// Seconds.
    pub duration: f64,
    pub ease: Ease,
}

impl Tween {
    pub fn to(target: Target, to: Style) -> Self {
        Self {
            target,
            from: None,
            to,
            duration: 0.0,
            ease: Ease::Power1Out,
        }
    }

    pub fn from_to(target: Target, from: Style, to: Style) -> Self {
        Self {
            from: Some(from),
            ..Self::to(target, to)
        }
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// A tween placed at an offset (seconds) inside a timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub tween: Tween,
    pub offset: f64,
}

impl Segment {
    pub fn end(&self) -> f64 {
        self.offset + self.tween.duration
    }
}

/// Completion report sent when an activation's timeline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub slot: SlotId,
    pub activation: ActivationId,
}

/// Single-use handle the animator fires when a timeline ends naturally.
/// A cancelled timeline drops its token without firing it.
#[derive(Debug)]
pub struct CompletionToken {
    completion: Completion,
    sender: Sender<Completion>,
}

impl CompletionToken {
    pub fn new(completion: Completion, sender: Sender<Completion>) -> Self {
        Self { completion, sender }
    }

    pub fn completion(&self) -> Completion {
        self.completion
    }

    pub fn fire(self) {
        if let Err(e) = self.sender.send(self.completion) {
            // The controller was torn down while the timeline was still running.
            log::debug!("CompletionToken::fire: receiver gone: {e:?}");
        }
    }
}

/// An ordered set of segments played as one unit.
#[derive(Debug, Default)]
pub struct Timeline {
    segments: Vec<Segment>,
    completion: Option<CompletionToken>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, tween: Tween, offset: f64) -> Self {
        self.segments.push(Segment {
            tween,
            offset: offset.max(0.0),
        });
        self
    }

    /// Immediate assignment at `offset` inside the timeline.
    pub fn set(self, target: Target, style: Style, offset: f64) -> Self {
        self.add(Tween::to(target, style), offset)
    }

    pub fn on_complete(mut self, token: CompletionToken) -> Self {
        self.completion = Some(token);
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(Segment::end).fold(0.0, f64::max)
    }

    pub fn into_parts(self) -> (Vec<Segment>, Option<CompletionToken>) {
        (self.segments, self.completion)
    }
}

/// Rendering/tweening backend the trail engine drives.
///
/// Implementations must serialize sequences per slot: `kill_tweens_of` drops
/// every in-flight timeline touching the slot without firing its completion
/// token.
pub trait Animator {
    /// Assigns `style` to `target` immediately.
    fn set(&mut self, target: Target, style: &Style);

    /// Starts `timeline`. Its completion token, if any, fires exactly once
    /// when the last segment ends, unless the timeline is killed first.
    fn play(&mut self, timeline: Timeline);

    /// Cancels every sequence targeting `slot`.
    fn kill_tweens_of(&mut self, slot: SlotId);

    /// Uniform random number in `[min, max]`.
    fn random(&mut self, min: f64, max: f64) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_uses_resting_values() {
        let start = Style::new().x(10.0);
        let end = Style::new().x(30.0).opacity(0.0).scale(0.2);
        let mid = Style::interpolate(&start, &end, 0.5);
        assert_eq!(mid.get(Prop::X), Some(20.0));
        assert_eq!(mid.get(Prop::Opacity), Some(0.5));
        assert!((mid.resolved(Prop::Scale) - 0.6).abs() < 1e-9);
        assert_eq!(mid.get(Prop::Y), None);
    }

    #[test]
    fn test_interpolate_discrete_jumps() {
        let start = Style::new().z_index(1);
        let end = Style::new().z_index(9);
        assert_eq!(
            Style::interpolate(&start, &end, 0.1).get(Prop::ZIndex),
            Some(9.0)
        );
    }

    #[test]
    fn test_interpolate_relative_translation() {
        let start = Style::new().x(100.0).y(50.0);
        let end = Style::new().translate_by(20.0, -10.0);
        let done = Style::interpolate(&start, &end, 1.0);
        assert_eq!(done.get(Prop::X), Some(120.0));
        assert_eq!(done.get(Prop::Y), Some(40.0));
    }

    #[test]
    fn test_timeline_duration() {
        let tl = Timeline::new()
            .add(
                Tween::to(Target::Slot(2), Style::new().opacity(0.0)).duration(0.4),
                0.45,
            )
            .add(
                Tween::to(Target::Inner(3), Style::new().scale(1.0)).duration(0.4),
                0.0,
            )
            .set(Target::Container, Style::new().perspective(1000.0), 0.0);
        assert!((tl.duration() - 0.85).abs() < 1e-9);
        assert_eq!(Timeline::new().duration(), 0.0);
    }
}
