use serde::{Deserialize, Serialize};

/// Named easing curves used by the trail timelines.
///
/// `PowerN` follows the usual tweening convention: power1 is quadratic,
/// power2 cubic, power3 quartic, power4 quintic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
    Power2Out,
    Power3Out,
    Power3In,
    Power4Out,
    ExpoOut,
}

impl Ease {
    /// Maps linear progress `t` to eased progress. `t` is clamped to [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;
        let eased = match self {
            Ease::Linear => simple_easing::linear(t),
            Ease::Power1Out => simple_easing::quad_out(t),
            Ease::Power2Out => simple_easing::cubic_out(t),
            Ease::Power3Out => simple_easing::quart_out(t),
            Ease::Power3In => simple_easing::quart_in(t),
            Ease::Power4Out => simple_easing::quint_out(t),
            Ease::ExpoOut => simple_easing::expo_out(t),
        };
        eased as f64
    }
}
