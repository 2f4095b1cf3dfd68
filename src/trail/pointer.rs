use crate::utils::geometry::{Position, Rect};

/// Weight `smoothed` moves toward `raw` on every tick.
pub const SMOOTHING_FACTOR: f64 = 0.1;

/// Raw pointer or touch input, in client coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerInput {
    Mouse(Position),
    /// Active touches; only the first one is tracked.
    Touch(Vec<Position>),
}

impl PointerInput {
    fn client_position(&self) -> Option<Position> {
        match self {
            PointerInput::Mouse(position) => Some(*position),
            PointerInput::Touch(touches) => touches.first().copied(),
        }
    }
}

/// Normalizes `input` to `container`-local coordinates. A touch event
/// without touches carries no position.
pub fn sample(input: &PointerInput, container: &Rect) -> Option<Position> {
    input
        .client_position()
        .map(|client| container.to_local(client))
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Last observed position.
    pub raw: Position,
    /// Exponentially smoothed position lagging behind `raw`.
    pub smoothed: Position,
    /// `raw` at the time of the last activation.
    pub last_triggered: Position,
}

impl PointerState {
    /// First sample: `raw` and `smoothed` start out equal.
    pub fn seed(&mut self, position: Position) {
        self.raw = position;
        self.smoothed = position;
    }

    pub fn smooth(&mut self) {
        self.smoothed = self.smoothed.lerp(self.raw, SMOOTHING_FACTOR);
    }

    pub fn distance_since_trigger(&self) -> f64 {
        self.raw.distance(self.last_triggered)
    }

    pub fn mark_triggered(&mut self) {
        self.last_triggered = self.raw;
    }

    /// Instantaneous speed: how far `raw` runs ahead of `smoothed`.
    pub fn speed(&self) -> f64 {
        self.smoothed.distance(self.raw)
    }
}
