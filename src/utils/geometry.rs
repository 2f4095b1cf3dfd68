use cgmath::{InnerSpace, MetricSpace, Vector2, VectorSpace};
use serde::{Deserialize, Serialize};

/// A point in container-local (or client) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Moves `amount` of the way toward `target`.
    pub fn lerp(self, target: Position, amount: f64) -> Position {
        self.to_vector().lerp(target.to_vector(), amount).into()
    }

    pub fn distance(self, other: Position) -> f64 {
        self.to_vector().distance(other.to_vector())
    }

    /// Vector pointing from `self` to `target`.
    pub fn delta_to(self, target: Position) -> Vector2<f64> {
        target.to_vector() - self.to_vector()
    }
}

impl From<Vector2<f64>> for Position {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Unit vector of `v`, or the zero vector when `v` has no length.
pub fn unit_or_zero(v: Vector2<f64>) -> Vector2<f64> {
    let magnitude = v.magnitude();
    if magnitude > 0.0 && magnitude.is_finite() {
        v / magnitude
    } else {
        Vector2::new(0.0, 0.0)
    }
}

/// Bounding box of an element, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Center in the rect's own local space.
    pub fn local_center(&self) -> Position {
        Position::new(self.width / 2.0, self.height / 2.0)
    }

    /// Converts a client-space point into this rect's local space.
    pub fn to_local(&self, client: Position) -> Position {
        Position::new(client.x - self.left, client.y - self.top)
    }

    /// Top-left corner that centers a box of this size on `at`. Degenerate
    /// sizes are treated as zero so the result is always finite for finite `at`.
    pub fn centered_on(&self, at: Position) -> (f64, f64) {
        let half_w = if self.width.is_finite() && self.width > 0.0 {
            self.width / 2.0
        } else {
            0.0
        };
        let half_h = if self.height.is_finite() && self.height > 0.0 {
            self.height / 2.0
        } else {
            0.0
        };
        (at.x - half_w, at.y - half_h)
    }
}
